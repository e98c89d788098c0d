use rustc_hash::FxHashMap;

use crate::kernel::services::ports::{
    RemoteEntry, SessionSettings, TabSwitchPolicy, Theme, WorkspaceId,
};
use crate::models::{FileTree, FileTreeRow, LoadState, NodeId, NodeKind};

use super::effect::{Effect, RequestId};
use super::notification::Notifications;
use super::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub tab_switch: TabSwitchPolicy,
    pub strict_versioning: bool,
    pub max_notifications: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            tab_switch: settings.tab_switch,
            strict_versioning: settings.strict_versioning,
            max_notifications: settings.max_notifications,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub workspace: WorkspaceId,
    pub config: SessionConfig,
    pub explorer: ExplorerState,
    pub session: SessionState,
    pub preview: PreviewState,
    pub theme: Theme,
    pub notifications: Notifications,
    next_request: u64,
}

impl AppState {
    pub fn new(workspace: WorkspaceId, config: SessionConfig, theme: Theme) -> Self {
        let tree = FileTree::new(workspace.repo.as_str());
        let notifications = Notifications::new(config.max_notifications);
        Self {
            workspace,
            config,
            explorer: ExplorerState::new(tree),
            session: SessionState::new(),
            preview: PreviewState::default(),
            theme,
            notifications,
            next_request: 1,
        }
    }

    pub(crate) fn alloc_request(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request);
        self.next_request = self.next_request.saturating_add(1);
        id
    }

    pub fn has_requests_in_flight(&self) -> bool {
        self.explorer.has_requests_in_flight()
            || self.session.has_requests_in_flight()
            || self.preview.in_flight
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub in_flight: bool,
    pub last_url: Option<String>,
}

/// Result of a toggle request on the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    UnknownPath,
    IsFile,
    Toggled { expanded: bool },
    AlreadyLoading,
    Fetch(Effect),
}

pub struct ExplorerState {
    tree: FileTree,
    rows: Vec<FileTreeRow>,
    in_flight: FxHashMap<NodeId, RequestId>,
}

impl std::fmt::Debug for ExplorerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerState")
            .field("rows_len", &self.rows.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl ExplorerState {
    pub fn new(tree: FileTree) -> Self {
        let mut state = Self {
            tree,
            rows: Vec::new(),
            in_flight: FxHashMap::default(),
        };
        state.refresh_rows();
        state
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn rows(&self) -> &[FileTreeRow] {
        &self.rows
    }

    pub fn has_requests_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.tree
            .find(path)
            .is_some_and(|id| self.tree.is_expanded(id))
    }

    pub fn load_state(&self, path: &str) -> Option<LoadState> {
        self.tree.find(path).and_then(|id| self.tree.load_state(id))
    }

    pub fn kind(&self, path: &str) -> Option<NodeKind> {
        self.tree.find(path).and_then(|id| self.tree.kind(id))
    }

    /// `request` is used only if a listing has to be fetched.
    pub(crate) fn toggle(&mut self, path: &str, request: RequestId) -> ToggleOutcome {
        let Some(id) = self.tree.find(path) else {
            return ToggleOutcome::UnknownPath;
        };
        if !self.tree.is_dir(id) {
            return ToggleOutcome::IsFile;
        }

        match self.tree.load_state(id) {
            Some(LoadState::Loaded) => match self.tree.toggle_expand(id) {
                Some(expanded) => {
                    self.refresh_rows();
                    ToggleOutcome::Toggled { expanded }
                }
                None => ToggleOutcome::UnknownPath,
            },
            Some(LoadState::Loading) => ToggleOutcome::AlreadyLoading,
            Some(LoadState::NotLoaded) => {
                if !self.tree.begin_load(id) {
                    return ToggleOutcome::AlreadyLoading;
                }
                self.in_flight.insert(id, request);
                self.refresh_rows();
                let path = self.tree.path(id).unwrap_or_default().to_string();
                ToggleOutcome::Fetch(Effect::ListDirectory { request, path })
            }
            None => ToggleOutcome::UnknownPath,
        }
    }

    /// Commits a listing if it answers the outstanding request for `path`.
    pub(crate) fn apply_dir_loaded(
        &mut self,
        request: RequestId,
        path: &str,
        entries: Vec<RemoteEntry>,
    ) -> bool {
        let Some(id) = self.take_in_flight(request, path) else {
            return false;
        };

        match self.tree.populate(id, entries) {
            Ok(count) => {
                tracing::debug!(path, count, "directory loaded");
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "dropping directory listing");
                self.tree.fail_load(id);
                self.refresh_rows();
                return false;
            }
        }
        self.refresh_rows();
        true
    }

    pub(crate) fn apply_dir_load_error(&mut self, request: RequestId, path: &str) -> bool {
        let Some(id) = self.take_in_flight(request, path) else {
            return false;
        };
        let changed = self.tree.fail_load(id);
        self.refresh_rows();
        changed
    }

    pub(crate) fn collapse_all(&mut self) -> bool {
        let changed = self.tree.collapse_all();
        if changed {
            self.refresh_rows();
        }
        changed
    }

    fn take_in_flight(&mut self, request: RequestId, path: &str) -> Option<NodeId> {
        let id = self.tree.find(path)?;
        if self.in_flight.get(&id) != Some(&request) {
            tracing::debug!(path, %request, "discarding stale directory result");
            return None;
        }
        self.in_flight.remove(&id);
        Some(id)
    }

    fn refresh_rows(&mut self) {
        self.rows = self.tree.flatten_for_view();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
