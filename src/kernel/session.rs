//! Multi-tab editing session: ordered tabs unique by path, the active path and
//! per-tab dirty/version bookkeeping. Mutated only by the store reducers.

use crate::kernel::effect::RequestId;
use crate::kernel::services::ports::{FileSnapshot, VersionToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTab {
    path: String,
    content: String,
    dirty: bool,
    version: VersionToken,
    loading: Option<RequestId>,
    saving: Option<RequestId>,
    conflict: bool,
    edit_version: u64,
}

impl OpenTab {
    fn from_snapshot(path: String, snapshot: FileSnapshot) -> Self {
        Self {
            path,
            content: snapshot.content,
            dirty: false,
            version: snapshot.version,
            loading: None,
            saving: None,
            conflict: false,
            edit_version: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> &VersionToken {
        &self.version
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn has_conflict(&self) -> bool {
        self.conflict
    }

    pub fn edit_version(&self) -> u64 {
        self.edit_version
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn display_title(&self) -> String {
        if self.dirty {
            format!("{}*", self.file_name())
        } else {
            self.file_name().to_string()
        }
    }

    pub(crate) fn loading_request(&self) -> Option<RequestId> {
        self.loading
    }

    pub(crate) fn saving_request(&self) -> Option<RequestId> {
        self.saving
    }

    pub(crate) fn begin_load(&mut self, request: RequestId) {
        self.loading = Some(request);
    }

    pub(crate) fn end_load(&mut self) {
        self.loading = None;
    }

    pub(crate) fn begin_save(&mut self, request: RequestId) {
        self.saving = Some(request);
    }

    /// Records a successful write. The tab stays dirty if it was edited after
    /// the saved snapshot was taken.
    pub(crate) fn finish_save(&mut self, version: VersionToken, saved_edit_version: u64) {
        self.saving = None;
        self.version = version;
        self.conflict = false;
        if self.edit_version == saved_edit_version {
            self.dirty = false;
        }
    }

    pub(crate) fn fail_save(&mut self, conflict: bool) {
        self.saving = None;
        self.conflict |= conflict;
    }

    fn replace_from_snapshot(&mut self, snapshot: FileSnapshot) {
        self.content = snapshot.content;
        self.version = snapshot.version;
        self.dirty = false;
        self.conflict = false;
        self.loading = None;
        self.edit_version = self.edit_version.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOpen {
    pub path: String,
    pub request: RequestId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    pub was_active: bool,
    pub next_active: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    tabs: Vec<OpenTab>,
    active: Option<String>,
    pending_open: Option<PendingOpen>,
    display_revision: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[OpenTab] {
        &self.tabs
    }

    pub fn tab_paths(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.path.as_str()).collect()
    }

    pub fn tab(&self, path: &str) -> Option<&OpenTab> {
        self.tabs.iter().find(|t| t.path == path)
    }

    pub fn is_open(&self, path: &str) -> bool {
        self.tab(path).is_some()
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_tab(&self) -> Option<&OpenTab> {
        self.active.as_deref().and_then(|p| self.tab(p))
    }

    /// Content the text buffer widget should show: the active tab or nothing.
    pub fn displayed_content(&self) -> &str {
        self.active_tab().map(OpenTab::content).unwrap_or("")
    }

    /// Bumped whenever the displayed content changes.
    pub fn display_revision(&self) -> u64 {
        self.display_revision
    }

    pub fn pending_open(&self) -> Option<&PendingOpen> {
        self.pending_open.as_ref()
    }

    pub fn has_requests_in_flight(&self) -> bool {
        self.pending_open.is_some() || self.tabs.iter().any(|t| t.is_loading() || t.is_saving())
    }

    pub(crate) fn tab_mut(&mut self, path: &str) -> Option<&mut OpenTab> {
        self.tabs.iter_mut().find(|t| t.path == path)
    }

    pub(crate) fn set_pending_open(&mut self, pending: PendingOpen) {
        self.pending_open = Some(pending);
    }

    pub(crate) fn clear_pending_open(&mut self) -> bool {
        self.pending_open.take().is_some()
    }

    /// Takes the pending open if it belongs to `request`.
    pub(crate) fn take_pending_open(&mut self, request: RequestId) -> Option<PendingOpen> {
        if self.pending_open.as_ref().is_some_and(|p| p.request == request) {
            self.pending_open.take()
        } else {
            None
        }
    }

    pub(crate) fn activate(&mut self, path: &str) -> bool {
        if !self.is_open(path) || self.active.as_deref() == Some(path) {
            return false;
        }
        self.active = Some(path.to_string());
        self.bump_display();
        true
    }

    /// Applies fetched content: appends the tab if it is new, otherwise
    /// overwrites its content and any unsaved edits.
    pub(crate) fn apply_loaded(&mut self, path: &str, snapshot: FileSnapshot, activate: bool) {
        match self.tab_mut(path) {
            Some(tab) => tab.replace_from_snapshot(snapshot),
            None => self
                .tabs
                .push(OpenTab::from_snapshot(path.to_string(), snapshot)),
        }

        if activate {
            self.active = Some(path.to_string());
        }
        if self.active.as_deref() == Some(path) {
            self.bump_display();
        }
    }

    /// Sets the tab's content from an edit. Returns `false` if the tab is not
    /// open or the content is unchanged.
    pub(crate) fn edit(&mut self, path: &str, content: String) -> bool {
        let is_active = self.active.as_deref() == Some(path);
        let Some(tab) = self.tab_mut(path) else {
            return false;
        };
        if tab.content == content {
            return false;
        }
        tab.content = content;
        tab.dirty = true;
        tab.edit_version = tab.edit_version.saturating_add(1);
        if is_active {
            self.bump_display();
        }
        true
    }

    /// Removes the tab. When it was active, the replacement is chosen from the
    /// list as it was before removal: its second entry if the closed tab was the
    /// first one, otherwise its first entry.
    pub(crate) fn close(&mut self, path: &str) -> Option<CloseOutcome> {
        let index = self.tabs.iter().position(|t| t.path == path)?;
        let was_active = self.active.as_deref() == Some(path);

        let next_active = if was_active && self.tabs.len() > 1 {
            let pick = if index == 0 { 1 } else { 0 };
            Some(self.tabs[pick].path.clone())
        } else {
            None
        };

        self.tabs.remove(index);
        if self.pending_open.as_ref().is_some_and(|p| p.path == path) {
            self.pending_open = None;
        }

        if was_active {
            self.active = next_active.clone();
            self.bump_display();
        }

        Some(CloseOutcome {
            was_active,
            next_active,
        })
    }

    /// Moves the active tab by `delta` positions, wrapping around.
    pub(crate) fn cycle(&mut self, delta: isize) -> Option<String> {
        let len = self.tabs.len();
        if len <= 1 {
            return None;
        }
        let current = self
            .active
            .as_deref()
            .and_then(|p| self.tabs.iter().position(|t| t.path == p))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        let path = self.tabs[next].path.clone();
        self.activate(&path).then_some(path)
    }

    fn bump_display(&mut self) {
        self.display_revision = self.display_revision.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
