use crate::kernel::services::ports::TabSwitchPolicy;
use crate::kernel::session::PendingOpen;
use crate::kernel::{Action, Effect};
use crate::models::NodeKind;
use crate::models::file_tree::normalize;

impl super::Store {
    pub(super) fn reduce_session_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::OpenFile { path } => self.open_file(normalize(&path)),
            Action::ReloadTab { path } => {
                let path = normalize(&path);
                if !self.state.session.is_open(path) {
                    return super::DispatchResult::unchanged();
                }
                self.refetch_tab(path)
            }
            Action::Edit { path, content } => super::DispatchResult::changed(
                self.state.session.edit(normalize(&path), content),
            ),
            Action::CloseTab { path } => self.close_tab(normalize(&path)),
            Action::NextTab => self.cycle_tab(1),
            Action::PrevTab => self.cycle_tab(-1),
            Action::FileLoaded {
                request,
                path,
                snapshot,
            } => {
                let pending = self.state.session.take_pending_open(request);
                let tab_waiting = self
                    .state
                    .session
                    .tab(&path)
                    .is_some_and(|tab| tab.loading_request() == Some(request));
                let new_tab = pending.is_some() && !self.state.session.is_open(&path);

                if !tab_waiting && !new_tab {
                    tracing::debug!(path = %path, %request, "discarding stale file content");
                    return super::DispatchResult::unchanged();
                }

                tracing::info!(path = %path, version = %snapshot.version, "file loaded");
                self.state
                    .session
                    .apply_loaded(&path, snapshot, pending.is_some());
                super::DispatchResult::changed(true)
            }
            Action::FileLoadError {
                request,
                path,
                error,
            } => {
                let pending = self.state.session.take_pending_open(request);
                let mut tab_waiting = false;
                if let Some(tab) = self.state.session.tab_mut(&path) {
                    if tab.loading_request() == Some(request) {
                        tab.end_load();
                        tab_waiting = true;
                    }
                }

                if pending.is_none() && !tab_waiting {
                    tracing::debug!(path = %path, %request, "discarding stale file error");
                    return super::DispatchResult::unchanged();
                }

                tracing::warn!(path = %path, error = %error, "file load failed");
                self.state
                    .notifications
                    .error(format!("Failed to open {path}: {error}"));
                super::DispatchResult::changed(true)
            }
            _ => unreachable!("non-session action passed to reduce_session_action"),
        }
    }

    fn open_file(&mut self, path: &str) -> super::DispatchResult {
        if path.is_empty() || self.state.explorer.kind(path) == Some(NodeKind::Dir) {
            return super::DispatchResult::unchanged();
        }

        if self.state.session.is_open(path) {
            return match self.state.config.tab_switch {
                TabSwitchPolicy::Retain => {
                    let cleared = self.state.session.clear_pending_open();
                    let activated = self.state.session.activate(path);
                    super::DispatchResult::changed(cleared || activated)
                }
                TabSwitchPolicy::Refetch => self.refetch_tab(path),
            };
        }

        if self
            .state
            .session
            .pending_open()
            .is_some_and(|pending| pending.path == path)
        {
            tracing::debug!(path, "open already in flight");
            return super::DispatchResult::unchanged();
        }

        let request = self.state.alloc_request();
        self.state.session.set_pending_open(PendingOpen {
            path: path.to_string(),
            request,
        });
        super::DispatchResult {
            effects: vec![Effect::ReadFile {
                request,
                path: path.to_string(),
            }],
            state_changed: true,
        }
    }

    /// Re-reads an open tab from the store. Once the content arrives it
    /// overwrites any unsaved edits and the tab becomes active; a failed read
    /// leaves the active tab where it was.
    fn refetch_tab(&mut self, path: &str) -> super::DispatchResult {
        let Some(tab) = self.state.session.tab(path) else {
            return super::DispatchResult::unchanged();
        };

        if tab.is_saving() {
            self.state
                .notifications
                .warn(format!("{path} is being saved; try again when the save finishes"));
            return super::DispatchResult::changed(true);
        }

        if let Some(request) = tab.loading_request() {
            self.state.session.set_pending_open(PendingOpen {
                path: path.to_string(),
                request,
            });
            return super::DispatchResult::changed(true);
        }

        let request = self.state.alloc_request();
        if let Some(tab) = self.state.session.tab_mut(path) {
            tab.begin_load(request);
        }
        self.state.session.set_pending_open(PendingOpen {
            path: path.to_string(),
            request,
        });

        super::DispatchResult {
            effects: vec![Effect::ReadFile {
                request,
                path: path.to_string(),
            }],
            state_changed: true,
        }
    }

    fn close_tab(&mut self, path: &str) -> super::DispatchResult {
        let Some(outcome) = self.state.session.close(path) else {
            return super::DispatchResult::unchanged();
        };
        tracing::debug!(path, next = ?outcome.next_active, "tab closed");

        match outcome.next_active {
            Some(next) if self.state.config.tab_switch == TabSwitchPolicy::Refetch => {
                let mut result = self.refetch_tab(&next);
                result.state_changed = true;
                result
            }
            _ => super::DispatchResult::changed(true),
        }
    }

    fn cycle_tab(&mut self, delta: isize) -> super::DispatchResult {
        let Some(path) = self.state.session.cycle(delta) else {
            return super::DispatchResult::unchanged();
        };
        self.state.session.clear_pending_open();

        match self.state.config.tab_switch {
            TabSwitchPolicy::Retain => super::DispatchResult::changed(true),
            TabSwitchPolicy::Refetch => {
                let mut result = self.refetch_tab(&path);
                result.state_changed = true;
                result
            }
        }
    }
}
