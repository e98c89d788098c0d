use crate::kernel::state::ToggleOutcome;
use crate::kernel::Action;
use crate::models::LoadState;

impl super::Store {
    pub(super) fn reduce_explorer_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::ExplorerLoadRoot => {
                if self.state.explorer.load_state("") != Some(LoadState::NotLoaded) {
                    return super::DispatchResult::unchanged();
                }
                self.toggle_node("")
            }
            Action::ExplorerToggle { path } => self.toggle_node(&path),
            Action::ExplorerCollapseAll => {
                super::DispatchResult::changed(self.state.explorer.collapse_all())
            }
            Action::DirLoaded {
                request,
                path,
                entries,
            } => super::DispatchResult::changed(
                self.state
                    .explorer
                    .apply_dir_loaded(request, &path, entries),
            ),
            Action::DirLoadError {
                request,
                path,
                error,
            } => {
                if !self.state.explorer.apply_dir_load_error(request, &path) {
                    return super::DispatchResult::unchanged();
                }
                tracing::warn!(path = %path, error = %error, "directory listing failed");
                let label = if path.is_empty() { "/" } else { path.as_str() };
                self.state
                    .notifications
                    .error(format!("Failed to list {label}: {error}"));
                super::DispatchResult::changed(true)
            }
            _ => unreachable!("non-explorer action passed to reduce_explorer_action"),
        }
    }

    fn toggle_node(&mut self, path: &str) -> super::DispatchResult {
        let request = self.state.alloc_request();
        match self.state.explorer.toggle(path, request) {
            ToggleOutcome::Fetch(effect) => super::DispatchResult {
                effects: vec![effect],
                state_changed: true,
            },
            ToggleOutcome::Toggled { .. } => super::DispatchResult::changed(true),
            ToggleOutcome::AlreadyLoading => {
                tracing::debug!(path, "listing already in flight");
                super::DispatchResult::unchanged()
            }
            ToggleOutcome::IsFile => super::DispatchResult::unchanged(),
            ToggleOutcome::UnknownPath => {
                self.state
                    .notifications
                    .warn(format!("{path} is not in the tree"));
                super::DispatchResult::changed(true)
            }
        }
    }
}
