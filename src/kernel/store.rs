use super::services::ports::THEME_KEY;
use super::{Action, AppState, Effect};

mod explorer;
mod save;
mod session;

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }
}

/// Single writer of the application state. Every mutation goes through
/// [`Store::dispatch`]; remote work is returned as effects.
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::ExplorerLoadRoot
            | Action::ExplorerToggle { .. }
            | Action::ExplorerCollapseAll
            | Action::DirLoaded { .. }
            | Action::DirLoadError { .. } => self.reduce_explorer_action(action),
            Action::OpenFile { .. }
            | Action::ReloadTab { .. }
            | Action::Edit { .. }
            | Action::CloseTab { .. }
            | Action::NextTab
            | Action::PrevTab
            | Action::FileLoaded { .. }
            | Action::FileLoadError { .. } => self.reduce_session_action(action),
            Action::Save { .. } | Action::ForceSave { .. } | Action::FileSaved { .. } => {
                self.reduce_save_action(action)
            }
            Action::RequestPreview => {
                if self.state.preview.in_flight {
                    return DispatchResult::unchanged();
                }
                self.state.preview.in_flight = true;
                DispatchResult {
                    effects: vec![Effect::RequestPreview {
                        workspace: self.state.workspace.clone(),
                    }],
                    state_changed: true,
                }
            }
            Action::PreviewReady { url } => {
                self.state.preview.in_flight = false;
                self.state
                    .notifications
                    .info(format!("Preview ready: {url}"));
                self.state.preview.last_url = Some(url);
                DispatchResult::changed(true)
            }
            Action::PreviewFailed { error } => {
                tracing::warn!(error = %error, "preview failed");
                self.state.preview.in_flight = false;
                self.state
                    .notifications
                    .error(format!("Preview failed: {error}"));
                DispatchResult::changed(true)
            }
            Action::ToggleTheme => {
                let theme = self.state.theme.toggled();
                self.state.theme = theme;
                DispatchResult {
                    effects: vec![Effect::PersistPreference {
                        key: THEME_KEY.to_string(),
                        value: theme.as_str().to_string(),
                    }],
                    state_changed: true,
                }
            }
            Action::DismissNotifications => {
                DispatchResult::changed(self.state.notifications.clear())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
