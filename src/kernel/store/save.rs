use crate::kernel::{Action, Effect};
use crate::models::file_tree::normalize;

impl super::Store {
    pub(super) fn reduce_save_action(&mut self, action: Action) -> super::DispatchResult {
        match action {
            Action::Save { path } => self.begin_save(normalize(&path), false),
            Action::ForceSave { path } => self.begin_save(normalize(&path), true),
            Action::FileSaved {
                request,
                path,
                edit_version,
                result,
            } => {
                let Some(tab) = self.state.session.tab_mut(&path) else {
                    tracing::debug!(path = %path, %request, "save finished for a closed tab");
                    return super::DispatchResult::unchanged();
                };
                if tab.saving_request() != Some(request) {
                    tracing::debug!(path = %path, %request, "discarding stale save result");
                    return super::DispatchResult::unchanged();
                }

                match result {
                    Ok(version) => {
                        tracing::info!(path = %path, version = %version, "file saved");
                        tab.finish_save(version, edit_version);
                        self.state.notifications.info(format!("Saved {path}"));
                    }
                    Err(error) if error.is_conflict() => {
                        tracing::warn!(path = %path, "save rejected by version check");
                        tab.fail_save(true);
                        self.state.notifications.warn(error.to_string());
                    }
                    Err(error) => {
                        tracing::error!(path = %path, error = %error, "save failed");
                        tab.fail_save(false);
                        self.state.notifications.error(error.to_string());
                    }
                }
                super::DispatchResult::changed(true)
            }
            _ => unreachable!("non-save action passed to reduce_save_action"),
        }
    }

    fn begin_save(&mut self, path: &str, force: bool) -> super::DispatchResult {
        let strict = self.state.config.strict_versioning && !force;
        let Some(tab) = self.state.session.tab(path) else {
            return super::DispatchResult::unchanged();
        };
        if !tab.is_dirty() || tab.is_saving() {
            return super::DispatchResult::unchanged();
        }
        if tab.is_loading() {
            self.state
                .notifications
                .warn(format!("{path} is still loading; save skipped"));
            return super::DispatchResult::changed(true);
        }

        let content = tab.content().to_string();
        let edit_version = tab.edit_version();
        let base_version = strict.then(|| tab.version().clone());

        let request = self.state.alloc_request();
        if let Some(tab) = self.state.session.tab_mut(path) {
            tab.begin_save(request);
        }
        tracing::debug!(path, %request, force, "saving");

        super::DispatchResult {
            effects: vec![Effect::SaveFile {
                request,
                path: path.to_string(),
                content,
                edit_version,
                base_version,
            }],
            state_changed: true,
        }
    }
}
