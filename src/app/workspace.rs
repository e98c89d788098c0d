use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::kernel::services::adapters::{AppMessage, AsyncRuntime, RuntimeServices};
use crate::kernel::services::ports::{TextBufferWidget, Theme, WorkspaceId, THEME_KEY};
use crate::kernel::{Action, AppState, SessionConfig, Store};

/// Drives one editing session: owns the store, executes its effects on the
/// async runtime and mirrors the displayed content into the text widget.
pub struct Workspace<W: TextBufferWidget> {
    store: Store,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    widget: W,
    synced_revision: Option<u64>,
}

impl<W: TextBufferWidget> Workspace<W> {
    /// Builds the session and starts loading the repository root.
    pub fn open(
        workspace: WorkspaceId,
        config: SessionConfig,
        services: RuntimeServices,
        worker_threads: usize,
        widget: W,
    ) -> io::Result<Self> {
        let theme = services
            .preferences
            .get(THEME_KEY)
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel();
        let runtime = AsyncRuntime::new(tx, services, worker_threads)?;
        tracing::info!(workspace = %workspace, theme = theme.as_str(), "workspace opened");

        let mut this = Self {
            store: Store::new(AppState::new(workspace, config, theme)),
            runtime,
            rx,
            widget,
            synced_revision: None,
        };
        this.dispatch(Action::ExplorerLoadRoot);
        Ok(this)
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let changed = self.apply(action);
        self.sync_widget();
        changed
    }

    /// Feeds the widget's current text back as an edit of the active tab.
    pub fn buffer_edited(&mut self) -> bool {
        let Some(path) = self.state().session.active_path().map(str::to_string) else {
            return false;
        };
        let content = self.widget.content();
        let changed = self.apply(Action::Edit { path, content });
        // The widget already shows this text.
        self.synced_revision = Some(self.state().session.display_revision());
        changed
    }

    fn apply(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.runtime.execute(effect);
        }
        result.state_changed
    }

    /// Applies every completed effect without blocking. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            self.dispatch(msg.into());
            applied += 1;
        }
        applied
    }

    /// Blocks until no request is in flight. Returns `false` on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.state().has_requests_in_flight() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.dispatch(msg.into());
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::error!("runtime channel disconnected");
                    return false;
                }
            }
        }
        true
    }

    fn sync_widget(&mut self) {
        let session = &self.store.state().session;
        let revision = session.display_revision();
        if self.synced_revision == Some(revision) {
            return;
        }
        self.widget.set_content(session.displayed_content());
        self.synced_revision = Some(revision);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workspace.rs"]
mod tests;
