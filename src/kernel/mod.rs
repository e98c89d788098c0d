//! Headless application core (state/action/effect).

pub mod action;
pub mod effect;
pub mod notification;
pub mod save;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use action::Action;
pub use effect::{Effect, RequestId};
pub use notification::{Notification, NotificationLevel, Notifications};
pub use save::{save_with_fresh_token, SaveError};
pub use session::{CloseOutcome, OpenTab, PendingOpen, SessionState};
pub use state::{AppState, ExplorerState, PreviewState, SessionConfig, ToggleOutcome};
pub use store::{DispatchResult, Store};
