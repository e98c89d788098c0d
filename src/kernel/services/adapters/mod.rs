//! Service adapters: network, filesystem and runtime implementations of the ports.

pub mod buffer;
pub mod github;
pub mod memory;
pub mod paths;
pub mod preferences;
pub mod preview;
pub mod runtime;
pub mod settings;

pub use buffer::PlainBuffer;
pub use github::{GithubConfig, GithubStore};
pub use memory::{CallCounts, InMemoryStore};
pub use paths::{ensure_log_dir, get_app_data_dir, get_log_dir, get_preferences_path, get_settings_path};
pub use preferences::{JsonFilePreferences, MemoryPreferences};
pub use preview::HttpPreviewService;
pub use runtime::{AppMessage, AsyncRuntime, RuntimeServices};
pub use settings::{ensure_settings_file, load_settings, SettingsError};
