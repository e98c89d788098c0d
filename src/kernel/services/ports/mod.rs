//! Service ports: traits + data contracts.

pub mod buffer;
pub mod preferences;
pub mod preview;
pub mod remote;
pub mod settings;

pub use buffer::TextBufferWidget;
pub use preferences::{PreferenceError, PreferenceStore, Theme, THEME_KEY};
pub use preview::{PreviewError, PreviewFuture, PreviewService, WorkspaceId};
pub use remote::{
    EntryKind, FileSnapshot, RemoteEntry, RemoteStore, StoreError, StoreFuture, StoreResult,
    VersionToken,
};
pub use settings::{
    PreviewSettings, RemoteSettings, RuntimeSettings, SessionSettings, Settings, TabSwitchPolicy,
};
