use crate::kernel::effect::RequestId;
use crate::kernel::save::SaveError;
use crate::kernel::services::ports::{FileSnapshot, RemoteEntry, StoreError, VersionToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ExplorerLoadRoot,
    ExplorerToggle {
        path: String,
    },
    ExplorerCollapseAll,
    OpenFile {
        path: String,
    },
    ReloadTab {
        path: String,
    },
    Edit {
        path: String,
        content: String,
    },
    CloseTab {
        path: String,
    },
    NextTab,
    PrevTab,
    Save {
        path: String,
    },
    ForceSave {
        path: String,
    },
    RequestPreview,
    ToggleTheme,
    DismissNotifications,
    DirLoaded {
        request: RequestId,
        path: String,
        entries: Vec<RemoteEntry>,
    },
    DirLoadError {
        request: RequestId,
        path: String,
        error: StoreError,
    },
    FileLoaded {
        request: RequestId,
        path: String,
        snapshot: FileSnapshot,
    },
    FileLoadError {
        request: RequestId,
        path: String,
        error: StoreError,
    },
    FileSaved {
        request: RequestId,
        path: String,
        edit_version: u64,
        result: Result<VersionToken, SaveError>,
    },
    PreviewReady {
        url: String,
    },
    PreviewFailed {
        error: String,
    },
}
