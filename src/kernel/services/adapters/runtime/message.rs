use crate::kernel::effect::RequestId;
use crate::kernel::save::SaveError;
use crate::kernel::services::ports::{FileSnapshot, RemoteEntry, StoreError, VersionToken};
use crate::kernel::Action;

/// Completion of an effect, sent from a runtime task back to the thread that
/// owns the store.
#[derive(Debug)]
pub enum AppMessage {
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
    FileError {
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

impl From<AppMessage> for Action {
    fn from(msg: AppMessage) -> Self {
        match msg {
            AppMessage::DirLoaded {
                request,
                path,
                entries,
            } => Action::DirLoaded {
                request,
                path,
                entries,
            },
            AppMessage::DirLoadError {
                request,
                path,
                error,
            } => Action::DirLoadError {
                request,
                path,
                error,
            },
            AppMessage::FileLoaded {
                request,
                path,
                snapshot,
            } => Action::FileLoaded {
                request,
                path,
                snapshot,
            },
            AppMessage::FileError {
                request,
                path,
                error,
            } => Action::FileLoadError {
                request,
                path,
                error,
            },
            AppMessage::FileSaved {
                request,
                path,
                edit_version,
                result,
            } => Action::FileSaved {
                request,
                path,
                edit_version,
                result,
            },
            AppMessage::PreviewReady { url } => Action::PreviewReady { url },
            AppMessage::PreviewFailed { error } => Action::PreviewFailed { error },
        }
    }
}
