use std::fmt;

use crate::kernel::services::ports::{VersionToken, WorkspaceId};

/// Sequence number attached to every remote request; results carry it back so
/// the store can tell current results from stale ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ListDirectory {
        request: RequestId,
        path: String,
    },
    ReadFile {
        request: RequestId,
        path: String,
    },
    SaveFile {
        request: RequestId,
        path: String,
        content: String,
        edit_version: u64,
        /// Token the tab was loaded with; set only when the fresh token must
        /// still match it before writing.
        base_version: Option<VersionToken>,
    },
    RequestPreview {
        workspace: WorkspaceId,
    },
    PersistPreference {
        key: String,
        value: String,
    },
}
