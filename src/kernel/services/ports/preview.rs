use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies the remote repository the session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId {
    pub owner: String,
    pub repo: String,
}

impl WorkspaceId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("preview endpoint is not configured")]
    NotConfigured,
    #[error("preview request failed: {0}")]
    Transport(String),
    #[error("preview response is invalid: {0}")]
    InvalidResponse(String),
}

pub type PreviewFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, PreviewError>> + Send + 'a>>;

/// Triggers a remote build and returns a navigable preview URL.
pub trait PreviewService: Send + Sync {
    fn request_preview<'a>(&'a self, workspace: &'a WorkspaceId) -> PreviewFuture<'a>;
}
