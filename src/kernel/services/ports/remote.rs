//! Remote store contract: listing, content read and content write against a
//! versioned file store. Implementations return raw data and do no caching.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("cannot decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("version conflict on {0}")]
    VersionConflict(String),
}

/// Opaque revision identifier handed out by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    pub content: String,
    pub version: VersionToken,
}

pub trait RemoteStore: Send + Sync {
    fn list_directory<'a>(&'a self, path: &'a str) -> StoreFuture<'a, Vec<RemoteEntry>>;

    fn read_file<'a>(&'a self, path: &'a str) -> StoreFuture<'a, FileSnapshot>;

    /// Current version token of `path` without its content.
    fn file_version<'a>(&'a self, path: &'a str) -> StoreFuture<'a, VersionToken> {
        Box::pin(async move { self.read_file(path).await.map(|snapshot| snapshot.version) })
    }

    /// Writes `content` if `expected` is still the current token and returns
    /// the new token. A stale `expected` fails with [`StoreError::VersionConflict`].
    fn write_file<'a>(
        &'a self,
        path: &'a str,
        content: &'a str,
        expected: &'a VersionToken,
    ) -> StoreFuture<'a, VersionToken>;
}
