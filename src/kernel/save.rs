//! Optimistic-concurrency write-back.
//!
//! A save always re-reads the current version token before writing, because
//! the store only accepts a write built against its current token. The read and
//! the write are two calls; an external write landing between them surfaces as
//! [`SaveError::VersionConflict`].

use thiserror::Error;

use crate::kernel::services::ports::{RemoteStore, StoreError, VersionToken};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("{path} was modified in the store; reload it or overwrite")]
    VersionConflict { path: String },
    #[error("failed to save {path}: {source}")]
    Failed { path: String, source: StoreError },
}

impl SaveError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SaveError::VersionConflict { .. })
    }

    fn from_store(path: &str, error: StoreError) -> Self {
        match error {
            StoreError::VersionConflict(_) => SaveError::VersionConflict {
                path: path.to_string(),
            },
            source => SaveError::Failed {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Runs one save attempt. `base` is the token the content was edited against;
/// when given, a different current token is reported as a conflict without
/// writing. No retry is attempted.
pub async fn save_with_fresh_token(
    store: &dyn RemoteStore,
    path: &str,
    content: &str,
    base: Option<&VersionToken>,
) -> Result<VersionToken, SaveError> {
    let current = store
        .file_version(path)
        .await
        .map_err(|e| SaveError::from_store(path, e))?;

    if let Some(base) = base {
        if base != &current {
            tracing::info!(path, base = %base, current = %current, "store token moved since load");
            return Err(SaveError::VersionConflict {
                path: path.to_string(),
            });
        }
    }

    let written = store
        .write_file(path, content, &current)
        .await
        .map_err(|e| SaveError::from_store(path, e))?;

    tracing::debug!(path, from = %current, to = %written, "write accepted");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/save.rs"]
mod tests;
