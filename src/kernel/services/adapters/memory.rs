//! Versioned in-memory [`RemoteStore`].
//!
//! Directories are implied by file paths and listed in insertion order.
//! Tokens are `v1`, `v2`, ... and change on every write.

use std::sync::{Mutex, MutexGuard};

use crate::kernel::services::ports::{
    EntryKind, FileSnapshot, RemoteEntry, RemoteStore, StoreError, StoreFuture, StoreResult,
    VersionToken,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub read: usize,
    pub version: usize,
    pub write: usize,
}

#[derive(Debug)]
struct StoredFile {
    path: String,
    content: String,
    version: VersionToken,
}

#[derive(Debug, Default)]
struct Inner {
    files: Vec<StoredFile>,
    next_version: u64,
    calls: CallCounts,
    fail_next: Option<StoreError>,
    interference: Option<(String, String)>,
}

impl Inner {
    fn bump_version(&mut self) -> VersionToken {
        self.next_version += 1;
        VersionToken::new(format!("v{}", self.next_version))
    }

    fn file(&self, path: &str) -> Option<&StoredFile> {
        self.files.iter().find(|f| f.path == path)
    }

    fn put(&mut self, path: &str, content: &str) -> VersionToken {
        let version = self.bump_version();
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(file) => {
                file.content = content.to_string();
                file.version = version.clone();
            }
            None => self.files.push(StoredFile {
                path: path.to_string(),
                content: content.to_string(),
                version: version.clone(),
            }),
        }
        version
    }

    fn take_failure(&mut self) -> StoreResult<()> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Applies a queued external write once `path` has been read.
    fn interfere(&mut self, path: &str) {
        if self
            .interference
            .as_ref()
            .is_some_and(|(target, _)| target == path)
        {
            if let Some((target, content)) = self.interference.take() {
                let version = self.put(&target, &content);
                tracing::debug!(path = %target, %version, "simulated external write");
            }
        }
    }

    fn list(&self, dir: &str) -> StoreResult<Vec<RemoteEntry>> {
        if !dir.is_empty() && self.file(dir).is_some() {
            return Err(StoreError::Decode {
                path: dir.to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let mut entries: Vec<RemoteEntry> = Vec::new();
        for file in &self.files {
            let Some(rest) = file.path.strip_prefix(&prefix) else {
                continue;
            };
            let (name, kind) = match rest.split_once('/') {
                Some((name, _)) => (name, EntryKind::Directory),
                None => (rest, EntryKind::File),
            };
            if entries.iter().any(|e| e.name == name) {
                continue;
            }
            entries.push(RemoteEntry::new(name, format!("{prefix}{name}"), kind));
        }

        if entries.is_empty() && !dir.is_empty() {
            return Err(StoreError::NotFound(dir.to_string()));
        }
        Ok(entries)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (path, content) in files {
            store.insert(path, content);
        }
        store
    }

    /// A small web project used by the CLI demo mode.
    pub fn demo() -> Self {
        Self::with_files([
            ("frontend/index.html", "<!doctype html>\n<div id=\"root\"></div>\n"),
            ("frontend/styles.css", "body { margin: 0; }\n"),
            ("src/app.js", "console.log('hello');\n"),
            ("src/components/Button.js", "export const Button = () => null;\n"),
            ("package.json", "{\n  \"name\": \"demo\"\n}\n"),
            ("README.md", "# demo\n"),
        ])
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds or replaces a file without going through the version check.
    pub fn insert(&self, path: &str, content: &str) -> VersionToken {
        self.lock().put(path, content)
    }

    /// Simulates another client writing `path`.
    pub fn external_write(&self, path: &str, content: &str) -> VersionToken {
        self.insert(path, content)
    }

    /// The next read of `path` (content or token) returns the pre-write token,
    /// then `content` is written behind the caller's back.
    pub fn interfere_after_next_read(&self, path: &str, content: &str) {
        self.lock().interference = Some((path.to_string(), content.to_string()));
    }

    /// The next store call of any kind fails with `error`.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_next = Some(error);
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().file(path).map(|f| f.content.clone())
    }

    pub fn version(&self, path: &str) -> Option<VersionToken> {
        self.lock().file(path).map(|f| f.version.clone())
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }
}

impl RemoteStore for InMemoryStore {
    fn list_directory<'a>(&'a self, path: &'a str) -> StoreFuture<'a, Vec<RemoteEntry>> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.calls.list += 1;
            inner.take_failure()?;
            inner.list(path)
        })
    }

    fn read_file<'a>(&'a self, path: &'a str) -> StoreFuture<'a, FileSnapshot> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.calls.read += 1;
            inner.take_failure()?;
            let snapshot = match inner.file(path) {
                Some(file) => FileSnapshot {
                    content: file.content.clone(),
                    version: file.version.clone(),
                },
                None => return Err(StoreError::NotFound(path.to_string())),
            };
            inner.interfere(path);
            Ok(snapshot)
        })
    }

    fn file_version<'a>(&'a self, path: &'a str) -> StoreFuture<'a, VersionToken> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.calls.version += 1;
            inner.take_failure()?;
            let version = inner
                .file(path)
                .map(|f| f.version.clone())
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            inner.interfere(path);
            Ok(version)
        })
    }

    fn write_file<'a>(
        &'a self,
        path: &'a str,
        content: &'a str,
        expected: &'a VersionToken,
    ) -> StoreFuture<'a, VersionToken> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.calls.write += 1;
            inner.take_failure()?;
            let current = inner
                .file(path)
                .map(|f| f.version.clone())
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            if &current != expected {
                return Err(StoreError::VersionConflict(path.to_string()));
            }
            Ok(inner.put(path, content))
        })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/memory.rs"]
mod tests;
