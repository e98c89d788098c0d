use super::message::AppMessage;
use crate::kernel::save::save_with_fresh_token;
use crate::kernel::services::ports::{PreferenceStore, PreviewError, PreviewService, RemoteStore};
use crate::kernel::Effect;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Backends the runtime executes effects against.
#[derive(Clone)]
pub struct RuntimeServices {
    pub store: Arc<dyn RemoteStore>,
    pub preview: Option<Arc<dyn PreviewService>>,
    pub preferences: Arc<dyn PreferenceStore>,
}

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    services: RuntimeServices,
}

impl AsyncRuntime {
    pub fn new(
        tx: Sender<AppMessage>,
        services: RuntimeServices,
        worker_threads: usize,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            services,
        })
    }

    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::ListDirectory { request, path } => {
                let tx = self.tx.clone();
                let store = Arc::clone(&self.services.store);
                self.runtime.spawn(async move {
                    let msg = match store.list_directory(&path).await {
                        Ok(entries) => AppMessage::DirLoaded {
                            request,
                            path,
                            entries,
                        },
                        Err(error) => AppMessage::DirLoadError {
                            request,
                            path,
                            error,
                        },
                    };
                    let _ = tx.send(msg);
                });
            }
            Effect::ReadFile { request, path } => {
                let tx = self.tx.clone();
                let store = Arc::clone(&self.services.store);
                self.runtime.spawn(async move {
                    let msg = match store.read_file(&path).await {
                        Ok(snapshot) => AppMessage::FileLoaded {
                            request,
                            path,
                            snapshot,
                        },
                        Err(error) => AppMessage::FileError {
                            request,
                            path,
                            error,
                        },
                    };
                    let _ = tx.send(msg);
                });
            }
            Effect::SaveFile {
                request,
                path,
                content,
                edit_version,
                base_version,
            } => {
                let tx = self.tx.clone();
                let store = Arc::clone(&self.services.store);
                self.runtime.spawn(async move {
                    let result =
                        save_with_fresh_token(store.as_ref(), &path, &content, base_version.as_ref())
                            .await;
                    let _ = tx.send(AppMessage::FileSaved {
                        request,
                        path,
                        edit_version,
                        result,
                    });
                });
            }
            Effect::RequestPreview { workspace } => {
                let tx = self.tx.clone();
                let preview = self.services.preview.clone();
                self.runtime.spawn(async move {
                    let result = match preview {
                        Some(preview) => preview.request_preview(&workspace).await,
                        None => Err(PreviewError::NotConfigured),
                    };
                    let msg = match result {
                        Ok(url) => AppMessage::PreviewReady { url },
                        Err(e) => AppMessage::PreviewFailed {
                            error: e.to_string(),
                        },
                    };
                    let _ = tx.send(msg);
                });
            }
            Effect::PersistPreference { key, value } => {
                let preferences = Arc::clone(&self.services.preferences);
                self.runtime.spawn_blocking(move || {
                    if let Err(e) = preferences.set(&key, &value) {
                        tracing::warn!(key = %key, error = %e, "failed to persist preference");
                    }
                });
            }
        }
    }
}
