//! HTTP client for the build-and-preview endpoint.
//!
//! `POST {endpoint}` with `{"owner", "repo", "filePath"}`; the response carries
//! `previewUrl`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kernel::services::ports::{PreviewError, PreviewFuture, PreviewService, WorkspaceId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewRequest<'a> {
    owner: &'a str,
    repo: &'a str,
    file_path: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewResponse {
    #[serde(default)]
    preview_url: Option<String>,
}

pub struct HttpPreviewService {
    agent: ureq::Agent,
    endpoint: Arc<str>,
    target: Arc<str>,
}

impl HttpPreviewService {
    pub fn new(endpoint: &str, target: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: Arc::from(endpoint),
            target: Arc::from(target),
        }
    }
}

impl PreviewService for HttpPreviewService {
    fn request_preview<'a>(&'a self, workspace: &'a WorkspaceId) -> PreviewFuture<'a> {
        let agent = self.agent.clone();
        let endpoint = Arc::clone(&self.endpoint);
        let target = Arc::clone(&self.target);
        let workspace = workspace.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let body = PreviewRequest {
                    owner: &workspace.owner,
                    repo: &workspace.repo,
                    file_path: &target,
                };
                let resp = agent
                    .post(&endpoint)
                    .send_json(&body)
                    .map_err(|e| PreviewError::Transport(e.to_string()))?;
                let text = resp
                    .into_string()
                    .map_err(|e| PreviewError::Transport(e.to_string()))?;
                parse_preview_response(&text)
            })
            .await
            .map_err(|e| PreviewError::Transport(format!("worker task failed: {e}")))?
        })
    }
}

pub(crate) fn parse_preview_response(text: &str) -> Result<String, PreviewError> {
    let resp: PreviewResponse =
        serde_json::from_str(text).map_err(|e| PreviewError::InvalidResponse(e.to_string()))?;
    resp.preview_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| PreviewError::InvalidResponse("missing previewUrl".to_string()))
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/preview.rs"]
mod tests;
