//! GitHub REST contents API as a [`RemoteStore`].
//!
//! Listing and reading are `GET /repos/{owner}/{repo}/contents/{path}`; writing
//! is a `PUT` to the same URL carrying base64 content and the blob `sha` the
//! write is built against. The blob `sha` is the version token.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::kernel::services::ports::{
    EntryKind, FileSnapshot, RemoteEntry, RemoteSettings, RemoteStore, StoreError, StoreFuture,
    StoreResult, VersionToken,
};

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
    /// `{path}` is replaced with the written path.
    pub commit_message: String,
}

impl GithubConfig {
    /// Builds the config from settings, reading the access token from the
    /// environment variable the settings name.
    pub fn from_settings(remote: &RemoteSettings, commit_message: &str) -> Self {
        let token = std::env::var(&remote.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            api_base: remote.api_base.trim_end_matches('/').to_string(),
            owner: remote.owner.clone(),
            repo: remote.repo.clone(),
            branch: remote.branch.clone().filter(|b| !b.is_empty()),
            token,
            api_version: remote.api_version.clone(),
            timeout: Duration::from_secs(remote.timeout_secs.max(1)),
            commit_message: commit_message.to_string(),
        }
    }

    pub fn contents_url(&self, path: &str) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/contents",
            self.api_base,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo)
        );
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn read_url(&self, path: &str) -> String {
        let url = self.contents_url(path);
        match &self.branch {
            Some(branch) => format!("{url}?ref={}", urlencoding::encode(branch)),
            None => url,
        }
    }

    fn commit_message_for(&self, path: &str) -> String {
        self.commit_message.replace("{path}", path)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Debug, Deserialize)]
struct WrittenContent {
    sha: String,
}

pub struct GithubStore {
    client: Arc<GithubClient>,
}

impl GithubStore {
    pub fn new(config: GithubConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("ghedit/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            client: Arc::new(GithubClient { agent, config }),
        }
    }

    /// Runs a blocking HTTP call off the async workers.
    async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&GithubClient) -> StoreResult<T> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || f(client.as_ref()))
            .await
            .map_err(|e| StoreError::Transport(format!("worker task failed: {e}")))?
    }
}

struct GithubClient {
    agent: ureq::Agent,
    config: GithubConfig,
}

impl GithubClient {
    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut req = self
            .agent
            .request(method, url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", &self.config.api_version);
        if let Some(token) = &self.config.token {
            req = req.set("Authorization", &format!("token {token}"));
        }
        req
    }

    fn get_json(&self, path: &str) -> StoreResult<serde_json::Value> {
        let url = self.config.read_url(path);
        let resp = self
            .request("GET", &url)
            .call()
            .map_err(|e| map_ureq_error(path, e))?;
        resp.into_json().map_err(|e| StoreError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn list(&self, path: &str) -> StoreResult<Vec<RemoteEntry>> {
        let body = self.get_json(path)?;
        parse_listing(path, body)
    }

    fn read(&self, path: &str) -> StoreResult<FileSnapshot> {
        let body = self.get_json(path)?;
        parse_file(path, body)
    }

    fn version(&self, path: &str) -> StoreResult<VersionToken> {
        let body = self.get_json(path)?;
        let item = parse_file_item(path, body)?;
        Ok(VersionToken::new(item.sha))
    }

    fn write(
        &self,
        path: &str,
        content: &str,
        expected: &VersionToken,
    ) -> StoreResult<VersionToken> {
        let url = self.config.contents_url(path);
        let mut body = json!({
            "message": self.config.commit_message_for(path),
            "content": STANDARD.encode(content.as_bytes()),
            "sha": expected.as_str(),
        });
        if let Some(branch) = &self.config.branch {
            body["branch"] = json!(branch);
        }

        let resp = self
            .request("PUT", &url)
            .send_json(body)
            .map_err(|e| map_ureq_error(path, e))?;
        let written: WriteResponse = resp.into_json().map_err(|e| StoreError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(VersionToken::new(written.content.sha))
    }
}

impl RemoteStore for GithubStore {
    fn list_directory<'a>(&'a self, path: &'a str) -> StoreFuture<'a, Vec<RemoteEntry>> {
        let owned = path.to_string();
        Box::pin(self.blocking(move |client| client.list(&owned)))
    }

    fn read_file<'a>(&'a self, path: &'a str) -> StoreFuture<'a, FileSnapshot> {
        let owned = path.to_string();
        Box::pin(self.blocking(move |client| client.read(&owned)))
    }

    fn file_version<'a>(&'a self, path: &'a str) -> StoreFuture<'a, VersionToken> {
        let owned = path.to_string();
        Box::pin(self.blocking(move |client| client.version(&owned)))
    }

    fn write_file<'a>(
        &'a self,
        path: &'a str,
        content: &'a str,
        expected: &'a VersionToken,
    ) -> StoreFuture<'a, VersionToken> {
        let owned = path.to_string();
        let content = content.to_string();
        let expected = expected.clone();
        Box::pin(self.blocking(move |client| client.write(&owned, &content, &expected)))
    }
}

pub(crate) fn map_ureq_error(path: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(404, _) => StoreError::NotFound(path.to_string()),
        ureq::Error::Status(409, _) => StoreError::VersionConflict(path.to_string()),
        ureq::Error::Status(code, resp) => {
            let text = resp.status_text().to_string();
            StoreError::Transport(format!("HTTP {code} {text}").trim_end().to_string())
        }
        ureq::Error::Transport(t) => StoreError::Transport(t.to_string()),
    }
}

pub(crate) fn parse_listing(path: &str, body: serde_json::Value) -> StoreResult<Vec<RemoteEntry>> {
    if !body.is_array() {
        return Err(StoreError::Decode {
            path: path.to_string(),
            reason: "expected a directory listing".to_string(),
        });
    }
    let items: Vec<ContentItem> =
        serde_json::from_value(body).map_err(|e| StoreError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let kind = match item.kind.as_str() {
                "dir" => EntryKind::Directory,
                "file" | "symlink" => EntryKind::File,
                other => {
                    tracing::debug!(path = %item.path, kind = other, "skipping entry");
                    return None;
                }
            };
            Some(RemoteEntry::new(item.name, item.path, kind))
        })
        .collect())
}

fn parse_file_item(path: &str, body: serde_json::Value) -> StoreResult<ContentItem> {
    if body.is_array() {
        return Err(StoreError::Decode {
            path: path.to_string(),
            reason: "path is a directory".to_string(),
        });
    }
    let item: ContentItem = serde_json::from_value(body).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    if item.kind != "file" {
        return Err(StoreError::Decode {
            path: path.to_string(),
            reason: format!("not a file ({})", item.kind),
        });
    }
    Ok(item)
}

pub(crate) fn parse_file(path: &str, body: serde_json::Value) -> StoreResult<FileSnapshot> {
    let item = parse_file_item(path, body)?;
    if let Some(encoding) = item.encoding.as_deref() {
        if encoding != "base64" {
            return Err(StoreError::Decode {
                path: path.to_string(),
                reason: format!("unsupported encoding {encoding}"),
            });
        }
    }
    let content = decode_content(path, item.content.as_deref().unwrap_or(""))?;
    Ok(FileSnapshot {
        content,
        version: VersionToken::new(item.sha),
    })
}

/// GitHub wraps base64 payloads at 60 columns.
pub(crate) fn decode_content(path: &str, encoded: &str) -> StoreResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| StoreError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|_| StoreError::Decode {
        path: path.to_string(),
        reason: "content is not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/github.rs"]
mod tests;
