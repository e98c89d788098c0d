use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub preview: PreviewSettings,
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub token_env: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: None,
            token_env: "GITHUB_TOKEN".to_string(),
            api_version: "2022-11-28".to_string(),
            timeout_secs: 30,
        }
    }
}

/// What selecting an already-open tab does with its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabSwitchPolicy {
    /// Keep the tab's in-memory content, including unsaved edits.
    #[default]
    Retain,
    /// Re-read the file from the store and overwrite the tab.
    Refetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub tab_switch: TabSwitchPolicy,
    pub strict_versioning: bool,
    pub commit_message: String,
    pub max_notifications: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tab_switch: TabSwitchPolicy::Retain,
            strict_versioning: false,
            commit_message: "Updated {path}".to_string(),
            max_notifications: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub target: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            target: "frontend".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub worker_threads: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { worker_threads: 2 }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
