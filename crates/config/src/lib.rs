//! Configuration loading, validation, and management for DevAgent.
//!
//! Loads configuration from `~/.devagent/config.toml` (or the path in
//! `DEVAGENT_CONFIG`) with environment variable overrides. Validates all
//! settings at startup.
//!
//! Tokens for GitHub and Azure DevOps are *not* stored here: the config only
//! names the environment variables they are read from at the moment of use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.devagent/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// LLM provider name ("openai", "openrouter", "ollama", ...)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Control loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Committer identity and push credentials
    #[serde(default)]
    pub git: GitSettings,

    /// Pull request creation
    #[serde(default)]
    pub github: GitHubSettings,

    /// Work item lookup
    #[serde(default)]
    pub azure_devops: AzureDevOpsSettings,

    /// Queue event handling
    #[serde(default)]
    pub trigger: TriggerSettings,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("git", &self.git)
            .field("github", &self.github)
            .field("azure_devops", &self.azure_devops)
            .field("trigger", &self.trigger)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// System instruction file, re-read before every model call
    #[serde(default = "default_instruction_file")]
    pub instruction_file: PathBuf,

    /// Maximum decision steps per run
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_instruction_file() -> PathBuf {
    PathBuf::from("agent_prompt.txt")
}
fn default_max_steps() -> u32 {
    25
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            instruction_file: default_instruction_file(),
            max_steps: default_max_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSettings {
    #[serde(default = "default_git_user_name")]
    pub user_name: String,

    #[serde(default = "default_git_user_email")]
    pub user_email: String,

    /// Environment variable holding the push token
    #[serde(default = "default_github_token_env")]
    pub token_env: String,

    /// URL prefix the push token is sent to; other remotes never see it
    #[serde(default = "default_git_credential_url")]
    pub credential_url: String,
}

fn default_git_user_name() -> String {
    "DevAgent".into()
}
fn default_git_user_email() -> String {
    "bobncharlie@mail".into()
}
fn default_github_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_git_credential_url() -> String {
    "https://github.com/".into()
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            user_name: default_git_user_name(),
            user_email: default_git_user_email(),
            token_env: default_github_token_env(),
            credential_url: default_git_credential_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default = "default_github_token_env")]
    pub token_env: String,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token_env: default_github_token_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureDevOpsSettings {
    #[serde(default = "default_azure_api_url")]
    pub api_url: String,

    #[serde(default = "default_azure_organization")]
    pub organization: String,

    #[serde(default = "default_azure_project")]
    pub project: String,

    #[serde(default = "default_azure_api_version")]
    pub api_version: String,

    /// Environment variable holding the personal access token
    #[serde(default = "default_azure_token_env")]
    pub token_env: String,
}

fn default_azure_api_url() -> String {
    "https://dev.azure.com".into()
}
fn default_azure_organization() -> String {
    "skamalj-org".into()
}
fn default_azure_project() -> String {
    "agent-loki".into()
}
fn default_azure_api_version() -> String {
    "7.1".into()
}
fn default_azure_token_env() -> String {
    "AZ_DEVOPS_PAT".into()
}

impl Default for AzureDevOpsSettings {
    fn default() -> Self {
        Self {
            api_url: default_azure_api_url(),
            organization: default_azure_organization(),
            project: default_azure_project(),
            api_version: default_azure_api_version(),
            token_env: default_azure_token_env(),
        }
    }
}

/// How many records of a queue batch are handed to the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Only the first record; the rest are dropped with a warning
    #[default]
    First,
    /// Every record, one after another, each failing independently
    All,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerSettings {
    #[serde(default)]
    pub batch_mode: BatchMode,
}

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DEVAGENT_CONFIG";

impl AppConfig {
    /// Load configuration from `DEVAGENT_CONFIG` or the default path, then
    /// apply environment overrides:
    /// - `DEVAGENT_API_KEY`, then `OPENAI_API_KEY`
    /// - `DEVAGENT_PROVIDER`
    /// - `MODEL_NAME` (or `DEVAGENT_MODEL`)
    /// - `GIT_USER_NAME`, `GIT_USER_EMAIL`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        Self::load_with_env(&path)
    }

    /// Load from `path` and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("DEVAGENT_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }
        if let Some(provider) = lookup("DEVAGENT_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = lookup("MODEL_NAME").or_else(|| lookup("DEVAGENT_MODEL")) {
            self.model = model;
        }
        if let Some(name) = lookup("GIT_USER_NAME") {
            self.git.user_name = name;
        }
        if let Some(email) = lookup("GIT_USER_EMAIL") {
            self.git.user_email = email;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".devagent")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }

        if self.azure_devops.organization.trim().is_empty()
            || self.azure_devops.project.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "azure_devops.organization and azure_devops.project must be set".into(),
            ));
        }

        let scope = self.git.credential_url.trim();
        let is_http = scope.starts_with("https://") || scope.starts_with("http://");
        if !is_http || !scope.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "git.credential_url must be an http(s) URL ending in '/'".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            agent: AgentSettings::default(),
            git: GitSettings::default(),
            github: GitHubSettings::default(),
            azure_devops: AzureDevOpsSettings::default(),
            trigger: TriggerSettings::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
