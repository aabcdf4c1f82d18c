//! Tool implementations for DevAgent.
//!
//! The agent can read and edit files in a working copy, drive git (clone,
//! branch, commit, push), open GitHub pull requests, and read Azure DevOps
//! work items. All of them sit behind one [`Toolbox`], which parses each
//! call into a [`ToolAction`] before running it.

pub mod action;
pub mod azure_devops;
pub mod files;
pub mod git;
pub mod github;
pub mod secrets;

use async_trait::async_trait;
use devagent_config::AppConfig;
use devagent_core::error::ToolError;
use devagent_core::provider::ToolDefinition;
use devagent_core::tool::{ToolCall, ToolRegistry, ToolResult, Toolset};
use std::sync::Arc;
use tracing::info;

pub use action::ToolAction;
pub use azure_devops::AzureDevOpsClient;
pub use git::{GitCredential, GitIdentity};
pub use github::GitHubClient;
pub use secrets::{EnvSecrets, SecretSource, StaticSecrets};

/// The full set of DevAgent tools and the settings they run with.
pub struct Toolbox {
    identity: GitIdentity,
    git_token_env: String,
    git_credential_url: String,
    github: GitHubClient,
    github_token_env: String,
    azure: AzureDevOpsClient,
    azure_token_env: String,
    secrets: Arc<dyn SecretSource>,
}

impl Toolbox {
    /// Build from configuration, reading credentials from the environment.
    pub fn from_config(config: &AppConfig) -> Self {
        let azure = &config.azure_devops;
        Self {
            identity: GitIdentity {
                name: config.git.user_name.clone(),
                email: config.git.user_email.clone(),
            },
            git_token_env: config.git.token_env.clone(),
            git_credential_url: config.git.credential_url.clone(),
            github: GitHubClient::new(&config.github.api_url),
            github_token_env: config.github.token_env.clone(),
            azure: AzureDevOpsClient::new(
                &azure.api_url,
                &azure.organization,
                &azure.project,
                &azure.api_version,
            ),
            azure_token_env: azure.token_env.clone(),
            secrets: Arc::new(EnvSecrets),
        }
    }

    /// Replace the credential source.
    pub fn with_secrets(mut self, secrets: Arc<dyn SecretSource>) -> Self {
        self.secrets = secrets;
        self
    }

    fn push_credential(&self) -> Result<GitCredential, ToolError> {
        let token = self.secrets.require(&self.git_token_env)?;
        Ok(GitCredential::new(token, &self.git_credential_url))
    }

    async fn run(&self, action: ToolAction) -> Result<ToolResult, ToolError> {
        match action {
            ToolAction::ReadFile(args) => Ok(ToolResult::ok(files::read_file(&args.path).await?)),

            ToolAction::FetchWorkItem(args) => {
                let pat = self.secrets.require(&self.azure_token_env)?;
                let id = args.id.to_string();
                let item = self.azure.fetch_work_item(&pat, &id).await?;
                info!(work_item = %id, "Work item fetched");
                let output = serde_json::to_string_pretty(&item).unwrap_or_default();
                Ok(ToolResult::ok(output).with_data(item))
            }

            ToolAction::CreateBranch(args) => {
                let message = git::create_branch(&args.local_path, &args.branch_name).await?;
                Ok(ToolResult::ok(message))
            }

            ToolAction::ReplaceLines(args) => {
                files::replace_lines(&args.path, args.start_line, args.end_line, &args.new_lines)
                    .await?;
                Ok(ToolResult::ok(format!(
                    "Replaced lines {}-{} of {} with {} line(s)",
                    args.start_line,
                    args.end_line,
                    args.path,
                    args.new_lines.len()
                )))
            }

            ToolAction::AppendFunction(args) => {
                files::append_function(&args.path, &args.code).await?;
                Ok(ToolResult::ok(format!("Appended code to {}", args.path)))
            }

            ToolAction::CloneRepo(args) => {
                let message = git::clone_or_pull(&args.repo_url, &args.local_path).await?;
                Ok(ToolResult::ok(message))
            }

            ToolAction::CommitAndPush(args) => {
                let credential = self.push_credential()?;
                let message = git::commit_and_push(
                    &args.local_path,
                    &args.branch_name,
                    &args.commit_message,
                    &self.identity,
                    &credential,
                )
                .await?;
                Ok(ToolResult::ok(message))
            }

            ToolAction::CreatePullRequest(args) => {
                let token = self.secrets.require(&self.github_token_env)?;
                let response = self.github.create_pull_request(&token, &args).await?;
                let output = serde_json::to_string_pretty(&response.body).unwrap_or_default();
                let data = serde_json::json!({
                    "status": response.status,
                    "body": response.body,
                });
                if response.is_success() {
                    info!(url = ?response.html_url(), "Pull request created");
                    Ok(ToolResult::ok(output).with_data(data))
                } else {
                    Ok(ToolResult::failure(format!(
                        "GitHub returned {}: {output}",
                        response.status
                    ))
                    .with_data(data))
                }
            }
        }
    }
}

#[async_trait]
impl Toolset for Toolbox {
    fn definitions(&self) -> Vec<ToolDefinition> {
        ToolAction::definitions()
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let action = ToolAction::parse(call)?;
        self.run(action).await
    }
}

/// The registry used by the agent: every tool, env-backed credentials.
pub fn default_registry(config: &AppConfig) -> Result<ToolRegistry, ToolError> {
    ToolRegistry::new(Toolbox::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments,
        }
    }

    fn registry_with(config: &AppConfig, secrets: StaticSecrets) -> ToolRegistry {
        ToolRegistry::new(Toolbox::from_config(config).with_secrets(Arc::new(secrets))).unwrap()
    }

    #[test]
    fn default_registry_offers_all_tools_in_order() {
        let registry = default_registry(&AppConfig::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "read_file",
                "fetch_work_item",
                "create_branch",
                "replace_lines",
                "append_function",
                "clone_repo",
                "commit_and_push",
                "create_pull_request",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_becomes_observation() {
        let registry = registry_with(&AppConfig::default(), StaticSecrets::new());
        let result = registry.dispatch(&call("format_disk", json!({}))).await;
        assert!(!result.success);
        assert!(result.output.contains("Unknown tool: format_disk"));
        assert_eq!(result.call_id, "call_1");
    }

    #[tokio::test]
    async fn read_then_replace_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "a = 1\nb = 2\n").unwrap();
        let file = file.to_str().unwrap();
        let registry = registry_with(&AppConfig::default(), StaticSecrets::new());

        let result = registry
            .dispatch(&call(
                "replace_lines",
                json!({"path": file, "start_line": 2, "end_line": 2, "new_lines": ["b = 3"]}),
            ))
            .await;
        assert!(result.success, "{}", result.output);

        let result = registry.dispatch(&call("read_file", json!({"path": file}))).await;
        assert_eq!(result.output, "a = 1\nb = 3\n");
    }

    #[tokio::test]
    async fn invalid_range_is_observed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "a = 1\n").unwrap();
        let registry = registry_with(&AppConfig::default(), StaticSecrets::new());

        let result = registry
            .dispatch(&call(
                "replace_lines",
                json!({
                    "path": file.to_str().unwrap(),
                    "start_line": 3,
                    "end_line": 4,
                    "new_lines": []
                }),
            ))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Invalid line range"));
    }

    #[tokio::test]
    async fn missing_tokens_become_observations() {
        let registry = registry_with(&AppConfig::default(), StaticSecrets::new());

        let result = registry
            .dispatch(&call("fetch_work_item", json!({"id": 42})))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("AZ_DEVOPS_PAT"));

        let result = registry
            .dispatch(&call(
                "commit_and_push",
                json!({"local_path": "/tmp/none", "branch_name": "b", "commit_message": "m"}),
            ))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("GITHUB_TOKEN"));

        let result = registry
            .dispatch(&call(
                "create_pull_request",
                json!({"owner": "o", "repo": "r", "head": "h", "base": "main", "title": "t"}),
            ))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn clone_never_sends_the_push_token() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("work");
        let registry = registry_with(
            &AppConfig::default(),
            StaticSecrets::new().with("GITHUB_TOKEN", "ghp_SECRET"),
        );

        let result = registry
            .dispatch(&call(
                "clone_repo",
                json!({
                    "repo_url": format!("{}/someone/repo.git", server.uri()),
                    "local_path": local.to_str().unwrap(),
                }),
            ))
            .await;
        assert!(!result.success);

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(!requests.is_empty());
        assert!(
            requests
                .iter()
                .all(|r| !r.headers.contains_key("authorization"))
        );
    }

    #[tokio::test]
    async fn fetch_work_item_uses_configured_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/skamalj-org/agent-loki/_apis/wit/workitems/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.azure_devops.api_url = server.uri();
        let registry = registry_with(&config, StaticSecrets::new().with("AZ_DEVOPS_PAT", "pat"));

        let result = registry
            .dispatch(&call("fetch_work_item", json!({"id": "7"})))
            .await;
        assert!(result.success, "{}", result.output);
        assert_eq!(result.data, Some(json!({"id": 7})));
    }

    #[tokio::test]
    async fn rejected_pull_request_is_unsuccessful_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/o/r/pulls"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "No commits between main and h"
            })))
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.github.api_url = server.uri();
        let registry = registry_with(&config, StaticSecrets::new().with("GITHUB_TOKEN", "ghp"));

        let result = registry
            .dispatch(&call(
                "create_pull_request",
                json!({"owner": "o", "repo": "r", "head": "h", "base": "main", "title": "t"}),
            ))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("422"));
        assert!(result.output.contains("No commits"));
        assert_eq!(result.data.unwrap()["status"], 422);
    }
}
