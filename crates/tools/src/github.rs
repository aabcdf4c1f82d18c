//! GitHub REST client for pull requests.

use crate::action::CreatePullRequestArgs;
use devagent_core::error::ToolError;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Status and parsed body of a pull request API call.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestResponse {
    pub status: u16,
    pub body: Value,
}

impl PullRequestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The web URL of the created pull request, when GitHub returned one.
    pub fn html_url(&self) -> Option<&str> {
        self.body.get("html_url").and_then(Value::as_str)
    }
}

pub struct GitHubClient {
    api_url: String,
    client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .user_agent("devagent")
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn pulls_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}/pulls", self.api_url)
    }

    /// Open a pull request. Non-2xx responses are returned, not raised,
    /// so the caller can show GitHub's explanation to the model.
    pub async fn create_pull_request(
        &self,
        token: &str,
        args: &CreatePullRequestArgs,
    ) -> Result<PullRequestResponse, ToolError> {
        let url = self.pulls_url(&args.owner, &args.repo);
        debug!(url = %url, head = %args.head, base = %args.base, "Creating pull request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .json(&json!({
                "title": args.title,
                "body": args.body,
                "head": args.head,
                "base": args.base,
            }))
            .send()
            .await
            .map_err(|e| ToolError::remote("create pull request", e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::remote("create pull request", e))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !(200..300).contains(&status) {
            warn!(status, "Pull request creation rejected");
        }
        Ok(PullRequestResponse { status, body })
    }
}
