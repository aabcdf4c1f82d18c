//! Azure DevOps work item lookup.

use devagent_core::error::ToolError;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

pub struct AzureDevOpsClient {
    api_url: String,
    organization: String,
    project: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureDevOpsClient {
    pub fn new(
        api_url: impl Into<String>,
        organization: impl Into<String>,
        project: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            organization: organization.into(),
            project: project.into(),
            api_version: api_version.into(),
            client,
        }
    }

    /// `{api}/{org}/{project}/_apis/wit/workitems/{id}?api-version=...`
    ///
    /// Every part is a single escaped path segment, so an ID cannot move the
    /// request to another endpoint or drop the query.
    pub fn work_item_url(&self, id: &str) -> Result<Url, ToolError> {
        if matches!(id, "" | "." | "..") {
            return Err(ToolError::InvalidArguments {
                tool_name: "fetch_work_item".into(),
                reason: format!("{id:?} is not a work item ID"),
            });
        }

        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ToolError::remote("fetch work item", format!("invalid api_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::remote("fetch work item", "api_url cannot take a path"))?
            .pop_if_empty()
            .extend([
                self.organization.as_str(),
                self.project.as_str(),
                "_apis",
                "wit",
                "workitems",
                id,
            ]);
        url.query_pairs_mut().append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// Fetch a work item's JSON. Anything but 200 is an error carrying the
    /// status and response text.
    pub async fn fetch_work_item(&self, pat: &str, id: &str) -> Result<Value, ToolError> {
        let url = self.work_item_url(id)?;
        debug!(url = %url, "Fetching work item");

        let response = self
            .client
            .get(url)
            .basic_auth("", Some(pat))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ToolError::remote("fetch work item", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::remote("fetch work item", e))?;

        if status != reqwest::StatusCode::OK {
            return Err(ToolError::remote(
                "fetch work item",
                format!("work item {id} returned {}: {text}", status.as_u16()),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| ToolError::remote("fetch work item", format!("invalid JSON: {e}")))
    }
}
