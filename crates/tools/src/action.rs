//! The closed set of actions the model may request.
//!
//! Every tool has a typed argument struct. A model-issued [`ToolCall`] is
//! parsed into exactly one [`ToolAction`] variant before anything runs, so
//! handlers never see free-form JSON.

use devagent_core::error::ToolError;
use devagent_core::provider::ToolDefinition;
use devagent_core::tool::ToolCall;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadFileArgs {
    pub path: String,
}

/// Work item IDs arrive as numbers or strings depending on the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WorkItemId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchWorkItemArgs {
    pub id: WorkItemId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBranchArgs {
    pub local_path: String,
    pub branch_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceLinesArgs {
    pub path: String,
    /// 1-based, inclusive
    pub start_line: i64,
    /// 1-based, inclusive
    pub end_line: i64,
    #[serde(deserialize_with = "lines_or_text")]
    pub new_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendFunctionArgs {
    pub path: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloneRepoArgs {
    pub repo_url: String,
    pub local_path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitAndPushArgs {
    pub local_path: String,
    pub branch_name: String,
    pub commit_message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePullRequestArgs {
    pub owner: String,
    pub repo: String,
    pub head: String,
    pub base: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Accept either a list of lines or one block of text for replacements.
fn lines_or_text<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lines {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Lines::deserialize(deserializer)? {
        Lines::List(lines) => lines,
        Lines::Text(text) if text.is_empty() => Vec::new(),
        Lines::Text(text) => text.lines().map(str::to_string).collect(),
    })
}

/// One parsed tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    ReadFile(ReadFileArgs),
    FetchWorkItem(FetchWorkItemArgs),
    CreateBranch(CreateBranchArgs),
    ReplaceLines(ReplaceLinesArgs),
    AppendFunction(AppendFunctionArgs),
    CloneRepo(CloneRepoArgs),
    CommitAndPush(CommitAndPushArgs),
    CreatePullRequest(CreatePullRequestArgs),
}

impl ToolAction {
    /// Parse a model-issued call, rejecting unknown tools and bad arguments.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        Ok(match call.name.as_str() {
            "read_file" => Self::ReadFile(arguments(call)?),
            "fetch_work_item" => Self::FetchWorkItem(arguments(call)?),
            "create_branch" => Self::CreateBranch(arguments(call)?),
            "replace_lines" => Self::ReplaceLines(arguments(call)?),
            "append_function" => Self::AppendFunction(arguments(call)?),
            "clone_repo" => Self::CloneRepo(arguments(call)?),
            "commit_and_push" => Self::CommitAndPush(arguments(call)?),
            "create_pull_request" => Self::CreatePullRequest(arguments(call)?),
            other => return Err(ToolError::NotFound(other.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadFile(_) => "read_file",
            Self::FetchWorkItem(_) => "fetch_work_item",
            Self::CreateBranch(_) => "create_branch",
            Self::ReplaceLines(_) => "replace_lines",
            Self::AppendFunction(_) => "append_function",
            Self::CloneRepo(_) => "clone_repo",
            Self::CommitAndPush(_) => "commit_and_push",
            Self::CreatePullRequest(_) => "create_pull_request",
        }
    }

    /// Descriptors for every action, in the order offered to the model.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            definition(
                "read_file",
                "Read and return the full text content of a file.",
                json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Path to the file" }
                    },
                    "required": ["path"]
                }),
            ),
            definition(
                "fetch_work_item",
                "Retrieve an Azure DevOps work item (user story) by its ID and return its JSON details.",
                json!({
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": ["integer", "string"],
                            "description": "The work item ID"
                        }
                    },
                    "required": ["id"]
                }),
            ),
            definition(
                "create_branch",
                "Fetch remote refs, then check out the branch if it exists locally or create it from the current HEAD.",
                json!({
                    "type": "object",
                    "properties": {
                        "local_path": { "type": "string", "description": "Local repository path" },
                        "branch_name": { "type": "string", "description": "Name of the branch" }
                    },
                    "required": ["local_path", "branch_name"]
                }),
            ),
            definition(
                "replace_lines",
                "Replace lines start_line through end_line (1-based, inclusive) of a file with new lines and rewrite the file.",
                json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Path to the file" },
                        "start_line": { "type": "integer", "description": "First line to replace (1-based, inclusive)" },
                        "end_line": { "type": "integer", "description": "Last line to replace (1-based, inclusive)" },
                        "new_lines": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Replacement lines, in order, one line per element"
                        }
                    },
                    "required": ["path", "start_line", "end_line", "new_lines"]
                }),
            ),
            definition(
                "append_function",
                "Append a block of code (for example a new function) to the end of a file, surrounded by newlines.",
                json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Path to the file" },
                        "code": { "type": "string", "description": "Code to append" }
                    },
                    "required": ["path", "code"]
                }),
            ),
            definition(
                "clone_repo",
                "Clone a Git repository to a local path, or pull the latest changes if the path already exists.",
                json!({
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "Remote repository URL" },
                        "local_path": { "type": "string", "description": "Local path for the working copy" }
                    },
                    "required": ["repo_url", "local_path"]
                }),
            ),
            definition(
                "commit_and_push",
                "Check out the branch, stage all changes, commit them, and push the branch with upstream tracking.",
                json!({
                    "type": "object",
                    "properties": {
                        "local_path": { "type": "string", "description": "Local repository path" },
                        "branch_name": { "type": "string", "description": "Working branch" },
                        "commit_message": { "type": "string", "description": "Commit message" }
                    },
                    "required": ["local_path", "branch_name", "commit_message"]
                }),
            ),
            definition(
                "create_pull_request",
                "Open a GitHub pull request from head into base and return the API response.",
                json!({
                    "type": "object",
                    "properties": {
                        "owner": { "type": "string", "description": "Repository owner" },
                        "repo": { "type": "string", "description": "Repository name" },
                        "head": { "type": "string", "description": "Branch with the changes" },
                        "base": { "type": "string", "description": "Branch to merge into" },
                        "title": { "type": "string", "description": "Pull request title" },
                        "body": { "type": "string", "description": "Pull request description" }
                    },
                    "required": ["owner", "repo", "head", "base", "title"]
                }),
            ),
        ]
    }
}

fn arguments<T: DeserializeOwned>(call: &ToolCall) -> Result<T, ToolError> {
    serde_json::from_value(call.arguments.clone()).map_err(|e| ToolError::InvalidArguments {
        tool_name: call.name.clone(),
        reason: e.to_string(),
    })
}

fn definition(name: &str, description: &str, parameters: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.into(),
        description: description.into(),
        parameters,
    }
}
