//! Version control through the `git` binary.
//!
//! Credentials never touch the remote URL or the repository config. The
//! token is passed to `push` only, as an `http.<url>.extraHeader` scoped to
//! the configured host, and the committer identity as per-command `user.*`
//! settings. Clone, pull and fetch run anonymously.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use devagent_core::error::ToolError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Committer name and email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

/// Push token and the URL prefix it may be sent to.
#[derive(Clone)]
pub struct GitCredential {
    token: String,
    url_prefix: String,
}

impl GitCredential {
    pub fn new(token: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url_prefix: url_prefix.into(),
        }
    }

    fn header_key(&self) -> String {
        format!("http.{}.extraHeader", self.url_prefix)
    }

    fn extra_header(&self) -> String {
        let encoded = STANDARD.encode(format!("x-access-token:{}", self.token));
        format!("Authorization: Basic {encoded}")
    }
}

impl std::fmt::Debug for GitCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCredential")
            .field("token", &"[REDACTED]")
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// A single `git` invocation.
#[derive(Debug, Default)]
pub struct GitCommand {
    configs: Vec<String>,
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a `-c key=value` override for this invocation only.
    pub fn config(mut self, key: &str, value: &str) -> Self {
        self.configs.push(format!("{key}={value}"));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn identity(self, identity: &GitIdentity) -> Self {
        self.config("user.name", &identity.name)
            .config("user.email", &identity.email)
    }

    pub fn credential(self, credential: &GitCredential) -> Self {
        self.config(&credential.header_key(), &credential.extra_header())
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new("git");
        for config in &self.configs {
            cmd.arg("-c").arg(config);
        }
        cmd.args(&self.args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run the command, returning stdout. `operation` names the failure.
    pub async fn run(&self, operation: &str) -> Result<String, ToolError> {
        // configs may carry the token, so only the arguments are logged
        debug!(args = ?self.args, dir = ?self.dir, "Running git");

        let output = self
            .build()
            .output()
            .await
            .map_err(|e| ToolError::remote(operation, format!("failed to run git: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(ToolError::remote(
                operation,
                format!("{} ({})", detail, output.status),
            ));
        }

        Ok(stdout.into_owned())
    }

    /// Run the command and report only whether it exited cleanly.
    pub async fn succeeds(&self) -> bool {
        matches!(self.build().status().await, Ok(status) if status.success())
    }
}

/// Clone `repo_url` into `local_path`, or pull if the path already exists.
pub async fn clone_or_pull(repo_url: &str, local_path: &str) -> Result<String, ToolError> {
    if Path::new(local_path).exists() {
        GitCommand::new()
            .arg("pull")
            .current_dir(local_path)
            .run("git pull")
            .await?;
        Ok(format!("Pulled latest changes into {local_path}"))
    } else {
        GitCommand::new()
            .args(["clone", repo_url, local_path])
            .run("git clone")
            .await?;
        Ok(format!("Repository cloned to {local_path}"))
    }
}

/// Fetch, then check out `branch_name`, creating it from HEAD if needed.
pub async fn create_branch(local_path: &str, branch_name: &str) -> Result<String, ToolError> {
    GitCommand::new()
        .arg("fetch")
        .current_dir(local_path)
        .run("git fetch")
        .await?;

    let exists = GitCommand::new()
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("refs/heads/{branch_name}"))
        .current_dir(local_path)
        .succeeds()
        .await;

    if exists {
        GitCommand::new()
            .args(["checkout", branch_name])
            .current_dir(local_path)
            .run("git checkout")
            .await?;
        Ok(format!("Switched to existing branch: {branch_name}"))
    } else {
        GitCommand::new()
            .args(["checkout", "-b", branch_name])
            .current_dir(local_path)
            .run("git checkout -b")
            .await?;
        Ok(format!("Created and switched to new branch: {branch_name}"))
    }
}

/// Check out the branch, stage everything, commit, and push with upstream.
pub async fn commit_and_push(
    local_path: &str,
    branch_name: &str,
    commit_message: &str,
    identity: &GitIdentity,
    credential: &GitCredential,
) -> Result<String, ToolError> {
    GitCommand::new()
        .args(["checkout", branch_name])
        .current_dir(local_path)
        .run("git checkout")
        .await?;

    GitCommand::new()
        .args(["add", "-A"])
        .current_dir(local_path)
        .run("git add")
        .await?;

    GitCommand::new()
        .identity(identity)
        .args(["commit", "-m", commit_message])
        .current_dir(local_path)
        .run("git commit")
        .await?;

    GitCommand::new()
        .credential(credential)
        .args(["push", "--set-upstream", "origin", branch_name])
        .current_dir(local_path)
        .run("git push")
        .await?;

    Ok(format!("Changes committed and pushed to {branch_name}"))
}
