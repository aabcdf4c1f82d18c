//! Error types for the DevAgent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them.

use thiserror::Error;

/// The top-level error type for all DevAgent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors (model invocation failures) ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- System instruction loading ---
    #[error("Failed to load instructions from {source_name}: {reason}")]
    Instructions { source_name: String, reason: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },

    #[error("Invalid line range {start_line}..={end_line} for a file with {line_count} lines")]
    InvalidRange {
        start_line: i64,
        end_line: i64,
        line_count: usize,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("{operation} failed: {reason}")]
    RemoteOperation { operation: String, reason: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),
}

impl ToolError {
    /// Shorthand for a failed git/HTTP operation.
    pub fn remote(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::RemoteOperation {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a filesystem failure on `path`.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Invalid queue event: {0}")]
    InvalidEvent(String),

    #[error("Invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
