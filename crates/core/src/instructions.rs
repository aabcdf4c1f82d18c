//! System instruction sources.
//!
//! The decision engine asks for the instruction text before every model
//! call, so edits to the prompt file take effect on the next step without a
//! restart.

use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Anything that can produce the current system instruction text.
pub trait InstructionSource: Send + Sync {
    /// Load the instruction text as it is right now.
    fn load(&self) -> Result<String>;

    /// Where the text comes from, for logs and error messages.
    fn describe(&self) -> String;
}

/// Instructions read from a plain-text file on every call.
#[derive(Debug, Clone)]
pub struct FileInstructions {
    path: PathBuf,
}

impl FileInstructions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InstructionSource for FileInstructions {
    fn load(&self) -> Result<String> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| Error::Instructions {
            source_name: self.describe(),
            reason: e.to_string(),
        })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Loaded system instructions");
        Ok(text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed instruction text.
#[derive(Debug, Clone)]
pub struct StaticInstructions(pub String);

impl InstructionSource for StaticInstructions {
    fn load(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "<inline>".into()
    }
}
