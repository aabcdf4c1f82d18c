//! Credential lookup.
//!
//! Tools ask for a credential at the moment they need it; nothing is cached.

use devagent_core::error::ToolError;
use std::collections::HashMap;

/// Where tool credentials come from.
pub trait SecretSource: Send + Sync {
    /// The value stored under `name`, if any.
    fn get(&self, name: &str) -> Option<String>;

    /// Like [`get`](Self::get), but a missing value is a tool error.
    fn require(&self, name: &str) -> Result<String, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::MissingCredential(name.to_string()))
    }
}

/// Reads the process environment. Empty values count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// A fixed set of secrets.
#[derive(Debug, Default, Clone)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretSource for StaticSecrets {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_secrets_lookup() {
        let secrets = StaticSecrets::new().with("GITHUB_TOKEN", "ghp_test");
        assert_eq!(secrets.get("GITHUB_TOKEN").as_deref(), Some("ghp_test"));
        assert!(secrets.get("AZ_DEVOPS_PAT").is_none());
    }

    #[test]
    fn require_missing_is_credential_error() {
        let err = StaticSecrets::new().require("AZ_DEVOPS_PAT").unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential(ref name) if name == "AZ_DEVOPS_PAT"));
        assert!(err.to_string().contains("AZ_DEVOPS_PAT"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let secrets = StaticSecrets::new().with("GITHUB_TOKEN", "");
        assert!(secrets.require("GITHUB_TOKEN").is_err());
    }

    #[test]
    fn env_secrets_unset_variable() {
        assert!(EnvSecrets.get("DEVAGENT_TEST_SURELY_UNSET_VARIABLE").is_none());
    }
}
