//! Environment variable credential provider.
//!
//! Read-only and highest priority: an exported variable overrides anything
//! stored in the keychain. Credential keys map to `SWINGCOACH_{KEY}` in
//! upper case (`relay_token` -> `SWINGCOACH_RELAY_TOKEN`).

use swingcoach_core::repository::credential::CredentialProvider;
use swingcoach_types::error::CredentialError;

const ENV_PREFIX: &str = "SWINGCOACH_";

pub struct EnvCredentialProvider {
    prefix: String,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable name for a credential key.
    pub fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase())
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        match std::env::var(self.var_name(key)) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
            // Unset, blank or non-UTF-8 values all count as absent.
            Ok(_) | Err(_) => Ok(None),
        }
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly)
    }

    async fn delete(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly)
    }
}
