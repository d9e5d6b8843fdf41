//! OS keychain credential provider.
//!
//! Uses the `keyring` crate:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager
//!
//! A missing or locked keychain maps to `CredentialError::ProviderUnavailable`
//! so the chain can fall through to the next provider.

use swingcoach_core::repository::credential::CredentialProvider;
use swingcoach_types::error::CredentialError;

const DEFAULT_SERVICE: &str = "swingcoach";

/// Credentials stored under one keychain service name.
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Custom service name, useful for testing.
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service_name, key).map_err(map_keyring_error)
    }
}

impl Default for KeychainProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn map_keyring_error(e: keyring::Error) -> CredentialError {
    match e {
        keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
            CredentialError::ProviderUnavailable
        }
        other => CredentialError::StorageError(format!("keychain error: {other}")),
    }
}

impl CredentialProvider for KeychainProvider {
    fn name(&self) -> &str {
        "keychain"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entry(key)?
            .set_password(value)
            .map_err(map_keyring_error)
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(map_keyring_error(e)),
        }
    }
}
