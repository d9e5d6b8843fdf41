//! Credential providers and relay identity resolution.
//!
//! - `env`: environment variable provider (read-only, highest priority)
//! - `chain`: chain builder wiring the providers together

pub mod chain;
pub mod env;

use secrecy::SecretString;
use uuid::Uuid;

use swingcoach_core::repository::credential::CredentialChain;

use crate::relay::RelayCredentials;

/// Credential key of the relay access token.
pub const RELAY_TOKEN_KEY: &str = "relay_token";
/// Credential key of the persistent device identifier.
pub const DEVICE_ID_KEY: &str = "device_id";

/// Resolve the device identifier, creating and storing one on first use.
///
/// When nothing in the chain can store it, the fresh identifier is used for
/// this process only.
pub async fn resolve_device_id(chain: &CredentialChain) -> String {
    match chain.get(DEVICE_ID_KEY).await {
        Ok(Some(id)) => return id,
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "could not read device id"),
    }

    let id = Uuid::new_v4().to_string();
    match chain.set(DEVICE_ID_KEY, &id).await {
        Ok(()) => tracing::info!("created device id"),
        Err(e) => tracing::warn!(error = %e, "device id not persisted, using an ephemeral one"),
    }
    id
}

/// Everything the relay client needs to identify this caller.
pub async fn resolve_relay_credentials(chain: &CredentialChain) -> RelayCredentials {
    let device_id = resolve_device_id(chain).await;
    let token = match chain.get(RELAY_TOKEN_KEY).await {
        Ok(token) => token.map(SecretString::from),
        Err(e) => {
            tracing::warn!(error = %e, "could not read relay token");
            None
        }
    };
    RelayCredentials { device_id, token }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use secrecy::ExposeSecret;
    use swingcoach_core::repository::credential::{CredentialProvider, DynCredentialProvider};
    use swingcoach_types::error::CredentialError;

    #[derive(Default)]
    struct MemoryProvider {
        values: Mutex<HashMap<String, String>>,
        read_only: bool,
    }

    impl CredentialProvider for MemoryProvider {
        fn name(&self) -> &str {
            "memory"
        }

        async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
            if self.read_only {
                return Err(CredentialError::ReadOnly);
            }
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CredentialError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn device_id_is_created_once_and_reused() {
        let chain = CredentialChain::new(vec![Arc::new(MemoryProvider::default()) as DynCredentialProvider]);
        let first = resolve_device_id(&chain).await;
        let second = resolve_device_id(&chain).await;
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn device_id_falls_back_when_nothing_is_writable() {
        let provider: DynCredentialProvider = Arc::new(MemoryProvider {
            read_only: true,
            ..MemoryProvider::default()
        });
        let chain = CredentialChain::new(vec![provider]);
        let first = resolve_device_id(&chain).await;
        let second = resolve_device_id(&chain).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn relay_credentials_include_token() {
        let provider = MemoryProvider::default();
        provider
            .values
            .lock()
            .unwrap()
            .insert(RELAY_TOKEN_KEY.to_string(), "tok".to_string());
        let chain = CredentialChain::new(vec![Arc::new(provider) as DynCredentialProvider]);

        let credentials = resolve_relay_credentials(&chain).await;
        assert_eq!(
            credentials.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("tok".to_string())
        );
        assert!(!credentials.device_id.is_empty());
    }
}
