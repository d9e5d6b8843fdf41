//! Credential provider trait and resolution chain.
//!
//! The relay needs a device identifier and, optionally, an access token.
//! Providers (environment, OS keychain) are consulted in priority order;
//! the first one holding a value wins.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use swingcoach_types::error::CredentialError;

/// Storage backend for named credentials.
pub trait CredentialProvider: Send + Sync {
    /// Human-readable provider name (e.g. "env", "keychain").
    fn name(&self) -> &str;

    /// Read a credential. Returns None if this provider does not hold it.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, CredentialError>> + Send;

    /// Store a credential. Read-only providers return `CredentialError::ReadOnly`.
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), CredentialError>> + Send;

    /// Delete a credential. No-op if absent.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CredentialError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`CredentialProvider`].
pub trait CredentialProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(&'a self, key: &'a str)
    -> BoxFuture<'a, Result<Option<String>, CredentialError>>;

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>>;

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), CredentialError>>;
}

impl<T: CredentialProvider> CredentialProviderDyn for T {
    fn name(&self) -> &str {
        CredentialProvider::name(self)
    }

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, CredentialError>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>> {
        Box::pin(self.set(key, value))
    }

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), CredentialError>> {
        Box::pin(self.delete(key))
    }
}

/// Shared, type-erased credential provider.
pub type DynCredentialProvider = Arc<dyn CredentialProviderDyn>;

/// Providers ordered by precedence (first match wins).
#[derive(Clone, Default)]
pub struct CredentialChain {
    providers: Vec<DynCredentialProvider>,
}

impl CredentialChain {
    pub fn new(providers: Vec<DynCredentialProvider>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve a credential through the chain.
    ///
    /// An unavailable provider (e.g. no keychain on a headless box) is
    /// skipped; other errors abort resolution.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        for provider in &self.providers {
            match provider.get_boxed(key).await {
                Ok(Some(value)) => {
                    tracing::debug!(key, provider = provider.name(), "credential resolved");
                    return Ok(Some(value));
                }
                Ok(None) | Err(CredentialError::ProviderUnavailable) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Store a credential in the first writable provider.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        for provider in &self.providers {
            match provider.set_boxed(key, value).await {
                Ok(()) => return Ok(()),
                Err(CredentialError::ReadOnly | CredentialError::ProviderUnavailable) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(CredentialError::ProviderUnavailable)
    }
}

impl std::fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("CredentialChain")
            .field("providers", &names)
            .finish()
    }
}
