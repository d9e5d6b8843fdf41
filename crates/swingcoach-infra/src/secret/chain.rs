//! Credential chain builder -- wires concrete providers in priority order.
//!
//! Lives in infra because it assembles concrete providers; the resulting
//! [`CredentialChain`] only sees the `DynCredentialProvider` abstraction.
//!
//! Default order: `[EnvCredentialProvider, KeychainProvider]`.

use std::sync::Arc;

use swingcoach_core::repository::credential::{CredentialChain, DynCredentialProvider};

use crate::keychain::KeychainProvider;
use crate::secret::env::EnvCredentialProvider;

/// Build the credential resolution chain.
///
/// The keychain is optional because headless machines may not have one.
pub fn build_credential_chain(
    keychain: Option<KeychainProvider>,
    include_env: bool,
) -> CredentialChain {
    let mut providers: Vec<DynCredentialProvider> = Vec::new();

    if include_env {
        providers.push(Arc::new(EnvCredentialProvider::new()));
    }

    if let Some(keychain) = keychain {
        providers.push(Arc::new(keychain));
    }

    CredentialChain::new(providers)
}
