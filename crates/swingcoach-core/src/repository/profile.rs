//! Profile store trait definition.

use swingcoach_types::error::RepositoryError;
use swingcoach_types::profile::SwingProfile;

/// Durable storage for the single swing profile.
///
/// Uses RPITIT (native async fn in traits). Implementations live in
/// swingcoach-infra.
pub trait ProfileStore: Send + Sync + 'static {
    /// Load the persisted profile. Returns None if none was ever stored.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<SwingProfile>, RepositoryError>> + Send;

    /// Persist the profile, replacing any previous value.
    fn save(
        &self,
        profile: &SwingProfile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove the persisted profile. No-op if absent.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
