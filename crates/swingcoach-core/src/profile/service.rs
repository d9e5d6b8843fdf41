//! ProfileService -- single owner of the in-memory swing profile.
//!
//! All mutations go through [`ProfileService::apply`] or
//! [`ProfileService::reset`], which persist first and only then swap the
//! in-memory copy and notify subscribers. A failed write leaves the profile
//! untouched.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use swingcoach_types::error::RepositoryError;
use swingcoach_types::event::CoachEvent;
use swingcoach_types::profile::SwingProfile;

use crate::event::EventBus;
use crate::repository::profile::ProfileStore;

struct Inner<S> {
    store: S,
    profile: RwLock<SwingProfile>,
    events: EventBus,
}

/// Clonable handle; all clones share one profile.
pub struct ProfileService<S: ProfileStore> {
    inner: Arc<Inner<S>>,
}

impl<S: ProfileStore> Clone for ProfileService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ProfileStore> ProfileService<S> {
    /// Load the persisted profile, falling back to an empty one when none
    /// is stored or the stored value can no longer be decoded.
    pub async fn load(store: S, events: EventBus) -> Result<Self, RepositoryError> {
        let profile = match store.load().await {
            Ok(Some(profile)) => profile,
            Ok(None) => SwingProfile::default(),
            Err(RepositoryError::Serialization(e)) => {
                warn!(error = %e, "stored profile is unreadable, starting from an empty profile");
                SwingProfile::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                profile: RwLock::new(profile),
                events,
            }),
        })
    }

    /// Copy of the current profile.
    pub async fn snapshot(&self) -> SwingProfile {
        self.inner.profile.read().await.clone()
    }

    /// Compute and persist a new profile from the current one.
    ///
    /// The write lock is held across `f` and the store write, so concurrent
    /// callers never merge into a stale copy.
    pub async fn apply<F>(&self, f: F) -> Result<SwingProfile, RepositoryError>
    where
        F: FnOnce(&SwingProfile) -> SwingProfile,
    {
        let mut guard = self.inner.profile.write().await;
        let next = f(&guard);
        self.inner.store.save(&next).await?;
        *guard = next.clone();
        drop(guard);

        self.inner.events.publish(CoachEvent::ProfileUpdated {
            profile: Box::new(next.clone()),
        });
        Ok(next)
    }

    /// Clear the profile, both in memory and in storage.
    pub async fn reset(&self) -> Result<(), RepositoryError> {
        let mut guard = self.inner.profile.write().await;
        self.inner.store.clear().await?;
        let mut cleared = SwingProfile::default();
        cleared.updated_at = Some(Utc::now());
        *guard = cleared.clone();
        drop(guard);

        info!("swing profile reset");
        self.inner.events.publish(CoachEvent::ProfileUpdated {
            profile: Box::new(cleared),
        });
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoachEvent> {
        self.inner.events.subscribe()
    }
}
