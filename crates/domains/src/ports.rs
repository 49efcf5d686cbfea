//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::caller::Caller;
use crate::errors::Result;
use crate::models::{Site, User};

/// Persistence contract for sites and their embedded comments.
///
/// A site document is always written whole. `save` is a compare-and-swap on
/// `Site::revision`: it succeeds only if the stored revision still equals the
/// one carried by the argument, and returns the site with the bumped revision.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// All sites, oldest first.
    async fn list_all(&self) -> Result<Vec<Site>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>>;
    /// Inserts a new site. Fails with `Conflict` on a duplicate name.
    async fn create(&self, site: Site) -> Result<Site>;
    /// Fails with `Conflict` when the stored revision moved since load.
    async fn save(&self, site: &Site) -> Result<Site>;
    /// Returns whether a site was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn delete_all(&self) -> Result<u64>;
}

/// Read-only account lookup used to resolve comment authors.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Unknown ids are skipped; order of the result is unspecified.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;
}

/// Identity contract: turns a bearer credential into a caller.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Fails with `Unauthenticated` when the credential is unusable.
    fn authenticate(&self, bearer_token: &str) -> Result<Caller>;
}
