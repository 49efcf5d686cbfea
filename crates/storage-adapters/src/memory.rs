//! In-memory adapters backed by `DashMap`.
//!
//! Used by the default build and by every test suite. Each site is a single
//! map entry, so a save is one atomic replace under that entry's shard lock.
//! Lock order is always sites -> names.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{DomainError, Result, Site, SiteRepository, User, UserRepository};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemorySiteRepository {
    sites: DashMap<Uuid, Site>,
    /// Case-folded name -> site id, for the unique-name rule
    names: DashMap<String, Uuid>,
}

impl InMemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the site, then its name entry if that entry still points at it.
    fn remove_site(&self, id: Uuid) -> bool {
        match self.sites.remove(&id) {
            Some((_, site)) => {
                self.names.remove_if(&name_key(&site.name), |_, owner| *owner == id);
                true
            }
            None => false,
        }
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::Conflict(format!("a site named {name:?} already exists"))
}

#[async_trait]
impl SiteRepository for InMemorySiteRepository {
    async fn list_all(&self) -> Result<Vec<Site>> {
        let mut sites: Vec<Site> = self.sites.iter().map(|e| e.value().clone()).collect();
        sites.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(sites)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Site>> {
        Ok(self.sites.get(&id).map(|s| s.value().clone()))
    }

    async fn create(&self, site: Site) -> Result<Site> {
        let slot = match self.sites.entry(site.id) {
            Entry::Vacant(slot) => slot,
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!("Site {} already exists", site.id)))
            }
        };
        match self.names.entry(name_key(&site.name)) {
            Entry::Occupied(_) => return Err(duplicate_name(&site.name)),
            Entry::Vacant(name) => {
                name.insert(site.id);
            }
        }
        slot.insert(site.clone());
        Ok(site)
    }

    async fn save(&self, site: &Site) -> Result<Site> {
        let mut stored = self
            .sites
            .get_mut(&site.id)
            .ok_or(DomainError::SiteNotFound(site.id))?;
        if stored.revision != site.revision {
            return Err(DomainError::stale_site(site.id));
        }

        let old_key = name_key(&stored.name);
        let new_key = name_key(&site.name);
        if old_key != new_key {
            match self.names.entry(new_key) {
                Entry::Occupied(_) => return Err(duplicate_name(&site.name)),
                Entry::Vacant(name) => {
                    name.insert(site.id);
                }
            }
            self.names.remove(&old_key);
        }

        let mut next = site.clone();
        next.revision += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.remove_site(id))
    }

    async fn delete_all(&self) -> Result<u64> {
        // Site by site, so a concurrent create keeps its name entry.
        let ids: Vec<Uuid> = self.sites.iter().map(|e| *e.key()).collect();
        let removed = ids.into_iter().filter(|id| self.remove_site(*id)).count();
        Ok(removed as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Returns the removed account, if it existed.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        self.users.remove(&id).map(|(_, u)| u)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.value().clone()))
            .collect())
    }
}
