//! # SiteService
//!
//! Request-level orchestration for sites and their comments. Every mutation
//! follows the same shape: load the site, check the caller, apply the change
//! in memory through `comment_manager`, then save the whole document. The
//! save is revision-checked, so two writers racing on one site cannot
//! silently overwrite each other; the loser gets `DomainError::Conflict`.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Caller, CommentDraft, CommentPatch, CommentView, DomainError, NewSite, Result, Site,
    SitePatch, SiteRepository, SiteView, UserRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::author_resolver::AuthorResolver;
use crate::comment_manager;

pub const ADMIN_REQUIRED: &str = "You are not authorized to perform this operation!";

#[derive(Clone)]
pub struct SiteService {
    sites: Arc<dyn SiteRepository>,
    authors: AuthorResolver,
}

impl SiteService {
    pub fn new(sites: Arc<dyn SiteRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            sites,
            authors: AuthorResolver::new(users),
        }
    }

    pub async fn list_sites(&self) -> Result<Vec<SiteView>> {
        let sites = self.sites.list_all().await?;
        self.authors.expand_sites(sites).await
    }

    pub async fn get_site(&self, site_id: Uuid) -> Result<SiteView> {
        let site = self.load(site_id).await?;
        self.authors.expand_site(site).await
    }

    pub async fn create_site(&self, caller: &Caller, new: NewSite) -> Result<SiteView> {
        require_admin(caller, "create site")?;
        new.validate()?;

        let site = self.sites.create(Site::from_new(new, Utc::now())).await?;
        info!(site_id = %site.id, user_id = %caller.user_id, name = %site.name, "site created");
        self.authors.expand_site(site).await
    }

    pub async fn update_site(
        &self,
        caller: &Caller,
        site_id: Uuid,
        patch: SitePatch,
    ) -> Result<SiteView> {
        require_admin(caller, "update site")?;
        patch.validate()?;

        let mut site = self.load(site_id).await?;
        site.apply_patch(patch, Utc::now());
        let site = self.sites.save(&site).await?;
        info!(site_id = %site_id, user_id = %caller.user_id, "site updated");
        self.authors.expand_site(site).await
    }

    pub async fn delete_site(&self, caller: &Caller, site_id: Uuid) -> Result<SiteView> {
        require_admin(caller, "delete site")?;

        let site = self.load(site_id).await?;
        if !self.sites.delete(site_id).await? {
            return Err(DomainError::SiteNotFound(site_id));
        }
        info!(site_id = %site_id, user_id = %caller.user_id, "site deleted");
        self.authors.expand_site(site).await
    }

    pub async fn delete_all_sites(&self, caller: &Caller) -> Result<u64> {
        require_admin(caller, "delete all sites")?;

        let deleted = self.sites.delete_all().await?;
        info!(user_id = %caller.user_id, deleted, "all sites deleted");
        Ok(deleted)
    }

    pub async fn list_comments(&self, site_id: Uuid) -> Result<Vec<CommentView>> {
        let site = self.load(site_id).await?;
        self.authors.expand_comments(site.comments).await
    }

    pub async fn get_comment(&self, site_id: Uuid, comment_id: Uuid) -> Result<CommentView> {
        let site = self.load(site_id).await?;
        let comment = site
            .comment(comment_id)
            .cloned()
            .ok_or(DomainError::CommentNotFound(comment_id))?;
        let mut views = self.authors.expand_comments(vec![comment]).await?;
        views.pop().ok_or(DomainError::CommentNotFound(comment_id))
    }

    /// Any authenticated caller may comment; they become the author.
    pub async fn add_comment(
        &self,
        caller: &Caller,
        site_id: Uuid,
        draft: CommentDraft,
    ) -> Result<SiteView> {
        let mut site = self.load(site_id).await?;
        let comment_id = comment_manager::append(&mut site, caller.user_id, draft, Utc::now())?;
        let site = self.sites.save(&site).await?;
        info!(site_id = %site_id, comment_id = %comment_id, user_id = %caller.user_id, "comment added");
        self.authors.expand_site(site).await
    }

    pub async fn update_comment(
        &self,
        caller: &Caller,
        site_id: Uuid,
        comment_id: Uuid,
        patch: CommentPatch,
    ) -> Result<SiteView> {
        let mut site = self.load(site_id).await?;
        let changed = comment_manager::update(&mut site, comment_id, caller, patch, Utc::now())
            .inspect_err(|e| deny_log(e, site_id, comment_id, caller))?;
        let site = if changed {
            let saved = self.sites.save(&site).await?;
            info!(site_id = %site_id, comment_id = %comment_id, user_id = %caller.user_id, "comment updated");
            saved
        } else {
            site
        };
        self.authors.expand_site(site).await
    }

    pub async fn delete_comment(
        &self,
        caller: &Caller,
        site_id: Uuid,
        comment_id: Uuid,
    ) -> Result<SiteView> {
        let mut site = self.load(site_id).await?;
        comment_manager::remove(&mut site, comment_id, caller)
            .inspect_err(|e| deny_log(e, site_id, comment_id, caller))?;
        let site = self.sites.save(&site).await?;
        info!(site_id = %site_id, comment_id = %comment_id, user_id = %caller.user_id, "comment deleted");
        self.authors.expand_site(site).await
    }

    pub async fn delete_all_comments(&self, caller: &Caller, site_id: Uuid) -> Result<SiteView> {
        require_admin(caller, "delete all comments")?;

        let mut site = self.load(site_id).await?;
        let removed = comment_manager::remove_all(&mut site);
        let site = self.sites.save(&site).await?;
        info!(site_id = %site_id, user_id = %caller.user_id, removed, "all comments deleted");
        self.authors.expand_site(site).await
    }

    async fn load(&self, site_id: Uuid) -> Result<Site> {
        self.sites
            .find_by_id(site_id)
            .await?
            .ok_or(DomainError::SiteNotFound(site_id))
    }
}

fn require_admin(caller: &Caller, action: &str) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        warn!(user_id = %caller.user_id, action, "elevated role required");
        Err(DomainError::Forbidden(ADMIN_REQUIRED.into()))
    }
}

fn deny_log(err: &DomainError, site_id: Uuid, comment_id: Uuid, caller: &Caller) {
    if let DomainError::Forbidden(_) = err {
        warn!(site_id = %site_id, comment_id = %comment_id, user_id = %caller.user_id, "comment mutation denied");
    }
}
