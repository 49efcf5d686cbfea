//! Read-path expansion of comment author references into user records.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use domains::{Comment, CommentView, Result, Site, SiteView, User, UserRepository};
use tracing::debug;
use uuid::Uuid;

/// Resolves `Comment::author` ids into full `User` records.
///
/// Every call does a single batched lookup over the distinct authors it
/// needs. A reference to a user that no longer exists resolves to `None`
/// instead of failing the read.
#[derive(Clone)]
pub struct AuthorResolver {
    users: Arc<dyn UserRepository>,
}

impl AuthorResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn expand_site(&self, site: Site) -> Result<SiteView> {
        let authors = self.lookup(site.comments.iter()).await?;
        Ok(into_view(site, &authors))
    }

    pub async fn expand_sites(&self, sites: Vec<Site>) -> Result<Vec<SiteView>> {
        let authors = self
            .lookup(sites.iter().flat_map(|s| s.comments.iter()))
            .await?;
        Ok(sites.into_iter().map(|s| into_view(s, &authors)).collect())
    }

    pub async fn expand_comments(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>> {
        let authors = self.lookup(comments.iter()).await?;
        Ok(comments
            .into_iter()
            .map(|c| comment_view(c, &authors))
            .collect())
    }

    async fn lookup<'a>(
        &self,
        comments: impl Iterator<Item = &'a Comment>,
    ) -> Result<HashMap<Uuid, User>> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = comments
            .map(|c| c.author)
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let found: HashMap<Uuid, User> = self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        if found.len() < ids.len() {
            debug!(
                requested = ids.len(),
                found = found.len(),
                "some comment authors no longer exist"
            );
        }
        Ok(found)
    }
}

fn comment_view(comment: Comment, authors: &HashMap<Uuid, User>) -> CommentView {
    CommentView {
        id: comment.id,
        rating: comment.rating,
        text: comment.text,
        author: authors.get(&comment.author).cloned(),
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn into_view(site: Site, authors: &HashMap<Uuid, User>) -> SiteView {
    SiteView {
        id: site.id,
        name: site.name,
        description: site.description,
        image: site.image,
        elevation: site.elevation,
        cost: site.cost,
        featured: site.featured,
        comments: site
            .comments
            .into_iter()
            .map(|c| comment_view(c, authors))
            .collect(),
        revision: site.revision,
        created_at: site.created_at,
        updated_at: site.updated_at,
    }
}
