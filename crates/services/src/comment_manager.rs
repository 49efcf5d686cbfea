//! Comment collection rules for a loaded site.
//!
//! Nothing here touches storage: callers load the site, apply one of these
//! operations to it in memory, then hand the whole document to
//! `SiteRepository::save`.

use chrono::{DateTime, Utc};
use domains::{
    Caller, Comment, CommentDraft, CommentPatch, DomainError, Ownership, Result, Site,
};
use uuid::Uuid;

pub const UPDATE_DENIED: &str = "You are not authorized to update this comment!";
pub const DELETE_DENIED: &str = "You are not authorized to delete this comment!";

/// Appends a new comment authored by `author` and returns its id.
pub fn append(
    site: &mut Site,
    author: Uuid,
    draft: CommentDraft,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    draft.validate()?;
    let comment = Comment {
        id: Uuid::now_v7(),
        rating: draft.rating,
        text: draft.text,
        author,
        created_at: now,
        updated_at: now,
    };
    let id = comment.id;
    site.comments.push(comment);
    Ok(id)
}

/// Applies the fields present in `patch` to one of the caller's comments.
///
/// Returns `false` when the patch carried nothing to change.
pub fn update(
    site: &mut Site,
    comment_id: Uuid,
    caller: &Caller,
    patch: CommentPatch,
    now: DateTime<Utc>,
) -> Result<bool> {
    let comment = site
        .comment_mut(comment_id)
        .ok_or(DomainError::CommentNotFound(comment_id))?;
    if !caller.can_mutate(comment, Ownership::OwnerOnly) {
        return Err(DomainError::Forbidden(UPDATE_DENIED.into()));
    }
    patch.validate()?;
    if patch.is_empty() {
        return Ok(false);
    }

    if let Some(rating) = patch.rating {
        comment.rating = rating;
    }
    if let Some(text) = patch.text {
        comment.text = text;
    }
    comment.updated_at = now;
    Ok(true)
}

/// Removes one of the caller's comments, keeping the others in order.
pub fn remove(site: &mut Site, comment_id: Uuid, caller: &Caller) -> Result<Comment> {
    let index = site
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or(DomainError::CommentNotFound(comment_id))?;
    if !caller.can_mutate(&site.comments[index], Ownership::OwnerOnly) {
        return Err(DomainError::Forbidden(DELETE_DENIED.into()));
    }
    Ok(site.comments.remove(index))
}

/// Empties the collection. The caller must already hold the elevated role.
pub fn remove_all(site: &mut Site) -> usize {
    let removed = site.comments.len();
    site.comments.clear();
    removed
}
