//! Authenticated caller identity and the capability checks built on it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Comment;

/// Who is making a request, as established by an `AuthProvider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub admin: bool,
}

/// Which identities may mutate a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Only the author.
    OwnerOnly,
    /// The author, or any elevated caller.
    OwnerOrAdmin,
}

impl Caller {
    pub fn new(user_id: Uuid, admin: bool) -> Self {
        Self { user_id, admin }
    }

    /// Elevated-role check for administrative paths.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn owns(&self, comment: &Comment) -> bool {
        comment.author == self.user_id
    }

    pub fn can_mutate(&self, comment: &Comment, policy: Ownership) -> bool {
        match policy {
            Ownership::OwnerOnly => self.owns(comment),
            Ownership::OwnerOrAdmin => self.owns(comment) || self.is_admin(),
        }
    }
}
