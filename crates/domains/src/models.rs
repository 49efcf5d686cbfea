//! # Domain Models
//!
//! These structs represent the core entities of SiteBoard.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

pub const SITE_NAME_MAX_LEN: usize = 100;
pub const COMMENT_TEXT_MAX_LEN: usize = 2000;

/// A star rating on a closed 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::Validation(format!(
                "rating must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let narrowed = u8::try_from(value).map_err(|_| {
            DomainError::Validation(format!("rating must be between 1 and 5, got {value}"))
        })?;
        Self::new(narrowed)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A site is the unit of persistence: its comments live inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    /// Metres above sea level
    pub elevation: Option<i32>,
    /// Whole currency units per night
    pub cost: Option<u32>,
    pub featured: bool,
    /// Insertion-ordered; never reordered by removals.
    pub comments: Vec<Comment>,
    /// Compare-and-swap token checked by every save.
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Site {
    /// Builds a fresh site from a validated creation payload.
    pub fn from_new(new: NewSite, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: new.name.trim().to_string(),
            description: new.description,
            image: new.image,
            elevation: new.elevation,
            cost: new.cost,
            featured: new.featured,
            comments: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn comment_mut(&mut self, comment_id: Uuid) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }

    /// Applies the descriptive fields present in `patch`.
    pub fn apply_patch(&mut self, patch: SitePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(elevation) = patch.elevation {
            self.elevation = Some(elevation);
        }
        if let Some(cost) = patch.cost {
            self.cost = Some(cost);
        }
        if let Some(featured) = patch.featured {
            self.featured = featured;
        }
        self.updated_at = now;
    }
}

/// A comment exists only inside its parent site's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub rating: Rating,
    pub text: String,
    /// The authoring user; fixed at creation.
    pub author: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered account. Owned outside this system; read by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

/// Request payload for creating a site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSite {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub elevation: Option<i32>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub featured: bool,
}

impl NewSite {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_elevation(self.elevation)
    }
}

/// Partial update of a site's descriptive fields. Comments are not reachable from here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub elevation: Option<i32>,
    pub cost: Option<u32>,
    pub featured: Option<bool>,
}

impl SitePatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_elevation(self.elevation)
    }
}

/// Request payload for appending a comment.
///
/// There is no `author` field. Unknown keys in the body are
/// ignored and the author always comes from the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentDraft {
    pub rating: Rating,
    pub text: String,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_text(&self.text)
    }
}

/// Partial update of a comment. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommentPatch {
    pub rating: Option<Rating>,
    pub text: Option<String>,
}

impl CommentPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.text {
            Some(text) => validate_text(text),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.text.is_none()
    }
}

/// Read model of a comment with its author resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub rating: Rating,
    pub text: String,
    /// `None` when the author account no longer exists.
    pub author: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model of a site with every comment's author resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub elevation: Option<i32>,
    pub cost: Option<u32>,
    pub featured: bool,
    pub comments: Vec<CommentView>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("site name must not be empty".into()));
    }
    if trimmed.chars().count() > SITE_NAME_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "site name must be at most {SITE_NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().is_empty() {
        return Err(DomainError::Validation(
            "site description must not be empty".into(),
        ));
    }
    Ok(())
}

fn validate_elevation(elevation: Option<i32>) -> Result<(), DomainError> {
    match elevation {
        Some(e) if e < 0 => Err(DomainError::Validation(
            "elevation must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation("comment text must not be empty".into()));
    }
    if text.chars().count() > COMMENT_TEXT_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "comment text must be at most {COMMENT_TEXT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_out_of_range_values() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert!(Rating::try_from(-1).is_err());
        assert!(Rating::try_from(300).is_err());
    }

    #[test]
    fn rating_deserializes_from_json_number() {
        let rating: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(rating.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::to_string(&rating).unwrap(), "4");
    }

    #[test]
    fn comment_draft_ignores_client_supplied_author() {
        let draft: CommentDraft = serde_json::from_value(serde_json::json!({
            "rating": 5,
            "text": "Great",
            "author": "00000000-0000-0000-0000-000000000001"
        }))
        .unwrap();
        assert_eq!(draft.rating.value(), 5);
        assert_eq!(draft.text, "Great");
    }

    #[test]
    fn new_site_requires_name_and_description() {
        let missing_name = NewSite {
            description: "by the sea".into(),
            ..Default::default()
        };
        assert!(matches!(missing_name.validate(), Err(DomainError::Validation(_))));

        let ok = NewSite {
            name: "Cliffside".into(),
            description: "by the sea".into(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let site = Site::from_new(ok, Utc::now());
        assert!(site.comments.is_empty());
        assert_eq!(site.revision, 0);
    }

    #[test]
    fn comment_patch_validates_only_present_text() {
        assert!(CommentPatch::default().validate().is_ok());
        assert!(CommentPatch::default().is_empty());
        let blank = CommentPatch {
            rating: None,
            text: Some("   ".into()),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn site_patch_leaves_comments_and_absent_fields() {
        let now = Utc::now();
        let mut site = Site::from_new(
            NewSite {
                name: "Cliffside".into(),
                description: "by the sea".into(),
                cost: Some(25),
                ..Default::default()
            },
            now,
        );
        site.apply_patch(
            SitePatch {
                featured: Some(true),
                ..Default::default()
            },
            now,
        );
        assert!(site.featured);
        assert_eq!(site.cost, Some(25));
        assert_eq!(site.name, "Cliffside");
    }
}
