//! # services
//!
//! Application logic sitting between the API adapters and the storage ports.

pub mod author_resolver;
pub mod comment_manager;
pub mod site_service;

pub use author_resolver::AuthorResolver;
pub use site_service::{SiteService, ADMIN_REQUIRED};
