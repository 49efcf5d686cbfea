//! # storage-adapters
//!
//! Implementations of the `SiteRepository` and `UserRepository` ports.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{InMemorySiteRepository, InMemoryUserRepository};
