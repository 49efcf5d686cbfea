//! siteboard/crates/domains/src/lib.rs
//!
//! The central domain model and port definitions for SiteBoard.

pub mod caller;
pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use caller::*;
pub use errors::*;
pub use models::*;
pub use ports::*;
