//! # auth-adapters
//!
//! Implementations of the `AuthProvider` port. Credential issuance (login,
//! passwords) lives elsewhere; these adapters only turn an already-issued
//! bearer token into a `Caller`.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::{Claims, JwtAuthProvider};
