//! Request extractors that establish who the caller is.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domains::{Caller, DomainError};
use services::ADMIN_REQUIRED;

use crate::error::ApiError;
use crate::AppState;

/// Any authenticated caller, taken from an `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthCaller(pub Caller);

/// An authenticated caller holding the elevated role.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Caller);

fn bearer_token(parts: &Parts) -> Result<&str, DomainError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| DomainError::Unauthenticated("You are not authenticated!".into()))?;
    let value = header
        .to_str()
        .map_err(|_| DomainError::Unauthenticated("malformed Authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DomainError::Unauthenticated("expected a Bearer token".into()))
}

impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(Self(state.auth.authenticate(token)?))
    }
}

impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthCaller(caller) = AuthCaller::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(ADMIN_REQUIRED.into()).into());
        }
        Ok(Self(caller))
    }
}
