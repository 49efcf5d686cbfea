//! HS256 JSON Web Token implementation of `AuthProvider`.

use chrono::{Duration, Utc};
use domains::{AuthProvider, Caller, DomainError, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    /// Accepts the shared signing secret (e.g., from configuration).
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a token for `caller`. Only the seed tool and tests mint tokens.
    pub fn issue_token(
        &self,
        caller: &Caller,
        ttl: Duration,
    ) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: caller.user_id.to_string(),
            admin: caller.admin,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }
}

impl AuthProvider for JwtAuthProvider {
    fn authenticate(&self, bearer_token: &str) -> Result<Caller> {
        let data = decode::<Claims>(bearer_token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            DomainError::Unauthenticated("invalid or expired token".into())
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| DomainError::Unauthenticated("token subject is not a user id".into()))?;
        Ok(Caller::new(user_id, data.claims.admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret";

    #[test]
    fn issued_token_round_trips_identity_and_role() {
        let auth = JwtAuthProvider::new(SECRET);
        let caller = Caller::new(Uuid::now_v7(), true);
        let token = auth.issue_token(&caller, Duration::hours(1)).unwrap();
        assert_eq!(auth.authenticate(&token).unwrap(), caller);
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let auth = JwtAuthProvider::new(SECRET);
        let now = Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: Uuid::now_v7().to_string(),
                admin: false,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(
            auth.authenticate(&token),
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = JwtAuthProvider::new(b"another-secret-another-secret-xx");
        let token = other
            .issue_token(&Caller::new(Uuid::now_v7(), true), Duration::hours(1))
            .unwrap();
        assert!(JwtAuthProvider::new(SECRET).authenticate(&token).is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let auth = JwtAuthProvider::new(SECRET);
        let now = Utc::now().timestamp();
        let token = auth
            .sign(&Claims {
                sub: "admin".into(),
                admin: true,
                iat: now,
                exp: now + 600,
            })
            .unwrap();
        assert!(auth.authenticate(&token).is_err());
    }
}
