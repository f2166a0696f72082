//! Bearer-token verification for owner-scoped operations.
//!
//! Tokens are HS256 JWTs signed with a shared secret; the `sub` claim is the
//! owner identifier and `exp` is validated. Verification only resolves a
//! token to an owner id — ownership checks against a record happen at the
//! handler.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization token required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner identifier.
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a raw token and return the owner id it carries.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims.sub)
    }

    /// Pull the bearer token out of the `Authorization` header and verify it.
    pub fn verify_bearer(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let header = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(AuthError::MissingToken)?;

        self.verify(token.trim())
    }
}
