use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{self, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use linkhub_core::errors::{LinkHubError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| LinkHubError::GeneralError(format!("password hashing failed: {err}")))
}

/// Verifies a password against a stored hash. A hash that fails to parse is
/// treated as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    exp: i64,
    iat: i64,
}

/// Signing and verification keys for bearer tokens.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a signed token for the given user.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| LinkHubError::GeneralError(format!("token signing failed: {err}")))
    }

    fn verify(&self, token: &str) -> Option<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).ok()?;
        Some(AuthUser {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

/// Authenticated caller identity resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, ApiError> {
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        state
            .auth
            .verify(&token)
            .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|value| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse").expect("hashing succeeds");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong battery", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn token_roundtrip() {
        let keys = AuthKeys::new("test-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, "ada").expect("token issued");

        let verified = keys.verify(&token).expect("token verifies");
        assert_eq!(verified.user_id, user_id);
        assert_eq!(verified.username, "ada");

        let other = AuthKeys::new("another-secret");
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            "Bearer abc.def.ghi".parse().unwrap(),
        );
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(http::header::AUTHORIZATION, "Basic Zm9v".parse().unwrap());
        assert_eq!(extract_bearer(&headers), None);
    }
}
