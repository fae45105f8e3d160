//! JWT authentication and password hashing
//!
//! This module provides password hashing with bcrypt, stateless JWT access
//! tokens, and the axum middleware that resolves the authenticated user for
//! every ledger route. The ledger engine itself never sees tokens; it only
//! ever receives the resolved user id.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use folio_core::UserId;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Access tokens are valid for one day, matching the original session
/// lifetime users expect from the web app.
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp
    pub iat: usize,
    /// Expiration timestamp
    pub exp: usize,
    /// Issuer
    pub iss: String,
}

/// The authenticated identity middleware inserts into request extensions
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> ApiResult<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> ApiResult<bool> {
    Ok(bcrypt::verify(password, password_hash)?)
}

/// Generates a signed access token for the user.
pub fn generate_token(user: UserId, secret: &str) -> ApiResult<(String, usize)> {
    let expires_at = (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user.to_string(),
        iat: Utc::now().timestamp() as usize,
        exp: expires_at,
        iss: "folio-api".to_string(),
    };

    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    let token = encode(&Header::default(), &claims, &encoding_key)?;
    Ok((token, expires_at))
}

/// Validates a token and returns the user id it asserts.
pub fn validate_token(token: &str, secret: &str) -> ApiResult<UserId> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        ApiError::Auth {
            message: format!("Token validation failed: {}", e),
        }
    })?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| ApiError::Auth {
        message: "Token subject is not a valid user id".to_string(),
    })
}

/// Axum middleware requiring a valid Bearer token.
///
/// On success the resolved [`AuthenticatedUser`] is inserted into request
/// extensions for handlers to extract.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request).ok_or_else(|| {
        warn!("request to protected route without a token");
        ApiError::Auth {
            message: "Authentication required".to_string(),
        }
    })?;

    let user = validate_token(&token, &state.config.jwt_secret)?;
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Extract JWT token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters-long";

    #[test]
    fn test_token_roundtrip() {
        let user = Uuid::new_v4();
        let (token, expires_at) = generate_token(user, SECRET).unwrap();
        assert!(expires_at > Utc::now().timestamp() as usize);

        let resolved = validate_token(&token, SECRET).unwrap();
        assert_eq!(resolved, user);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let user = Uuid::new_v4();
        let (token, _) = generate_token(user, SECRET).unwrap();

        let err = validate_token(&token, "a-completely-different-secret-value").unwrap_err();
        assert!(matches!(err, ApiError::Auth { .. }));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let err = validate_token("not.a.token", SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Auth { .. }));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
