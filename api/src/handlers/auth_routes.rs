//! Account registration and login handlers
//!
//! Registration creates a user seeded with the standard starting cash;
//! login verifies the stored bcrypt hash and issues a JWT access token.
//! Identity resolution for every other route happens in the auth
//! middleware, not here.

use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::info;

use crate::{
    auth,
    error::{ApiError, ApiResult},
    models::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, UserInfo},
    AppState,
};

/// Register a new user account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<UserInfo>>> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ApiError::validation(
            "Username cannot be empty",
            Some("username"),
        ));
    }

    if request.password.is_empty() || request.confirmation.is_empty() {
        return Err(ApiError::validation(
            "Password and confirmation are required",
            Some("password"),
        ));
    }

    if request.password != request.confirmation {
        return Err(ApiError::validation(
            "Passwords don't match",
            Some("confirmation"),
        ));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let record = state.store.create_user(username, &password_hash).await?;

    info!(user = %record.id, username, "registered new account");
    Ok(Json(ApiResponse::success(UserInfo::from(record))))
}

/// Authenticate and issue an access token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    if request.username.trim().is_empty() {
        return Err(ApiError::validation(
            "Username cannot be empty",
            Some("username"),
        ));
    }

    if request.password.is_empty() {
        return Err(ApiError::validation(
            "Password cannot be empty",
            Some("password"),
        ));
    }

    let record = state
        .store
        .user_by_username(request.username.trim())
        .await?
        .ok_or_else(|| ApiError::auth("Invalid username and/or password"))?;

    if !auth::verify_password(&request.password, &record.password_hash)? {
        return Err(ApiError::auth("Invalid username and/or password"));
    }

    let (access_token, expires_at) = auth::generate_token(record.id, &state.config.jwt_secret)?;

    info!(user = %record.id, "login successful");
    Ok(Json(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_at,
        user: UserInfo::from(record),
    })))
}
