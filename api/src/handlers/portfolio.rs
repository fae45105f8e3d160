//! Portfolio endpoint handler
//!
//! Serves the full portfolio view: every owned holding priced at a fresh
//! quote, cash, and the aggregate totals.

use axum::{extract::State, response::Json, Extension};
use std::sync::Arc;
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::ApiResult,
    models::{ApiResponse, PortfolioResponse},
    AppState,
};

/// Get the authenticated user's portfolio
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<ApiResponse<PortfolioResponse>>> {
    info!(%user, "retrieving portfolio");

    let portfolio = state.engine.portfolio(user).await?;
    Ok(Json(ApiResponse::success(PortfolioResponse::from(
        portfolio,
    ))))
}
