//! Quote lookup endpoint handler

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use std::sync::Arc;
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    error::ApiResult,
    models::{ApiResponse, QuoteResponse},
    AppState,
};

/// Get a fresh quote for a symbol
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<ApiResponse<QuoteResponse>>> {
    info!(%user, %symbol, "looking up quote");

    let quote = state.engine.quote(&symbol).await?;
    Ok(Json(ApiResponse::success(QuoteResponse::from(quote))))
}
