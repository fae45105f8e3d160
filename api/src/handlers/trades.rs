//! Trade endpoint handlers
//!
//! Buy, sell, and transaction history. The share count arrives as the raw
//! form string and is parsed strictly here, before any quote lookup, so a
//! junk quantity never reaches the engine or the vendor.

use axum::{extract::State, response::Json, Extension};
use std::sync::Arc;
use tracing::info;

use folio_core::parse_share_count;

use crate::{
    auth::AuthenticatedUser,
    error::{ApiError, ApiResult},
    models::{ApiResponse, TradeRequest, TradeResponse},
    AppState,
};

/// Buy shares at the current quoted price
pub async fn buy(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(request): Json<TradeRequest>,
) -> ApiResult<Json<ApiResponse<TradeResponse>>> {
    let (symbol, shares) = validate_trade_request(&request)?;
    info!(%user, %symbol, shares, "buy requested");

    let entry = state.engine.buy(user, symbol, shares).await?;
    Ok(Json(ApiResponse::success(TradeResponse::from(entry))))
}

/// Sell shares at the current quoted price
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(request): Json<TradeRequest>,
) -> ApiResult<Json<ApiResponse<TradeResponse>>> {
    let (symbol, shares) = validate_trade_request(&request)?;
    info!(%user, %symbol, shares, "sell requested");

    let entry = state.engine.sell(user, symbol, shares).await?;
    Ok(Json(ApiResponse::success(TradeResponse::from(entry))))
}

/// List the authenticated user's full transaction history
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> ApiResult<Json<ApiResponse<Vec<TradeResponse>>>> {
    info!(%user, "listing transaction history");

    let history = state.engine.history(user).await?;
    let trades: Vec<TradeResponse> = history.into_iter().map(TradeResponse::from).collect();
    Ok(Json(ApiResponse::success(trades)))
}

/// Presence checks plus the strict share-count parse.
fn validate_trade_request(request: &TradeRequest) -> ApiResult<(&str, i64)> {
    let symbol = request.symbol.trim();
    if symbol.is_empty() {
        return Err(ApiError::validation("Missing symbol", Some("symbol")));
    }

    if request.shares.trim().is_empty() {
        return Err(ApiError::validation("Missing shares", Some("shares")));
    }

    let shares = parse_share_count(&request.shares)?;
    Ok((symbol, shares))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(symbol: &str, shares: &str) -> TradeRequest {
        TradeRequest {
            symbol: symbol.to_string(),
            shares: shares.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let req = request(" AAPL ", "10");
        let (symbol, shares) = validate_trade_request(&req).unwrap();
        assert_eq!(symbol, "AAPL");
        assert_eq!(shares, 10);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let err = validate_trade_request(&request("", "10")).unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let err = validate_trade_request(&request("AAPL", "  ")).unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }

    #[test]
    fn test_validate_rejects_junk_share_counts() {
        for shares in ["abc", "0", "-2", "1.5"] {
            let err = validate_trade_request(&request("AAPL", shares)).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidQuantity { .. }),
                "{shares:?} should be InvalidQuantity"
            );
        }
    }
}
