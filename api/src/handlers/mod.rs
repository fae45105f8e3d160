//! HTTP request handlers for the folio API
//!
//! This module contains all the HTTP endpoint handlers organized by
//! functionality:
//! - Account routes (register, login)
//! - Portfolio view (holdings priced at current quotes)
//! - Quote lookup
//! - Trades (buy, sell, transaction history)
//! - Utility endpoints (health check)

use axum::response::Json;
use serde_json::json;

pub mod auth_routes;
pub mod portfolio;
pub mod quotes;
pub mod trades;

// Re-export all handler functions
pub use auth_routes::{login, register};
pub use portfolio::get_portfolio;
pub use quotes::get_quote;
pub use trades::{buy, list_transactions, sell};

/// Health check endpoint
///
/// Returns the current health status of the API server. Used for
/// monitoring and load balancer health checks.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-api"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.0.get("status").unwrap(), "healthy");
    }
}
