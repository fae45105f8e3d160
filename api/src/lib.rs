//! # Folio API
//!
//! REST API server for the folio paper-trading service, built with Axum.
//!
//! ## Features
//! - Account registration and JWT-based login
//! - Portfolio view priced at fresh quotes
//! - Buy/sell settlement against the ledger engine
//! - Transaction history and quote lookup
//! - Structured error responses with retryability signalling
//!
//! ## Architecture
//! The API is organized into several modules:
//! - `handlers`: HTTP request handlers
//! - `auth`: password hashing, tokens, identity middleware
//! - `models`: API request/response models
//! - `config`: server configuration
//! - `error`: error types and HTTP status mapping

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use folio_core::{LedgerEngine, QuoteService};
use folio_database::{DatabaseConfig, PostgresStore};
use quote_client::{FixedQuoteService, HttpQuoteService};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

/// Application state shared across all handlers
pub struct AppState {
    /// Ledger engine (validation + settlement)
    pub engine: LedgerEngine,
    /// Persistent store, also used directly for account management
    pub store: Arc<PostgresStore>,
    /// Server configuration
    pub config: config::ApiConfig,
}

impl AppState {
    /// Connects the store, wires the quote service, and builds the engine.
    pub async fn new(config: config::ApiConfig) -> Result<Self, error::ApiError> {
        let db_config = DatabaseConfig::new(config.database_url.clone());
        let store = Arc::new(
            PostgresStore::connect(&db_config)
                .await
                .map_err(|e| error::ApiError::database(e.to_string()))?,
        );

        let quotes: Arc<dyn QuoteService> = if config.sandbox {
            info!("Sandbox mode: serving fixed quotes");
            Arc::new(FixedQuoteService::sandbox())
        } else {
            Arc::new(HttpQuoteService::new(
                config.quote_base_url.clone(),
                config.quote_api_token.clone(),
            ))
        };

        let engine = LedgerEngine::new(store.clone(), quotes);

        Ok(Self {
            engine,
            store,
            config,
        })
    }
}

/// Main API server structure
pub struct ApiServer {
    /// Axum router with all routes configured
    router: Router,
    /// Application state
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with all routes and middleware configured
    pub async fn new(config: config::ApiConfig) -> Result<Self, error::ApiError> {
        let state = Arc::new(AppState::new(config).await?);
        let router = build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Starts the API server and begins listening for requests
    pub async fn serve(self) -> Result<(), error::ApiError> {
        let addr = self.state.config.bind_address;

        info!("Starting folio API server on {}", addr);
        info!("Health check available at http://{}/health", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| error::ApiError::Internal {
                message: format!("Failed to bind to {}: {}", addr, e),
            })?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| error::ApiError::Internal {
                message: format!("Server error: {}", e),
            })?;

        Ok(())
    }

    /// Returns application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builds the full route tree. Ledger routes sit behind the identity
/// middleware; registration, login, and the health probe do not.
fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/portfolio", get(handlers::portfolio::get_portfolio))
        .route("/api/v1/quotes/:symbol", get(handlers::quotes::get_quote))
        .route("/api/v1/trades", get(handlers::trades::list_transactions))
        .route("/api/v1/trades/buy", post(handlers::trades::buy))
        .route("/api/v1/trades/sell", post(handlers::trades::sell))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/auth/register", post(handlers::auth_routes::register))
        .route("/api/v1/auth/login", post(handlers::auth_routes::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_api_server_creation() {
        // Requires a running PostgreSQL; sandbox mode avoids the quote vendor.
        let mut config = config::ApiConfig::default();
        config.sandbox = true;
        let server = ApiServer::new(config).await;
        assert!(server.is_ok());
    }
}
