//! Error handling and custom error types for the API
//!
//! This module provides the API error taxonomy, the mapping from ledger
//! engine error kinds to user-facing HTTP status codes, and structured
//! error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::LedgerError;
use folio_database::DatabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Main API error type that encompasses all possible errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Database-related errors
    #[error("Database error: {message}")]
    Database { message: String },

    /// Authentication errors
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Request validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The ticker symbol does not resolve
    #[error("Invalid symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    /// The share quantity is not a positive integer
    #[error("Invalid shares: {message}")]
    InvalidQuantity { message: String },

    /// The buy costs more than the user's cash
    #[error("Can't afford: {message}")]
    InsufficientFunds { message: String },

    /// The sell exceeds the user's holding
    #[error("Too many shares: {message}")]
    InsufficientShares { message: String },

    /// The external quote service failed
    #[error("Quote service unavailable: {message}")]
    QuoteUnavailable { message: String },

    /// A concurrent settlement won; the request may be retried as-is
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Registration username collision
    #[error("Username already exists: {username}")]
    UsernameTaken { username: String },

    /// Not found errors
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S, field: Option<S>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.map(|f| f.into()),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidSymbol { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
            ApiError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            ApiError::InsufficientShares { .. } => StatusCode::BAD_REQUEST,
            ApiError::UsernameTaken { .. } => StatusCode::BAD_REQUEST,
            ApiError::QuoteUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Config { .. } => "CONFIG_ERROR",
            ApiError::Database { .. } => "DATABASE_ERROR",
            ApiError::Auth { .. } => "AUTH_ERROR",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidSymbol { .. } => "INVALID_SYMBOL",
            ApiError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            ApiError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            ApiError::InsufficientShares { .. } => "INSUFFICIENT_SHARES",
            ApiError::QuoteUnavailable { .. } => "QUOTE_UNAVAILABLE",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::UsernameTaken { .. } => "USERNAME_TAKEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the identical request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Conflict { .. })
    }

    /// Log the error appropriately based on type
    pub fn log_error(&self) {
        match self {
            ApiError::Config { message } => {
                error!("Configuration error: {}", message);
            }
            ApiError::Database { message } => {
                error!("Database error: {}", message);
            }
            ApiError::Internal { message } => {
                error!("Internal server error: {}", message);
            }
            ApiError::QuoteUnavailable { message } => {
                warn!("Quote service unavailable: {}", message);
            }
            ApiError::Conflict { message } => {
                warn!("Settlement conflict: {}", message);
            }
            _ => {
                // Client errors are logged at debug level
                tracing::debug!("Client error: {}", self);
            }
        }
    }

    /// Convert to a structured error response
    pub fn to_error_response(&self) -> ErrorResponse {
        self.log_error();

        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                retryable: self.is_retryable(),
            },
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Structured error response for API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,

    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Whether the identical request may be retried
    pub retryable: bool,
}

/// Custom result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Axum response implementation for API errors
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = self.to_error_response();

        tracing::debug!(
            "API error response: status={}, code={}, message={}",
            status_code,
            error_response.error.code,
            error_response.error.message
        );

        (status_code, Json(error_response)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidSymbol { symbol } => Self::InvalidSymbol { symbol },
            LedgerError::InvalidQuantity { message } => Self::InvalidQuantity { message },
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds {
                message: err.to_string(),
            },
            LedgerError::InsufficientShares { .. } => Self::InsufficientShares {
                message: err.to_string(),
            },
            LedgerError::QuoteUnavailable { .. } => Self::QuoteUnavailable {
                message: err.to_string(),
            },
            LedgerError::StoreConflict => Self::Conflict {
                message: err.to_string(),
            },
            LedgerError::Store(message) => Self::Database { message },
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UsernameTaken(username) => Self::UsernameTaken { username },
            DatabaseError::NotFound(resource) => Self::NotFound { resource },
            DatabaseError::Conflict(message) => Self::Conflict { message },
            other => Self::Database {
                message: other.to_string(),
            },
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Auth {
            message: format!("Token error: {}", err),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal {
            message: format!("Password hashing error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_error_kinds_map_to_status_codes() {
        let cases: Vec<(LedgerError, StatusCode)> = vec![
            (
                LedgerError::invalid_symbol("ZZZZ"),
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::invalid_quantity("not a whole number"),
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::InsufficientFunds {
                    cost: dec!(100.00),
                    cash: dec!(50.00),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::InsufficientShares {
                    symbol: "AAPL".to_string(),
                    requested: 15,
                    owned: 10,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::QuoteUnavailable {
                    symbol: "AAPL".to_string(),
                    source: folio_core::QuoteError::Transport("down".to_string()),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (LedgerError::StoreConflict, StatusCode::CONFLICT),
            (
                LedgerError::Store("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (ledger_err, expected) in cases {
            let api_err = ApiError::from(ledger_err);
            assert_eq!(api_err.status_code(), expected, "{api_err:?}");
        }
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(ApiError::from(LedgerError::StoreConflict).is_retryable());
        assert!(!ApiError::from(LedgerError::invalid_symbol("X")).is_retryable());
    }

    #[test]
    fn test_username_taken_maps_to_bad_request() {
        let err = ApiError::from(DatabaseError::UsernameTaken("alice".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "USERNAME_TAKEN");
    }
}
