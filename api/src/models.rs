//! API response models and data structures
//!
//! This module defines the request/response structures used by the API
//! endpoints, along with the common response envelope.

use chrono::{DateTime, Utc};
use folio_core::{Holding, Portfolio, Quote, Transaction};
use folio_database::UserRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standardized API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (None if error occurred)
    pub data: Option<T>,

    /// Error message (None if successful)
    pub error: Option<String>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(error_message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error_message),
            timestamp: Utc::now(),
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// Password
    pub password: String,
    /// Password confirmation (must match `password`)
    pub confirmation: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type ("Bearer")
    pub token_type: String,
    /// Token expiration timestamp
    pub expires_at: usize,
    /// User information
    pub user: UserInfo,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID
    pub id: String,
    /// Username
    pub username: String,
    /// Current cash balance
    pub cash: Decimal,
}

impl From<UserRecord> for UserInfo {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.username,
            cash: record.cash,
        }
    }
}

/// Buy/sell request. `shares` arrives as the raw form string and is parsed
/// strictly at this boundary.
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    /// Ticker symbol to trade
    pub symbol: String,
    /// Requested share count, as typed by the user
    pub shares: String,
}

/// A settled trade or one row of transaction history
#[derive(Debug, Serialize)]
pub struct TradeResponse {
    /// Transaction identifier
    pub id: String,
    /// Ticker symbol
    pub symbol: String,
    /// Company name at time of trade
    pub name: String,
    /// Signed share quantity (positive = buy, negative = sell)
    pub shares: i64,
    /// Price per share at execution
    pub price: Decimal,
    /// "buy" or "sell"
    pub side: String,
    /// Timestamp of execution
    pub executed_at: DateTime<Utc>,
}

impl From<Transaction> for TradeResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id.to_string(),
            symbol: t.symbol.clone(),
            name: t.name.clone(),
            shares: t.shares,
            price: t.price,
            side: if t.is_buy() { "buy" } else { "sell" }.to_string(),
            executed_at: t.executed_at,
        }
    }
}

/// A fresh quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Ticker symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Current price per share
    pub price: Decimal,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            symbol: q.symbol,
            name: q.name,
            price: q.price,
        }
    }
}

/// One owned position priced at a current quote
#[derive(Debug, Serialize)]
pub struct HoldingResponse {
    /// Ticker symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Shares owned
    pub shares: i64,
    /// Current price per share
    pub price: Decimal,
    /// shares × price
    pub market_value: Decimal,
}

impl From<Holding> for HoldingResponse {
    fn from(h: Holding) -> Self {
        let market_value = h.market_value();
        Self {
            symbol: h.symbol,
            name: h.name,
            shares: h.shares,
            price: h.price,
            market_value,
        }
    }
}

/// Full portfolio view: holdings, cash, and totals
#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    /// Owned holdings, ordered by symbol
    pub holdings: Vec<HoldingResponse>,
    /// Current cash balance
    pub cash: Decimal,
    /// Aggregate market value of holdings
    pub holdings_value: Decimal,
    /// Net worth (holdings value + cash)
    pub total_value: Decimal,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(p: Portfolio) -> Self {
        let holdings_value = p.holdings_value();
        let total_value = p.total_value();
        Self {
            holdings: p.holdings.into_iter().map(HoldingResponse::from).collect(),
            cash: p.cash,
            holdings_value,
            total_value,
        }
    }
}
