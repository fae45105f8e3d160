//! Ledger error types
//!
//! This module defines the error taxonomy for ledger operations along with
//! the failure types surfaced by the engine's two collaborators (the
//! persistent store and the quote service).

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures surfaced by a [`crate::store::LedgerStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A settlement lost the compare-and-swap against a concurrent writer.
    #[error("concurrent modification of account state")]
    Conflict,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failures surfaced by a [`crate::quotes::QuoteService`] implementation.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The service could not be reached or returned a server-side failure.
    #[error("quote request failed: {0}")]
    Transport(String),

    /// The service answered with a payload the client could not interpret.
    #[error("malformed quote payload: {0}")]
    Malformed(String),
}

/// Everything a ledger operation can be rejected or aborted with.
///
/// Every error leaves persisted state unchanged; [`LedgerError::StoreConflict`]
/// is the only kind a caller should retry without new user input.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The quote service does not resolve the given ticker.
    #[error("unknown symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    /// Share count was non-numeric, non-integer, or not strictly positive.
    #[error("invalid share quantity: {message}")]
    InvalidQuantity { message: String },

    /// Purchase cost exceeds the user's current cash.
    #[error("cannot afford trade: cost {cost} exceeds cash {cash}")]
    InsufficientFunds { cost: Decimal, cash: Decimal },

    /// Sell quantity exceeds the user's current derived holding.
    #[error("too many shares: requested {requested} of {symbol}, owns {owned}")]
    InsufficientShares {
        symbol: String,
        requested: i64,
        owned: i64,
    },

    /// The quote service itself failed while a price was required.
    #[error("quote unavailable for {symbol}: {source}")]
    QuoteUnavailable {
        symbol: String,
        #[source]
        source: QuoteError,
    },

    /// A concurrent settlement won the race; retry the whole operation.
    #[error("account was modified concurrently, retry the operation")]
    StoreConflict,

    /// The persistent store failed for a reason other than a write conflict.
    #[error("store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Create an invalid-symbol error
    pub fn invalid_symbol<S: Into<String>>(symbol: S) -> Self {
        Self::InvalidSymbol {
            symbol: symbol.into(),
        }
    }

    /// Create an invalid-quantity error
    pub fn invalid_quantity<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuantity {
            message: message.into(),
        }
    }

    /// True when retrying the identical operation could succeed without
    /// new user input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreConflict)
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::StoreConflict,
            other => Self::Store(other.to_string()),
        }
    }
}

/// Type alias for ledger results
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;
