//! Core ledger types and data structures for the folio trading simulator.
//!
//! This module defines the fundamental types used throughout the ledger
//! engine: quotes, transactions, derived holdings, and portfolio views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

/// Unique identifier for a user account
pub type UserId = Uuid;

/// Ticker symbol (e.g. "AAPL", "NFLX")
pub type Symbol = String;

/// A point-in-time price for a symbol, sourced from the quote service.
///
/// Quotes are never persisted; every operation that needs a price fetches a
/// fresh one, and whatever the service returns at call time is authoritative
/// for that operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Canonical ticker symbol as the quote service knows it
    pub symbol: Symbol,

    /// Company display name
    pub name: String,

    /// Price per share at lookup time
    pub price: Decimal,
}

/// One immutable entry in a user's append-only transaction log.
///
/// `shares` is signed: positive for a buy, negative for a sell, never zero.
/// The company name and execution price are denormalized at trade time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Ticker symbol traded
    pub symbol: Symbol,

    /// Company name at time of trade
    pub name: String,

    /// Signed share quantity (positive = buy, negative = sell)
    pub shares: i64,

    /// Price per share at execution time
    pub price: Decimal,

    /// Timestamp of execution
    pub executed_at: DateTime<Utc>,
}

impl Transaction {
    /// Records a purchase of `shares` at the quoted price.
    pub fn buy(user_id: UserId, quote: &Quote, shares: i64) -> Self {
        Self::record(user_id, quote, shares)
    }

    /// Records a sale of `shares` at the quoted price (stored negated).
    pub fn sell(user_id: UserId, quote: &Quote, shares: i64) -> Self {
        Self::record(user_id, quote, -shares)
    }

    fn record(user_id: UserId, quote: &Quote, signed_shares: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            shares: signed_shares,
            price: quote.price,
            executed_at: Utc::now(),
        }
    }

    /// True when this entry records a purchase
    pub fn is_buy(&self) -> bool {
        self.shares > 0
    }

    /// Cash moved by this entry: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> Decimal {
        -(self.price * Decimal::from(self.shares))
    }
}

/// A derived position: the summed signed share quantity for one symbol,
/// priced at a current quote. Holdings are recomputed from the transaction
/// log on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol
    pub symbol: Symbol,

    /// Company display name (from the current quote)
    pub name: String,

    /// Shares currently owned (always > 0 in a portfolio view)
    pub shares: i64,

    /// Current price per share
    pub price: Decimal,
}

impl Holding {
    /// Current market value of this position
    pub fn market_value(&self) -> Decimal {
        self.price * Decimal::from(self.shares)
    }
}

/// A full portfolio view: every owned holding priced at current quotes,
/// plus the user's cash balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Owned holdings, ordered by symbol
    pub holdings: Vec<Holding>,

    /// Current cash balance
    pub cash: Decimal,
}

impl Portfolio {
    /// Aggregate market value of all holdings
    pub fn holdings_value(&self) -> Decimal {
        self.holdings.iter().map(Holding::market_value).sum()
    }

    /// Net worth: holdings value plus cash
    pub fn total_value(&self) -> Decimal {
        self.holdings_value() + self.cash
    }
}

/// Parses a raw share-count string from a form field into a positive
/// integer, rejecting anything non-numeric, fractional, or not strictly
/// positive. Performed once at the boundary so the engine only ever sees
/// typed quantities.
pub fn parse_share_count(raw: &str) -> LedgerResult<i64> {
    let trimmed = raw.trim();
    let shares: i64 = trimmed
        .parse()
        .map_err(|_| LedgerError::invalid_quantity(format!("not a whole number: {trimmed:?}")))?;
    ensure_positive_shares(shares)?;
    Ok(shares)
}

/// Rejects share counts that are not strictly positive.
pub fn ensure_positive_shares(shares: i64) -> LedgerResult<()> {
    if shares <= 0 {
        return Err(LedgerError::invalid_quantity(format!(
            "share count must be positive, got {shares}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, price: Decimal) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            price,
        }
    }

    #[test]
    fn test_parse_share_count_accepts_positive_integers() {
        assert_eq!(parse_share_count("10").unwrap(), 10);
        assert_eq!(parse_share_count("  3 ").unwrap(), 3);
    }

    #[test]
    fn test_parse_share_count_rejects_junk() {
        for raw in ["abc", "", "1.5", "-4", "0", "ten", "1e3"] {
            let err = parse_share_count(raw).unwrap_err();
            assert!(
                matches!(err, LedgerError::InvalidQuantity { .. }),
                "{raw:?} should be InvalidQuantity, got {err:?}"
            );
        }
    }

    #[test]
    fn test_transaction_cash_delta_signs() {
        let user = Uuid::new_v4();
        let q = quote("AAPL", dec!(150.00));

        let bought = Transaction::buy(user, &q, 10);
        assert!(bought.is_buy());
        assert_eq!(bought.shares, 10);
        assert_eq!(bought.cash_delta(), dec!(-1500.00));

        let sold = Transaction::sell(user, &q, 4);
        assert!(!sold.is_buy());
        assert_eq!(sold.shares, -4);
        assert_eq!(sold.cash_delta(), dec!(600.00));
    }

    #[test]
    fn test_portfolio_valuation() {
        let portfolio = Portfolio {
            holdings: vec![
                Holding {
                    symbol: "AAPL".to_string(),
                    name: "Apple Inc.".to_string(),
                    shares: 10,
                    price: dec!(150.00),
                },
                Holding {
                    symbol: "NFLX".to_string(),
                    name: "Netflix Inc.".to_string(),
                    shares: 2,
                    price: dec!(400.50),
                },
            ],
            cash: dec!(1000.00),
        };

        assert_eq!(portfolio.holdings_value(), dec!(2301.00));
        assert_eq!(portfolio.total_value(), dec!(3301.00));
    }
}
