//! Ledger engine: validate-then-commit buy/sell settlement and derived
//! portfolio views.
//!
//! The engine is responsible for:
//! - Resolving symbols against the quote service
//! - Deriving holdings from the append-only transaction log
//! - Validating affordability (buys) and ownership (sells)
//! - Settling trades atomically through the store
//!
//! Each operation is a single all-or-nothing unit of work with two terminal
//! outcomes: committed, or rejected with a [`LedgerError`] and no state
//! change. Identity is always an explicit [`UserId`] parameter; the engine
//! holds no session state and caches nothing between calls.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::quotes::QuoteService;
use crate::store::LedgerStore;
use crate::types::{ensure_positive_shares, Holding, Portfolio, Quote, Transaction, UserId};

/// Validates and settles trades against a persistent store, pricing them
/// through an external quote service.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    quotes: Arc<dyn QuoteService>,
}

impl LedgerEngine {
    /// Creates an engine over the given store and quote service.
    pub fn new(store: Arc<dyn LedgerStore>, quotes: Arc<dyn QuoteService>) -> Self {
        Self { store, quotes }
    }

    /// Fetches a fresh quote for `symbol`.
    ///
    /// Fails with [`LedgerError::InvalidSymbol`] when the symbol does not
    /// resolve and [`LedgerError::QuoteUnavailable`] when the service itself
    /// failed or returned a non-positive price.
    pub async fn quote(&self, symbol: &str) -> LedgerResult<Quote> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(LedgerError::invalid_symbol(symbol));
        }

        let quote = match self.quotes.lookup(symbol).await {
            Ok(Some(quote)) => quote,
            Ok(None) => return Err(LedgerError::invalid_symbol(symbol)),
            Err(source) => {
                return Err(LedgerError::QuoteUnavailable {
                    symbol: symbol.to_string(),
                    source,
                })
            }
        };

        // A zero or negative price would let settlements slip past the
        // cash compare-and-swap unnoticed.
        if quote.price <= Decimal::ZERO {
            return Err(LedgerError::QuoteUnavailable {
                symbol: symbol.to_string(),
                source: crate::error::QuoteError::Malformed(format!(
                    "non-positive price {}",
                    quote.price
                )),
            });
        }

        Ok(quote)
    }

    /// Computes the user's full portfolio: every owned holding priced at a
    /// fresh quote, plus the current cash balance.
    ///
    /// Symbols whose summed quantity is ≤ 0 are excluded. If any owned
    /// symbol cannot be priced the whole operation fails with
    /// [`LedgerError::QuoteUnavailable`] rather than misstating net worth
    /// by silently omitting the holding.
    pub async fn portfolio(&self, user: UserId) -> LedgerResult<Portfolio> {
        let sums = self.store.sum_quantity_by_symbol(user).await?;

        let mut owned: Vec<_> = sums.into_iter().filter(|&(_, shares)| shares > 0).collect();
        owned.sort();

        let mut holdings = Vec::with_capacity(owned.len());
        for (symbol, shares) in owned {
            let quote = self.quote(&symbol).await.map_err(|err| match err {
                // A symbol we verifiably hold failed to price; whatever the
                // cause, the aggregation is unavailable, not invalid input.
                LedgerError::InvalidSymbol { symbol } => LedgerError::QuoteUnavailable {
                    symbol,
                    source: crate::error::QuoteError::Transport(
                        "held symbol no longer resolves".to_string(),
                    ),
                },
                other => other,
            })?;
            holdings.push(Holding {
                symbol: quote.symbol,
                name: quote.name,
                shares,
                price: quote.price,
            });
        }

        let cash = self.store.get_cash(user).await?;
        debug!(%user, holdings = holdings.len(), "computed portfolio");
        Ok(Portfolio { holdings, cash })
    }

    /// Buys `shares` of `symbol` at the current quoted price.
    ///
    /// Rejects with [`LedgerError::InvalidQuantity`] before any lookup,
    /// [`LedgerError::InvalidSymbol`] when the symbol does not resolve, and
    /// [`LedgerError::InsufficientFunds`] when the cost exceeds cash.
    /// Otherwise the transaction append and cash debit commit atomically.
    pub async fn buy(&self, user: UserId, symbol: &str, shares: i64) -> LedgerResult<Transaction> {
        ensure_positive_shares(shares)?;
        let quote = self.quote(symbol).await?;

        let cash = self.store.get_cash(user).await?;
        let cost = quote.price * Decimal::from(shares);
        if cost > cash {
            return Err(LedgerError::InsufficientFunds { cost, cash });
        }

        let entry = Transaction::buy(user, &quote, shares);
        self.store
            .settle(user, cash, cash - cost, entry.clone())
            .await?;

        info!(%user, symbol = %quote.symbol, shares, price = %quote.price, "buy settled");
        Ok(entry)
    }

    /// Sells `shares` of `symbol` at the current quoted price.
    ///
    /// A symbol the quote service cannot resolve is
    /// [`LedgerError::InvalidSymbol`], never "owns zero". Rejects with
    /// [`LedgerError::InsufficientShares`] when the quantity exceeds the
    /// derived holding; otherwise the transaction append and cash credit
    /// commit atomically.
    pub async fn sell(&self, user: UserId, symbol: &str, shares: i64) -> LedgerResult<Transaction> {
        ensure_positive_shares(shares)?;
        let quote = self.quote(symbol).await?;

        let owned = self.owned_shares(user, &quote.symbol).await?;
        if shares > owned {
            return Err(LedgerError::InsufficientShares {
                symbol: quote.symbol,
                requested: shares,
                owned,
            });
        }

        let cash = self.store.get_cash(user).await?;
        let proceeds = quote.price * Decimal::from(shares);

        let entry = Transaction::sell(user, &quote, shares);
        self.store
            .settle(user, cash, cash + proceeds, entry.clone())
            .await?;

        info!(%user, symbol = %entry.symbol, shares, price = %entry.price, "sell settled");
        Ok(entry)
    }

    /// All transactions for the user, in execution order.
    pub async fn history(&self, user: UserId) -> LedgerResult<Vec<Transaction>> {
        Ok(self.store.list_transactions(user).await?)
    }

    /// The one holdings derivation: signed share sum for a symbol, as used
    /// by both the portfolio view and sell validation.
    async fn owned_shares(&self, user: UserId, symbol: &str) -> LedgerResult<i64> {
        let sums = self.store.sum_quantity_by_symbol(user).await?;
        Ok(sums.get(symbol).copied().unwrap_or(0))
    }
}
