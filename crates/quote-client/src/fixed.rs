//! Fixed quote table
//!
//! Deterministic in-memory quotes for sandbox runs and tests. No network,
//! no staleness: the table is the market.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use folio_core::{Quote, QuoteError, QuoteService};

/// A quote service backed by a fixed symbol table
#[derive(Debug, Clone, Default)]
pub struct FixedQuoteService {
    quotes: HashMap<String, Quote>,
}

impl FixedQuoteService {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a small, plausible market for sandbox runs.
    pub fn sandbox() -> Self {
        let mut service = Self::new();
        for (symbol, name, price) in [
            ("AAPL", "Apple Inc.", Decimal::new(18950, 2)),
            ("AMZN", "Amazon.com Inc.", Decimal::new(17810, 2)),
            ("MSFT", "Microsoft Corporation", Decimal::new(41525, 2)),
            ("NFLX", "Netflix Inc.", Decimal::new(63400, 2)),
            ("TSLA", "Tesla Inc.", Decimal::new(24260, 2)),
        ] {
            service.insert(symbol, name, price);
        }
        service
    }

    /// Adds or replaces a symbol in the table.
    pub fn insert(&mut self, symbol: &str, name: &str, price: Decimal) {
        let symbol = symbol.to_uppercase();
        self.quotes.insert(
            symbol.clone(),
            Quote {
                symbol,
                name: name.to_string(),
                price,
            },
        );
    }
}

#[async_trait]
impl QuoteService for FixedQuoteService {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        Ok(self.quotes.get(&symbol.trim().to_uppercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let service = FixedQuoteService::sandbox();
        let quote = service.lookup("aapl").await.unwrap().unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, dec!(189.50));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_none() {
        let service = FixedQuoteService::sandbox();
        assert!(service.lookup("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_overrides_price() {
        let mut service = FixedQuoteService::new();
        service.insert("AAPL", "Apple Inc.", dec!(100.00));
        service.insert("AAPL", "Apple Inc.", dec!(101.00));
        let quote = service.lookup("AAPL").await.unwrap().unwrap();
        assert_eq!(quote.price, dec!(101.00));
    }
}
