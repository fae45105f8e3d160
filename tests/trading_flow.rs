//! End-to-end tests for the trading flow
//!
//! Exercises the complete ledger lifecycle against the in-memory store and
//! fixed sandbox quotes: account funding, buys, portfolio valuation,
//! rejection paths, sells, and history.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use folio_core::{LedgerEngine, LedgerError, LedgerStore, MemoryStore, Transaction};
use quote_client::FixedQuoteService;

fn sandbox_engine(store: Arc<MemoryStore>) -> LedgerEngine {
    LedgerEngine::new(store, Arc::new(FixedQuoteService::sandbox()))
}

fn dec(value: &str) -> Decimal {
    value.parse().expect("literal decimal")
}

#[tokio::test]
async fn test_full_trading_lifecycle() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    store.open_account(user, dec("10000.00")).await;
    let engine = sandbox_engine(store.clone());

    // Fund check: fresh account, empty portfolio
    let portfolio = engine.portfolio(user).await.unwrap();
    assert!(portfolio.holdings.is_empty());
    assert_eq!(portfolio.cash, dec("10000.00"));

    // Buy into two positions (sandbox prices: AAPL 189.50, NFLX 634.00)
    engine.buy(user, "AAPL", 10).await.unwrap();
    engine.buy(user, "NFLX", 5).await.unwrap();

    let portfolio = engine.portfolio(user).await.unwrap();
    assert_eq!(portfolio.holdings.len(), 2);
    assert_eq!(portfolio.cash, dec("10000.00") - dec("1895.00") - dec("3170.00"));
    assert_eq!(
        portfolio.total_value(),
        portfolio.cash + dec("1895.00") + dec("3170.00")
    );

    // Overselling is rejected and changes nothing
    let before = engine.history(user).await.unwrap().len();
    let err = engine.sell(user, "AAPL", 11).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientShares { .. }));
    assert_eq!(engine.history(user).await.unwrap().len(), before);

    // Selling the whole AAPL position removes it from the portfolio
    engine.sell(user, "AAPL", 10).await.unwrap();
    let portfolio = engine.portfolio(user).await.unwrap();
    assert_eq!(portfolio.holdings.len(), 1);
    assert_eq!(portfolio.holdings[0].symbol, "NFLX");

    // History keeps every settlement in execution order
    let history = engine.history(user).await.unwrap();
    let shares: Vec<i64> = history.iter().map(|t| t.shares).collect();
    assert_eq!(shares, vec![10, 5, -10]);

    // Conservation: starting cash plus the signed settlement flows equals
    // the final balance
    let net: Decimal = history.iter().map(Transaction::cash_delta).sum();
    assert_eq!(portfolio.cash, dec("10000.00") + net);
}

#[tokio::test]
async fn test_rejections_leave_the_ledger_untouched() {
    let store = Arc::new(MemoryStore::new());
    let user = Uuid::new_v4();
    store.open_account(user, dec("100.00")).await;
    let engine = sandbox_engine(store.clone());

    let failures = [
        engine.buy(user, "AAPL", 1).await.unwrap_err(), // costs 189.50
        engine.buy(user, "ZZZZ", 1).await.unwrap_err(), // unknown symbol
        engine.sell(user, "AAPL", 1).await.unwrap_err(), // owns none
        engine.buy(user, "AAPL", -5).await.unwrap_err(), // bad quantity
    ];

    assert!(matches!(failures[0], LedgerError::InsufficientFunds { .. }));
    assert!(matches!(failures[1], LedgerError::InvalidSymbol { .. }));
    assert!(matches!(failures[2], LedgerError::InsufficientShares { .. }));
    assert!(matches!(failures[3], LedgerError::InvalidQuantity { .. }));

    assert_eq!(store.get_cash(user).await.unwrap(), dec("100.00"));
    assert_eq!(store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_users_settle_independently() {
    let store = Arc::new(MemoryStore::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.open_account(alice, dec("10000.00")).await;
    store.open_account(bob, dec("10000.00")).await;
    let engine = Arc::new(sandbox_engine(store.clone()));

    let (a, b) = tokio::join!(
        {
            let engine = engine.clone();
            async move { engine.buy(alice, "AAPL", 10).await }
        },
        {
            let engine = engine.clone();
            async move { engine.buy(bob, "NFLX", 10).await }
        },
    );

    // Different users never contend for the same balance
    a.unwrap();
    b.unwrap();
    assert_eq!(store.get_cash(alice).await.unwrap(), dec("8105.00"));
    assert_eq!(store.get_cash(bob).await.unwrap(), dec("3660.00"));
}
