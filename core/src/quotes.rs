//! Quote service contract.
//!
//! The quote service is external, unreliable, and authoritative: prices are
//! never overridden or cached inside the engine beyond the scope of a single
//! operation.

use async_trait::async_trait;

use crate::error::QuoteError;
use crate::types::Quote;

/// Symbol → name/price lookup against an external market-data source.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Looks up a fresh quote for `symbol`.
    ///
    /// `Ok(None)` means the symbol does not resolve to a listed security;
    /// `Err` means the service itself failed (unreachable, timed out, or
    /// returned garbage). Callers must treat the two differently.
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError>;
}
