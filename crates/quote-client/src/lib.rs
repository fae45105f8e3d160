//! Quote Service clients for folio
//!
//! This crate provides the two [`QuoteService`] implementations the service
//! runs with:
//! - [`HttpQuoteService`]: the real thing, an IEX-style REST vendor
//! - [`FixedQuoteService`]: a deterministic in-memory table for sandbox
//!   runs and tests
//!
//! Per the engine's contract neither implementation caches: every lookup is
//! a fresh read, and whatever the vendor says at call time is authoritative
//! for that operation.

pub mod fixed;
pub mod http;

pub use fixed::FixedQuoteService;
pub use http::HttpQuoteService;

pub use folio_core::{Quote, QuoteError, QuoteService};
