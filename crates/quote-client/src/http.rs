//! HTTP quote vendor client
//!
//! Talks to an IEX-style REST endpoint:
//! `GET {base_url}/stock/{symbol}/quote?token={api_token}` returning
//! `{"symbol", "companyName", "latestPrice"}`. A 404 means the symbol does
//! not resolve; anything else non-2xx is a service failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use folio_core::{Quote, QuoteError, QuoteService};

/// Public IEX-compatible endpoint root
pub const DEFAULT_BASE_URL: &str = "https://cloud.iexapis.com/stable";

/// Per-request deadline; the ledger treats a slow vendor as an outage.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Quote payload as the vendor serializes it
#[derive(Debug, Deserialize)]
struct QuotePayload {
    symbol: String,
    #[serde(rename = "companyName")]
    company_name: String,
    #[serde(rename = "latestPrice")]
    latest_price: Decimal,
}

/// REST client for the external quote vendor
pub struct HttpQuoteService {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpQuoteService {
    /// Creates a client against the given endpoint root and API token.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }

    /// Creates a client against the public vendor endpoint.
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self::new(DEFAULT_BASE_URL, api_token)
    }
}

#[async_trait]
impl QuoteService for HttpQuoteService {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!("{}/stock/{}/quote", self.base_url, symbol);
        debug!(%symbol, "looking up quote");

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.api_token.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| QuoteError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%symbol, "symbol does not resolve");
            return Ok(None);
        }

        if !response.status().is_success() {
            warn!(%symbol, status = %response.status(), "quote vendor returned failure");
            return Err(QuoteError::Transport(format!(
                "quote vendor returned HTTP {}",
                response.status()
            )));
        }

        let payload: QuotePayload = response
            .json()
            .await
            .map_err(|e| QuoteError::Malformed(e.to_string()))?;

        Ok(Some(Quote {
            symbol: payload.symbol,
            name: payload.company_name,
            price: payload.latest_price,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolves_quote_from_vendor_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/AAPL/quote"))
            .and(query_param("token", "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "AAPL",
                "companyName": "Apple Inc.",
                "latestPrice": 150.25
            })))
            .mount(&server)
            .await;

        let service = HttpQuoteService::new(server.uri(), "test-token");
        let quote = service.lookup("aapl").await.unwrap().unwrap();

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.price, dec!(150.25));
    }

    #[tokio::test]
    async fn test_unknown_symbol_resolves_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/ZZZZ/quote"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown symbol"))
            .mount(&server)
            .await;

        let service = HttpQuoteService::new(server.uri(), "test-token");
        assert!(service.lookup("ZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/AAPL/quote"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = HttpQuoteService::new(server.uri(), "test-token");
        let err = service.lookup("AAPL").await.unwrap_err();
        assert!(matches!(err, QuoteError::Transport(_)));
    }

    #[tokio::test]
    async fn test_garbage_payload_is_malformed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock/AAPL/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let service = HttpQuoteService::new(server.uri(), "test-token");
        let err = service.lookup("AAPL").await.unwrap_err();
        assert!(matches!(err, QuoteError::Malformed(_)));
    }
}
