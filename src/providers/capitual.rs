use super::http_client;
use crate::core::quote::{Quote, QuoteProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, error, instrument, warn};

#[derive(Debug, Deserialize)]
struct MarketPriceResponse {
    data: MarketPrice,
}

#[derive(Debug, Deserialize)]
struct MarketPrice {
    #[serde(default)]
    market: bool,
    pair: String,
    #[serde(alias = "fxRate")]
    fx_rate: String,
}

pub struct CapitualProvider {
    base_url: String,
    pair: String,
    client: reqwest::Client,
}

impl CapitualProvider {
    pub fn new(base_url: &str, pair: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            pair: pair.to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl QuoteProvider for CapitualProvider {
    #[instrument(name = "CapitualQuoteFetch", skip(self), fields(pair = %self.pair))]
    async fn fetch_quote(&self) -> Result<Quote> {
        let url = format!("{}/api/v1.0/market/price?pair={}", self.base_url, self.pair);
        debug!("Requesting market price from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Market price request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}",
                response.status(),
                self.pair
            ));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let body: MarketPriceResponse = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse market price response"
                );
                return Err(e).context("Failed to parse market price response");
            }
        };

        let data = body.data;
        if !data.market {
            warn!(pair = %data.pair, "Market reported as closed");
        }

        let price = Decimal::from_str(&data.fx_rate)
            .with_context(|| format!("Invalid fxRate '{}' for {}", data.fx_rate, data.pair))?;

        Ok(Quote::new(data.pair, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    async fn create_mock_server(status: u16, mock_response: &str) -> wiremock::MockServer {
        let mock_server = wiremock::MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/market/price"))
            .and(query_param("pair", TEST_PAIR))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    const TEST_PAIR: &str = "USDT_BRL";
    const MOCK_JSON: &str = r#"{
        "data": {
            "market": true,
            "pair": "USDT_BRL",
            "fxRate": "5.6112"
        }
    }"#;

    #[tokio::test]
    async fn test_fetch_quote() {
        let mock_server = create_mock_server(200, MOCK_JSON).await;
        let provider = CapitualProvider::new(&mock_server.uri(), TEST_PAIR).unwrap();

        let quote = provider.fetch_quote().await.unwrap();
        assert_eq!(quote.pair, "USDT_BRL");
        assert_eq!(quote.price, dec!(5.6112));
    }

    #[tokio::test]
    async fn test_closed_market_still_quotes() {
        let mock_response = r#"{"data": {"market": false, "pair": "USDT_BRL", "fxRate": "5.60"}}"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let provider = CapitualProvider::new(&mock_server.uri(), TEST_PAIR).unwrap();

        let quote = provider.fetch_quote().await.unwrap();
        assert_eq!(quote.price, dec!(5.60));
    }

    #[tokio::test]
    async fn test_flat_payload_is_rejected() {
        let mock_server =
            create_mock_server(200, r#"{"symbol":"USDTBRL","price":"5.6"}"#).await;
        let provider = CapitualProvider::new(&mock_server.uri(), TEST_PAIR).unwrap();

        let result = provider.fetch_quote().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to parse market price response"
        );
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = create_mock_server(503, "").await;
        let provider = CapitualProvider::new(&mock_server.uri(), TEST_PAIR).unwrap();

        let result = provider.fetch_quote().await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for pair: USDT_BRL"
        );
    }
}
