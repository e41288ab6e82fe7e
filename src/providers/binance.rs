use super::http_client;
use crate::core::quote::{Quote, QuoteProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Flat ticker: `{"symbol": "USDTBRL", "price": "5.61200000"}`.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

pub struct BinanceProvider {
    base_url: String,
    symbol: String,
    client: reqwest::Client,
}

impl BinanceProvider {
    pub fn new(base_url: &str, symbol: &str) -> Result<Self> {
        Ok(BinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol: symbol.to_string(),
            client: http_client()?,
        })
    }
}

#[async_trait]
impl QuoteProvider for BinanceProvider {
    #[instrument(name = "BinanceQuoteFetch", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_quote(&self) -> Result<Quote> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}",
            self.base_url, self.symbol
        );
        debug!("Requesting ticker from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, self.symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                self.symbol
            ));
        }

        let text = response.text().await?;
        let ticker: TickerPrice = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", self.symbol, e))?;

        let price = Decimal::from_str(&ticker.price)
            .with_context(|| format!("Invalid price '{}' for {}", ticker.price, ticker.symbol))?;

        Ok(Quote::new(ticker.symbol, price))
    }
}
