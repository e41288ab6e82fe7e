pub mod binance;
pub mod capitual;

use crate::core::config::{FeedConfig, FeedKind};
use crate::core::quote::QuoteProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

pub use binance::BinanceProvider;
pub use capitual::CapitualProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("fxspread/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Builds the provider for the configured feed.
pub fn from_config(feed: &FeedConfig) -> Result<Arc<dyn QuoteProvider>> {
    let provider: Arc<dyn QuoteProvider> = match feed.kind {
        FeedKind::Binance => Arc::new(BinanceProvider::new(feed.base_url(), feed.pair())?),
        FeedKind::Capitual => Arc::new(CapitualProvider::new(feed.base_url(), feed.pair())?),
    };
    Ok(provider)
}
