//! Quote abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Latest price sample for a currency pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub pair: String,
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(pair: impl Into<String>, price: Decimal) -> Self {
        Self {
            pair: pair.into(),
            price,
            fetched_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self) -> Result<Quote>;
}
