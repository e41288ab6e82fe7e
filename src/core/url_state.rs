//! Mirrors the applied spread into a share link's query string

use super::spread::parse_spread;
use anyhow::{Context, Result};
use reqwest::Url;
use rust_decimal::Decimal;

pub const SPREAD_PARAM: &str = "spread";

#[derive(Debug, Clone, PartialEq)]
pub struct UrlStateMirror {
    url: Url,
}

impl UrlStateMirror {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid share URL: {url}"))?;
        Ok(Self::new(url))
    }

    /// Spread carried by the link. Missing or non-numeric values count as zero.
    pub fn initial_spread(&self) -> Decimal {
        self.url
            .query_pairs()
            .find(|(key, _)| *key == SPREAD_PARAM)
            .and_then(|(_, value)| parse_spread(&value))
            .unwrap_or(Decimal::ZERO)
    }

    /// Rewrites the `spread` parameter in place, keeping every other parameter.
    /// Text that does not parse leaves the link untouched; returns whether it changed.
    pub fn reflect(&mut self, spread_text: &str) -> bool {
        let Some(spread) = parse_spread(spread_text) else {
            return false;
        };

        let others: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| *key != SPREAD_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        self.url
            .query_pairs_mut()
            .clear()
            .extend_pairs(others)
            .append_pair(SPREAD_PARAM, &spread.normalize().to_string());
        true
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
