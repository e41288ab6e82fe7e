use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Flat `{symbol, price}` ticker.
    #[default]
    Binance,
    /// Nested `{data: {pair, fxRate}}` ticker.
    Capitual,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FeedConfig {
    #[serde(default)]
    pub kind: FeedKind,
    pub base_url: Option<String>,
    pub pair: Option<String>,
}

impl FeedConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.kind {
            FeedKind::Binance => "https://api.binance.com",
            FeedKind::Capitual => "https://trade.capitual.io",
        })
    }

    pub fn pair(&self) -> &str {
        self.pair.as_deref().unwrap_or(match self.kind {
            FeedKind::Binance => "USDTBRL",
            FeedKind::Capitual => "USDT_BRL",
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub label: String,
    pub currency_symbol: String,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub copied_ack_ms: u64,
    pub share_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            feed: FeedConfig::default(),
            label: "Tether (USDT)".to_string(),
            currency_symbol: "R$".to_string(),
            poll_interval_ms: 3000,
            debounce_ms: 800,
            copied_ack_ms: 2000,
            share_url: None,
        }
    }
}

/// Timings used by a quotation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub copied_ack: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        AppConfig::default().timings()
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults when
    /// no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxspread", "fxspread")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The poll ticker needs a non-zero period.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        Timings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            copied_ack: Duration::from_millis(self.copied_ack_ms),
        }
    }
}
