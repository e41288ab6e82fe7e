pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::url_state::UrlStateMirror;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Quote {
        spread: Option<String>,
        url: Option<String>,
        copy: bool,
    },
    Watch {
        spread: Option<String>,
        url: Option<String>,
    },
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Share link from the command line, else from the config file.
fn share_mirror(url: Option<String>, config: &AppConfig) -> Result<Option<UrlStateMirror>> {
    url.or_else(|| config.share_url.clone())
        .map(|url| UrlStateMirror::parse(&url))
        .transpose()
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxspread starting...");

    let config = load_config(config_path)?;
    let provider = providers::from_config(&config.feed)?;

    match command {
        AppCommand::Quote { spread, url, copy } => {
            let share = share_mirror(url, &config)?;
            cli::quote::run(provider.as_ref(), &config, spread, share, copy).await
        }
        AppCommand::Watch { spread, url } => {
            let share = share_mirror(url, &config)?;
            cli::watch::run(provider, &config, spread, share).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_mirror_prefers_command_line() {
        let config = AppConfig {
            share_url: Some("https://config.example/?spread=1".to_string()),
            ..Default::default()
        };

        let mirror = share_mirror(Some("https://cli.example/?spread=2".to_string()), &config)
            .unwrap()
            .unwrap();
        assert_eq!(mirror.url().host_str(), Some("cli.example"));

        let mirror = share_mirror(None, &config).unwrap().unwrap();
        assert_eq!(mirror.url().host_str(), Some("config.example"));
    }

    #[test]
    fn test_share_mirror_disabled_without_url() {
        assert!(share_mirror(None, &AppConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_share_mirror_rejects_bad_url() {
        assert!(share_mirror(Some("::".to_string()), &AppConfig::default()).is_err());
    }
}
