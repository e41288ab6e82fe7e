use super::ui;
use crate::core::QuotationState;
use crate::core::clipboard::{Clipboard, SystemClipboard, clipboard_text};
use crate::core::config::AppConfig;
use crate::core::quote::QuoteProvider;
use crate::core::spread::displayed_value;
use crate::core::url_state::UrlStateMirror;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::warn;

/// Fetches one quote and derives the displayed value. An explicit spread wins over
/// the share link's, and is reflected into it.
pub async fn quote_once(
    provider: &dyn QuoteProvider,
    spread: Option<String>,
    mut share: Option<UrlStateMirror>,
) -> Result<(QuotationState, Option<UrlStateMirror>)> {
    let spread = match (spread, share.as_mut()) {
        (Some(text), Some(mirror)) => {
            mirror.reflect(&text);
            text
        }
        (Some(text), None) => text,
        (None, Some(mirror)) => mirror.initial_spread().normalize().to_string(),
        (None, None) => String::new(),
    };

    let quote = provider
        .fetch_quote()
        .await
        .context("Failed to fetch quote")?;
    let displayed = displayed_value(quote.price, &spread);

    let state = QuotationState {
        quote: Some(quote),
        spread,
        displayed: Some(displayed),
        feed_error: false,
    };
    Ok((state, share))
}

/// Writes `value` for a process that exits right after, so the clipboard is held
/// rather than merely set.
fn copy_and_hold(clipboard: &mut dyn Clipboard, value: Decimal) -> Result<String> {
    let text = clipboard_text(value);
    clipboard.hold_text(&text)?;
    Ok(text)
}

pub async fn run(
    provider: &dyn QuoteProvider,
    config: &AppConfig,
    spread: Option<String>,
    share: Option<UrlStateMirror>,
    copy: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching quote");
    let result = quote_once(provider, spread, share).await;
    pb.finish_and_clear();
    let (state, share) = result?;

    if let Some(quote) = &state.quote {
        println!(
            "\n{} {}",
            ui::style_text(&quote.pair, ui::StyleType::Title),
            ui::style_text(
                &quote.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                ui::StyleType::Subtle
            )
        );
    }
    println!(
        "{}",
        ui::quotation_card(&config.label, &config.currency_symbol, &state, &state.spread)
    );

    if let Some(mirror) = &share {
        println!("Share link: {}", mirror.url());
    }

    if copy {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Copying {}, held until another copy replaces it",
                    clipboard_text(state.value_to_copy())
                ),
                ui::StyleType::Subtle
            )
        );
        // Blocks this one-shot command until the selection changes hands.
        match copy_and_hold(&mut SystemClipboard::default(), state.value_to_copy()) {
            Ok(_) => println!("{}", ui::style_text("Copied!", ui::StyleType::Success)),
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                println!(
                    "{}",
                    ui::style_text("Clipboard unavailable", ui::StyleType::Subtle)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Quote;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct RecordingClipboard {
        set: Vec<String>,
        held: Vec<String>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.set.push(text.to_string());
            Ok(())
        }

        fn hold_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(anyhow!("no display"));
            }
            self.held.push(text.to_string());
            Ok(())
        }
    }

    struct FixedProvider(Option<Decimal>);

    #[async_trait]
    impl QuoteProvider for FixedProvider {
        async fn fetch_quote(&self) -> Result<Quote> {
            self.0
                .map(|price| Quote::new("USDTBRL", price))
                .ok_or_else(|| anyhow!("feed unavailable"))
        }
    }

    #[tokio::test]
    async fn test_quote_once_with_spread() {
        let provider = FixedProvider(Some(dec!(5.2341789)));
        let (state, share) = quote_once(&provider, Some("2".to_string()), None)
            .await
            .unwrap();

        assert_eq!(state.displayed, Some(dec!(5.338862478)));
        assert_eq!(clipboard_text(state.value_to_copy()), "5.3389");
        assert!(share.is_none());
    }

    #[tokio::test]
    async fn test_quote_once_restores_share_link_spread() {
        let provider = FixedProvider(Some(dec!(200)));
        let mirror = UrlStateMirror::parse("https://cotacao.example/?spread=1.5").unwrap();
        let (state, _) = quote_once(&provider, None, Some(mirror)).await.unwrap();

        assert_eq!(state.spread, "1.5");
        assert_eq!(state.displayed, Some(dec!(203)));
    }

    #[tokio::test]
    async fn test_quote_once_reflects_explicit_spread() {
        let provider = FixedProvider(Some(dec!(100)));
        let mirror = UrlStateMirror::parse("https://cotacao.example/").unwrap();
        let (_, share) = quote_once(&provider, Some("0.75".to_string()), Some(mirror))
            .await
            .unwrap();

        assert_eq!(
            share.unwrap().url().as_str(),
            "https://cotacao.example/?spread=0.75"
        );
    }

    #[test]
    fn test_one_shot_copy_holds_clipboard() {
        let mut clipboard = RecordingClipboard::default();
        let text = copy_and_hold(&mut clipboard, dec!(5.338862478)).unwrap();

        assert_eq!(text, "5.3389");
        assert_eq!(clipboard.held, vec!["5.3389".to_string()]);
        assert!(clipboard.set.is_empty());
    }

    #[test]
    fn test_one_shot_copy_reports_failure() {
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(copy_and_hold(&mut clipboard, dec!(1)).is_err());
    }

    #[tokio::test]
    async fn test_quote_once_feed_failure() {
        let provider = FixedProvider(None);
        let err = quote_once(&provider, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch quote");
    }
}
