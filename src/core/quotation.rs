//! Live quotation session: poller, debounced spread input, clipboard export and
//! share-link mirroring around one state cell.

use super::clipboard::{Clipboard, ClipboardExporter};
use super::config::Timings;
use super::debounce::Debouncer;
use super::poller::{PollerHandle, PricePoller};
use super::quote::{Quote, QuoteProvider};
use super::spread::displayed_value;
use super::url_state::UrlStateMirror;
use reqwest::Url;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotationState {
    pub quote: Option<Quote>,
    /// Spread text as last applied by the debouncer.
    pub spread: String,
    /// `None` until the first quote arrives.
    pub displayed: Option<Decimal>,
    /// Set when the most recent poll failed.
    pub feed_error: bool,
}

impl QuotationState {
    fn recompute(&mut self) {
        self.displayed = self
            .quote
            .as_ref()
            .map(|quote| displayed_value(quote.price, &self.spread));
    }

    pub fn base_price(&self) -> Option<Decimal> {
        self.quote.as_ref().map(|quote| quote.price)
    }

    /// Displayed value, else the base price, else zero.
    pub fn value_to_copy(&self) -> Decimal {
        self.displayed
            .or_else(|| self.base_price())
            .unwrap_or(Decimal::ZERO)
    }
}

pub struct Quotation {
    state: watch::Sender<QuotationState>,
    share: watch::Sender<Option<UrlStateMirror>>,
    debouncer: Debouncer<String>,
    exporter: ClipboardExporter,
    poller: PollerHandle,
}

impl Quotation {
    /// Starts polling right away. An explicit `initial_spread` takes precedence over
    /// the one carried by the share link.
    pub fn start(
        provider: Arc<dyn QuoteProvider>,
        timings: Timings,
        clipboard: Box<dyn Clipboard>,
        mut share: Option<UrlStateMirror>,
        initial_spread: Option<String>,
    ) -> Self {
        let spread = match (initial_spread, share.as_mut()) {
            (Some(text), Some(mirror)) => {
                mirror.reflect(&text);
                text
            }
            (Some(text), None) => text,
            (None, Some(mirror)) => {
                let spread = mirror.initial_spread();
                if spread.is_zero() {
                    String::new()
                } else {
                    spread.normalize().to_string()
                }
            }
            (None, None) => String::new(),
        };
        info!(spread = %spread, "Starting quotation");

        let (state, _) = watch::channel(QuotationState {
            spread,
            ..Default::default()
        });
        let (share, _) = watch::channel(share);

        let on_quote = {
            let state = state.clone();
            move |quote: Quote| {
                state.send_modify(|s| {
                    s.quote = Some(quote);
                    s.feed_error = false;
                    s.recompute();
                });
            }
        };
        let on_error = {
            let state = state.clone();
            move |_: &anyhow::Error| {
                state.send_modify(|s| s.feed_error = true);
            }
        };
        let poller = PricePoller::spawn(provider, timings.poll_interval, on_quote, on_error);

        let debouncer = {
            let state = state.clone();
            let share = share.clone();
            Debouncer::new(timings.debounce, move |text: String| {
                debug!(spread = %text, "Applying spread");
                share.send_if_modified(|mirror| {
                    mirror
                        .as_mut()
                        .is_some_and(|mirror| mirror.reflect(&text))
                });
                // Reads the quote held right now, not the one seen when the key was pressed.
                state.send_modify(|s| {
                    s.spread = text;
                    s.recompute();
                });
            })
        };

        Self {
            state,
            share,
            debouncer,
            exporter: ClipboardExporter::new(clipboard, timings.copied_ack),
            poller,
        }
    }

    /// Feeds raw spread text through the debounce window.
    pub fn on_spread_input(&self, text: impl Into<String>) {
        self.debouncer.call(text.into());
    }

    /// Copies the current value and returns the text written.
    pub fn copy(&mut self) -> String {
        let value = self.state.borrow().value_to_copy();
        self.exporter.copy(value)
    }

    pub fn snapshot(&self) -> QuotationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuotationState> {
        self.state.subscribe()
    }

    pub fn copied(&self) -> watch::Receiver<bool> {
        self.exporter.copied()
    }

    pub fn share_url(&self) -> Option<Url> {
        self.share
            .borrow()
            .as_ref()
            .map(|mirror| mirror.url().clone())
    }

    pub fn subscribe_share(&self) -> watch::Receiver<Option<UrlStateMirror>> {
        self.share.subscribe()
    }

    pub fn shutdown(&self) {
        debug!("Stopping quotation poller");
        self.poller.stop();
    }
}
