use super::ui;
use crate::core::Quotation;
use crate::core::clipboard::SystemClipboard;
use crate::core::config::AppConfig;
use crate::core::quote::QuoteProvider;
use crate::core::url_state::UrlStateMirror;
use anyhow::Result;
use console::{Key, Term};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Edited,
    Copy,
    Quit,
    Ignored,
}

/// Applies a key press to the spread input buffer.
fn handle_key(input: &mut String, key: Key) -> KeyAction {
    match key {
        Key::Enter => KeyAction::Copy,
        Key::Escape | Key::Char('\u{3}') => KeyAction::Quit,
        Key::Backspace => {
            if input.pop().is_some() {
                KeyAction::Edited
            } else {
                KeyAction::Ignored
            }
        }
        Key::Char(c) if !c.is_control() => {
            input.push(c);
            KeyAction::Edited
        }
        _ => KeyAction::Ignored,
    }
}

/// `read_key` blocks, so keys are read on a plain thread that lives until exit.
fn spawn_key_reader(term: Term) -> mpsc::UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match term.read_key() {
                Ok(key) => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Key reader stopped");
                    break;
                }
            }
        }
    });
    rx
}

/// Runs a closure when dropped, so terminal state is restored on every exit path.
struct OnExit<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> OnExit<F> {
    fn new(restore: F) -> Self {
        Self(Some(restore))
    }
}

impl<F: FnOnce()> Drop for OnExit<F> {
    fn drop(&mut self) {
        if let Some(restore) = self.0.take() {
            restore();
        }
    }
}

fn render(
    term: &Term,
    config: &AppConfig,
    quotation: &Quotation,
    input: &str,
    copied: bool,
) -> Result<()> {
    let state = quotation.snapshot();
    let card = ui::quotation_card(&config.label, &config.currency_symbol, &state, input);

    term.clear_screen()?;
    term.write_line(&ui::style_text("Live quotation", ui::StyleType::Title))?;
    term.write_line(&card.to_string())?;

    if state.feed_error {
        term.write_line(&ui::style_text(
            "Quote unavailable, showing last known value",
            ui::StyleType::Error,
        ))?;
    }
    if let Some(url) = quotation.share_url() {
        term.write_line(&format!(
            "{} {}",
            ui::style_text("Link:", ui::StyleType::Subtle),
            url
        ))?;
    }

    let hint = if copied {
        ui::style_text("Copied!", ui::StyleType::Success)
    } else {
        ui::style_text("Type a spread · Enter to copy · Esc to quit", ui::StyleType::Subtle)
    };
    term.write_line(&hint)?;
    Ok(())
}

pub async fn run(
    provider: Arc<dyn QuoteProvider>,
    config: &AppConfig,
    spread: Option<String>,
    share: Option<UrlStateMirror>,
) -> Result<()> {
    let term = Term::stdout();
    let mut quotation = Quotation::start(
        provider,
        config.timings(),
        Box::new(SystemClipboard::default()),
        share,
        spread,
    );

    let mut input = quotation.snapshot().spread;
    let mut states = quotation.subscribe();
    let mut copied = quotation.copied();
    let mut links = quotation.subscribe_share();
    let mut keys = spawn_key_reader(term.clone());

    term.hide_cursor()?;
    let cursor = OnExit::new({
        let term = term.clone();
        move || {
            if let Err(e) = term.show_cursor() {
                debug!(error = %e, "Failed to restore cursor");
            }
        }
    });
    render(&term, config, &quotation, &input, false)?;

    loop {
        tokio::select! {
            key = keys.recv() => match key {
                Some(key) => match handle_key(&mut input, key) {
                    KeyAction::Edited => quotation.on_spread_input(input.clone()),
                    KeyAction::Copy => {
                        let text = quotation.copy();
                        debug!(%text, "Copied quotation");
                    }
                    KeyAction::Quit => break,
                    KeyAction::Ignored => continue,
                },
                None => break,
            },
            Ok(()) = states.changed() => {}
            Ok(()) = copied.changed() => {}
            Ok(()) = links.changed() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let is_copied = *copied.borrow_and_update();
        render(&term, config, &quotation, &input, is_copied)?;
    }

    quotation.shutdown();
    drop(cursor);
    if let Some(url) = quotation.share_url() {
        println!("Share link: {url}");
    }
    Ok(())
}
