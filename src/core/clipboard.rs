use anyhow::{Context, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Places copied values are rounded to.
pub const COPY_DECIMAL_PLACES: u32 = 4;

/// Text written to the clipboard for a displayed value: rounded half away from zero
/// to four places, trailing zeros dropped.
pub fn clipboard_text(value: Decimal) -> String {
    value
        .round_dp_with_strategy(COPY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;

    /// Like [`Clipboard::set_text`], but for callers about to exit: blocks until the
    /// text has been handed over to another owner of the selection.
    fn hold_text(&mut self, text: &str) -> Result<()> {
        self.set_text(text)
    }
}

/// Host clipboard. The handle is opened lazily and kept so the selection stays owned
/// for as long as the process runs.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("Failed to open clipboard")?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard
                .set_text(text.to_owned())
                .context("Failed to write clipboard")?;
        }
        Ok(())
    }

    // X11 and Wayland drop the selection together with its owner.
    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    fn hold_text(&mut self, text: &str) -> Result<()> {
        use arboard::SetExtLinux;

        let mut clipboard = arboard::Clipboard::new().context("Failed to open clipboard")?;
        clipboard
            .set()
            .wait()
            .text(text.to_owned())
            .context("Failed to write clipboard")
    }
}

/// Writes values to a [`Clipboard`] and raises a transient "copied" flag.
pub struct ClipboardExporter {
    clipboard: Box<dyn Clipboard>,
    ack_window: Duration,
    copied: watch::Sender<bool>,
    generation: Arc<AtomicU64>,
}

impl ClipboardExporter {
    pub fn new(clipboard: Box<dyn Clipboard>, ack_window: Duration) -> Self {
        let (copied, _) = watch::channel(false);
        Self {
            clipboard,
            ack_window,
            copied,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Copies `value` and returns the text that was written. Clipboard errors are
    /// swallowed; the acknowledgement is shown either way.
    pub fn copy(&mut self, value: Decimal) -> String {
        let text = clipboard_text(value);
        if let Err(e) = self.clipboard.set_text(&text) {
            debug!(error = %e, "Clipboard write failed");
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.copied.send_replace(true);

        let copied = self.copied.clone();
        let current = Arc::clone(&self.generation);
        let window = self.ack_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // A newer copy owns the flag now.
            if current.load(Ordering::SeqCst) == generation {
                copied.send_replace(false);
            }
        });

        text
    }

    pub fn copied(&self) -> watch::Receiver<bool> {
        self.copied.subscribe()
    }
}
