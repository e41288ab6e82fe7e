use super::quote::{Quote, QuoteProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

/// Periodically fetches quotes from a [`QuoteProvider`].
pub struct PricePoller;

impl PricePoller {
    /// Fetches immediately, then once per `period` until the returned handle is stopped
    /// or dropped. Failures are logged and reported to `on_error`; the caller keeps
    /// whatever quote it last received.
    pub fn spawn<Q, E>(
        provider: Arc<dyn QuoteProvider>,
        period: Duration,
        mut on_quote: Q,
        mut on_error: E,
    ) -> PollerHandle
    where
        Q: FnMut(Quote) + Send + 'static,
        E: FnMut(&anyhow::Error) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match poll_once(provider.as_ref()).await {
                    Ok(quote) => on_quote(quote),
                    Err(e) => on_error(&e),
                }
            }
        });
        PollerHandle { task }
    }
}

#[instrument(name = "QuotePoll", skip_all)]
async fn poll_once(provider: &dyn QuoteProvider) -> anyhow::Result<Quote> {
    match provider.fetch_quote().await {
        Ok(quote) => {
            debug!(pair = %quote.pair, price = %quote.price, "Received quote");
            Ok(quote)
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch quote, keeping previous value");
            Err(e)
        }
    }
}

/// Owns the polling task. Dropping it cancels the timer.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail_after: usize,
    }

    impl CountingProvider {
        fn new(fail_after: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_after,
            }
        }
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        async fn fetch_quote(&self) -> Result<Quote> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.fail_after {
                return Err(anyhow!("feed down"));
            }
            Ok(Quote::new("USDTBRL", dec!(5.0) + rust_decimal::Decimal::from(n)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let provider = Arc::new(CountingProvider::new(usize::MAX));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let handle = PricePoller::spawn(
            provider.clone(),
            Duration::from_secs(3),
            move |q| sink.lock().unwrap().push(q.price),
            |_| {},
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *received.lock().unwrap(),
            vec![dec!(5.0), dec!(6.0), dec!(7.0)]
        );

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fetch_after_stop() {
        let provider = Arc::new(CountingProvider::new(usize::MAX));
        let handle = PricePoller::spawn(provider.clone(), Duration::from_secs(3), |_| {}, |_| {});

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_polling() {
        let provider = Arc::new(CountingProvider::new(usize::MAX));
        let handle = PricePoller::spawn(provider.clone(), Duration::from_secs(3), |_| {}, |_| {});

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_reported_and_polling_continues() {
        let provider = Arc::new(CountingProvider::new(1));
        let errors = Arc::new(AtomicUsize::new(0));
        let error_count = Arc::clone(&errors);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let _handle = PricePoller::spawn(
            provider.clone(),
            Duration::from_secs(3),
            move |q| sink.lock().unwrap().push(q.price),
            move |_| {
                error_count.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(6100)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(*received.lock().unwrap(), vec![dec!(5.0)]);
        assert_eq!(errors.load(Ordering::SeqCst), 2);
    }
}
