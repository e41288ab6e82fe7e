use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Trailing-edge debounce.
///
/// Every [`Debouncer::call`] replaces the pending arguments and restarts the quiet
/// window. Once `wait` elapses without another call, the callback runs exactly once
/// with the most recent arguments. Dropping the debouncer discards a pending call.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    pub fn new<F>(wait: Duration, callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, wait, callback));
        Self { tx, task }
    }

    pub fn call(&self, args: T) {
        // Receiver only goes away with the task, which we own.
        let _ = self.tx.send(args);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F>(mut rx: mpsc::UnboundedReceiver<T>, wait: Duration, mut callback: F)
where
    F: FnMut(T),
{
    while let Some(mut pending) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(args) => {
                        trace!("Debounce window restarted");
                        pending = args;
                    }
                    None => return,
                },
                _ = tokio::time::sleep(wait) => {
                    callback(pending);
                    break;
                }
            }
        }
    }
}
