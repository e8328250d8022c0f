// THEORY:
// The `debounce` module collapses a burst of requests into one. A slider being
// dragged fires dozens of parameter changes per second; only the last one,
// after a short quiet period, is worth a full decode-compact-encode pass.
//
// Key principles:
// 1.  **Caller-Scoped**: Each `Debouncer` belongs to one session. There is no
//     process-wide timer handle.
// 2.  **Cancel Timers, Not Work**: A newer call cancels the previous timer if it
//     has not fired yet. Once a timer fires, its job is handed to the blocking
//     pool and runs to completion no matter what happens afterwards.
// 3.  **Results by Channel**: Finished jobs send their output to the receiver
//     returned by `new`, in the order they complete.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Quiet period used by the interactive surfaces.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(333);

pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    results: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (results, receiver) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                pending: None,
                results,
            },
            receiver,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `job` to run once `delay` has passed without another call.
    pub fn call<F>(&mut self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let results = self.results.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The job sends its own result; aborting this task past here loses nothing.
            let work = tokio::task::spawn_blocking(move || {
                let _ = results.send(job());
            });
            if let Err(err) = work.await {
                warn!(error = %err, "debounced job failed");
            }
        }));
    }

    /// Drops the pending timer, if it has not fired yet.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("superseding pending debounced call");
            }
            handle.abort();
        }
    }

    /// True while a scheduled call has not yet delivered its result.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
