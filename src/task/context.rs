// ABOUTME: Per-invocation context shared by protocol steps.
// ABOUTME: Carries the cloud client, narration, waiter settings, and the cancellation signal.

use std::time::Duration;

use tokio::sync::watch;

use crate::log_sink::ExecutionLog;

use super::error::TaskError;
use super::waiter::SteadyStateWaiter;

/// Requests cancellation of in-flight protocols.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes cancellation. Cloning is cheap; every clone sees the same request.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that is never raised.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked cancellation handle and signal.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Everything a protocol step needs besides its parameters.
pub struct TaskContext<'a, C: ?Sized> {
    pub(crate) cloud: &'a C,
    pub(crate) log: ExecutionLog,
    pub(crate) waiter: SteadyStateWaiter,
    pub(crate) cancel: CancelSignal,
    pub(crate) default_timeout: Duration,
    pub(crate) region: String,
}

impl<'a, C: ?Sized> TaskContext<'a, C> {
    /// Resolve a task's timeout against the configured default.
    pub(crate) fn timeout(&self, requested: Option<Duration>) -> Duration {
        requested.unwrap_or(self.default_timeout)
    }

    /// Refuse to start `step` once cancellation has been requested.
    ///
    /// Steps that already committed are left as they are.
    pub(crate) fn checkpoint(&self, step: &str) -> Result<(), TaskError> {
        if self.cancel.is_cancelled() {
            self.log
                .warn(format!("Cancellation requested, not starting: {step}"));
            return Err(TaskError::Cancelled(step.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_signal_is_not_cancelled() {
        assert!(!CancelSignal::never().is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_visible_to_clones() {
        let (handle, signal) = cancellation();
        let clone = signal.clone();
        handle.cancel();
        assert!(signal.is_cancelled());
        clone.cancelled().await;
    }

    #[tokio::test]
    async fn cancelled_wakes_pending_waiter() {
        let (handle, signal) = cancellation();
        let waiter = tokio::spawn(async move { signal.cancelled().await });
        tokio::task::yield_now().await;
        handle.cancel();
        waiter.await.unwrap();
    }
}
