// ABOUTME: Steady-state waiter polling an elastic group's instance health.
// ABOUTME: Bounded by a deadline and a cancellation signal; never blocks past either.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::cloud::{GroupError, GroupOps};
use crate::log_sink::ExecutionLog;
use crate::types::GroupId;

use super::context::CancelSignal;

/// Default interval between two health polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Outcome of waiting for a group to become steady.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteadyState {
    /// The healthy instance count reached the target.
    Reached,
    /// The deadline elapsed first.
    TimedOut,
    /// Cancellation was requested first.
    Cancelled,
}

impl SteadyState {
    pub fn is_ok(&self) -> bool {
        matches!(self, SteadyState::Reached)
    }
}

/// Polls instance health at a fixed interval until a target count is healthy.
#[derive(Debug, Clone, Copy)]
pub struct SteadyStateWaiter {
    poll_interval: Duration,
}

impl Default for SteadyStateWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl SteadyStateWaiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait until `target` instances of `group` report healthy.
    ///
    /// A target of zero is steady without asking the provider. Otherwise the
    /// last poll happens at the deadline at the latest, and a health request
    /// still in flight at the deadline is abandoned.
    ///
    /// # Errors
    ///
    /// Returns the provider error if a health request fails.
    pub async fn wait<G: GroupOps + ?Sized>(
        &self,
        groups: &G,
        group: &GroupId,
        target: u32,
        timeout: Duration,
        cancel: &CancelSignal,
        log: &ExecutionLog,
    ) -> Result<SteadyState, GroupError> {
        if target == 0 {
            log.info(format!(
                "Elastigroup: [{group}] has a target of 0 instances, nothing to wait for"
            ));
            return Ok(SteadyState::Reached);
        }

        // A timeout past the clock's range means no deadline.
        let deadline = Instant::now().checked_add(timeout);
        log.info(format!(
            "Waiting up to {}s for Elastigroup: [{group}] to reach steady state",
            timeout.as_secs()
        ));

        loop {
            let health = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(SteadyState::Cancelled),
                polled = before(deadline, groups.list_instance_health(group)) => match polled {
                    Some(health) => health?,
                    None => {
                        tracing::debug!(%group, "health request still pending at deadline");
                        return Ok(SteadyState::TimedOut);
                    }
                },
            };

            let total = health.len();
            let healthy = health.iter().filter(|h| h.is_healthy()).count();
            log.info(format!(
                "Desired instances: [{target}], Total instances: [{total}], Healthy instances: [{healthy}] for Elastigroup: [{group}]"
            ));

            if healthy >= target as usize {
                return Ok(SteadyState::Reached);
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                return Ok(SteadyState::TimedOut);
            }

            let wake = [now.checked_add(self.poll_interval), deadline]
                .into_iter()
                .flatten()
                .min();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(SteadyState::Cancelled),
                _ = before(wake, std::future::pending::<()>()) => {}
            }
        }
    }
}

/// Drive `fut` until `deadline`; `None` if the deadline came first.
async fn before<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}
