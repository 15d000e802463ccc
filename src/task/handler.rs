// ABOUTME: Task handler boundary: dispatches parameters to protocols and wraps their outcome.
// ABOUTME: No error or panic escapes; every invocation ends in a TaskExecutionResult.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::Instrument;

use crate::cloud::CloudProvider;
use crate::config::SteadyStateConfig;
use crate::log_sink::{ExecutionLog, LogSink, UnitStatus};

use super::context::{CancelSignal, TaskContext};
use super::error::TaskError;
use super::params::{
    DeployParameters, Protocol, SwapRoutesParameters, SyncParameters, TaskHeader, TaskParameters,
    TrafficShiftParameters,
};
use super::result::{TaskExecutionResult, TaskResponse};
use super::waiter::SteadyStateWaiter;
use super::{deploy, swap_routes, sync, traffic_shift};

/// Runs orchestration protocols against a cloud provider.
///
/// The orchestrator keeps no state between invocations; everything a protocol
/// needs, including what a rollback must restore, arrives in its parameters.
pub struct Orchestrator<C> {
    cloud: C,
    sink: Arc<dyn LogSink>,
    waiter: SteadyStateWaiter,
    default_timeout: Duration,
    cancel: CancelSignal,
}

impl<C> std::fmt::Debug for Orchestrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("waiter", &self.waiter)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl<C: CloudProvider> Orchestrator<C> {
    pub fn new(cloud: C, sink: Arc<dyn LogSink>) -> Self {
        let steady_state = SteadyStateConfig::default();
        Self {
            cloud,
            sink,
            waiter: SteadyStateWaiter::new(steady_state.poll_interval),
            default_timeout: steady_state.default_timeout,
            cancel: CancelSignal::never(),
        }
    }

    /// Use the given poll interval and default steady-state timeout.
    pub fn with_steady_state(mut self, config: &SteadyStateConfig) -> Self {
        self.waiter = SteadyStateWaiter::new(config.poll_interval);
        self.default_timeout = config.default_timeout;
        self
    }

    /// Stop starting new mutating steps once `cancel` is raised.
    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cloud(&self) -> &C {
        &self.cloud
    }

    /// Run whichever protocol the parameters ask for.
    pub async fn execute(&self, params: TaskParameters) -> TaskExecutionResult {
        match params {
            TaskParameters::Deploy(p) => self.deploy(p).await,
            TaskParameters::SwapRoutes(p) => self.swap_routes(p).await,
            TaskParameters::TrafficShift(p) => self.traffic_shift(p).await,
            TaskParameters::Sync(p) => self.sync(p).await,
        }
    }

    /// Run the deploy protocol; any other parameters fail the task.
    pub async fn execute_deploy(&self, params: TaskParameters) -> TaskExecutionResult {
        match params {
            TaskParameters::Deploy(p) => self.deploy(p).await,
            other => self.mismatch(Protocol::Deploy, &other),
        }
    }

    /// Run the swap-routes protocol; any other parameters fail the task.
    pub async fn execute_swap_routes(&self, params: TaskParameters) -> TaskExecutionResult {
        match params {
            TaskParameters::SwapRoutes(p) => self.swap_routes(p).await,
            other => self.mismatch(Protocol::SwapRoutes, &other),
        }
    }

    /// Run the traffic-shift protocol; any other parameters fail the task.
    pub async fn execute_traffic_shift(&self, params: TaskParameters) -> TaskExecutionResult {
        match params {
            TaskParameters::TrafficShift(p) => self.traffic_shift(p).await,
            other => self.mismatch(Protocol::TrafficShift, &other),
        }
    }

    /// Run the sync protocol; any other parameters fail the task.
    pub async fn execute_sync(&self, params: TaskParameters) -> TaskExecutionResult {
        match params {
            TaskParameters::Sync(p) => self.sync(p).await,
            other => self.mismatch(Protocol::Sync, &other),
        }
    }

    async fn deploy(&self, params: DeployParameters) -> TaskExecutionResult {
        let ctx = self.context(Protocol::Deploy, &params.header, params.is_rollback);
        let span = protocol_span(Protocol::Deploy, &params.header);
        let outcome = contain(deploy::run(&ctx, params)).instrument(span).await;
        finish(&ctx, Protocol::Deploy, outcome)
    }

    async fn swap_routes(&self, params: SwapRoutesParameters) -> TaskExecutionResult {
        let ctx = self.context(Protocol::SwapRoutes, &params.header, params.is_rollback);
        let span = protocol_span(Protocol::SwapRoutes, &params.header);
        let outcome = contain(swap_routes::run(&ctx, params))
            .instrument(span)
            .await;
        finish(&ctx, Protocol::SwapRoutes, outcome)
    }

    async fn traffic_shift(&self, params: TrafficShiftParameters) -> TaskExecutionResult {
        let ctx = self.context(Protocol::TrafficShift, &params.header, false);
        let span = protocol_span(Protocol::TrafficShift, &params.header);
        let outcome = contain(traffic_shift::run(&ctx, params))
            .instrument(span)
            .await;
        finish(&ctx, Protocol::TrafficShift, outcome)
    }

    async fn sync(&self, params: SyncParameters) -> TaskExecutionResult {
        let ctx = self.context(Protocol::Sync, &params.header, false);
        let span = protocol_span(Protocol::Sync, &params.header);
        let outcome = contain(sync::run(&ctx, params)).instrument(span).await;
        finish(&ctx, Protocol::Sync, outcome)
    }

    fn context(&self, protocol: Protocol, header: &TaskHeader, rollback: bool) -> TaskContext<'_, C> {
        let log = ExecutionLog::new(Arc::clone(&self.sink), unit_name(protocol));
        let mode = if rollback { " (rollback)" } else { "" };
        match &header.activity_id {
            Some(activity) => log.info(format!(
                "Starting {protocol} task{mode} for activity: [{activity}]"
            )),
            None => log.info(format!("Starting {protocol} task{mode}")),
        }
        TaskContext {
            cloud: &self.cloud,
            log,
            waiter: self.waiter,
            cancel: self.cancel.clone(),
            default_timeout: self.default_timeout,
            region: header.region.clone(),
        }
    }

    fn mismatch(&self, expected: Protocol, params: &TaskParameters) -> TaskExecutionResult {
        let err = TaskError::ParameterMismatch {
            class: params.class_name(),
            protocol: expected,
        };
        let log = ExecutionLog::new(Arc::clone(&self.sink), unit_name(expected));
        log.error(err.to_string());
        log.close(UnitStatus::Failure);
        tracing::warn!(protocol = %expected, received = params.class_name(), "parameter mismatch");
        TaskExecutionResult::failure(err.to_string())
    }
}

/// Log unit holding a protocol's own narration.
fn unit_name(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Deploy => "Elastigroup Deploy",
        Protocol::SwapRoutes => "Elastigroup Swap Routes",
        Protocol::TrafficShift => "Elastigroup Traffic Shift",
        Protocol::Sync => "Elastigroup Sync",
    }
}

fn protocol_span(protocol: Protocol, header: &TaskHeader) -> tracing::Span {
    tracing::info_span!(
        "protocol",
        protocol = %protocol,
        activity_id = header.activity_id.as_deref().unwrap_or("-"),
        region = %header.region,
    )
}

/// Turn a panic inside a protocol into a task error.
async fn contain<T, F>(fut: F) -> Result<T, TaskError>
where
    F: Future<Output = Result<T, TaskError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => Err(TaskError::Panicked(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Close the protocol's log unit and build the result envelope.
fn finish<C: ?Sized, T: Into<TaskResponse>>(
    ctx: &TaskContext<'_, C>,
    protocol: Protocol,
    outcome: Result<T, TaskError>,
) -> TaskExecutionResult {
    match outcome {
        Ok(response) => {
            ctx.log
                .info(format!("Completed {protocol} task successfully"));
            ctx.log.close(UnitStatus::Success);
            tracing::info!(%protocol, "task succeeded");
            TaskExecutionResult::success(response.into())
        }
        Err(e) => {
            ctx.log
                .error(format!("Exception: [{e}] while executing {protocol} task"));
            ctx.log.close(UnitStatus::Failure);
            tracing::warn!(%protocol, error = %e, retryable = e.is_retryable(), "task failed");
            TaskExecutionResult::failure(e.to_string())
        }
    }
}
