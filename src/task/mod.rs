// ABOUTME: Task-handler framework and the four orchestration protocols.
// ABOUTME: Exports the Orchestrator entry point, parameter and result types, and the waiter.

mod context;
mod deploy;
mod error;
mod handler;
mod instances;
mod mutator;
mod params;
mod result;
mod swap_routes;
mod sync;
mod traffic_shift;
mod waiter;

pub use context::{CancelHandle, CancelSignal, cancellation};
pub use error::TaskError;
pub use handler::Orchestrator;
pub use mutator::{DOWNSCALE, ScaleStep, UPSCALE};
pub use params::{
    DEFAULT_REGION, DeployParameters, Protocol, SwapRoutesParameters, SyncCommand,
    SyncParameters, TaskHeader, TaskParameters, TrafficShiftParameters,
};
pub use result::{
    DeployResponse, ListenerOutcome, SwapRoutesResponse, SyncResponse, TaskExecutionResult,
    TaskResponse, TaskStatus, TrafficShiftResponse,
};
pub use waiter::{DEFAULT_POLL_INTERVAL, SteadyState, SteadyStateWaiter};
