// ABOUTME: Error types for protocol execution.
// ABOUTME: Every variant is converted into a FAILURE result at the handler boundary.

use std::time::Duration;

use crate::cloud::{CloudError, GroupError, InventoryError, ListenerError};
use crate::types::{CapacityError, GroupId};

use super::params::Protocol;

/// Errors that can occur while a protocol runs.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The handler was given another protocol's parameters.
    #[error("parameters of unrecognized class {class} while executing {protocol}")]
    ParameterMismatch {
        class: &'static str,
        protocol: Protocol,
    },

    /// A required parameter was absent.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A requested capacity is not internally consistent.
    #[error("invalid capacity for elastigroup [{group}]: {source}")]
    InvalidCapacity {
        group: GroupId,
        #[source]
        source: CapacityError,
    },

    /// The group never reached its target healthy count.
    #[error("timed out after {}s waiting for steady state of elastigroup [{group}]", .timeout.as_secs())]
    SteadyStateTimeout { group: GroupId, timeout: Duration },

    /// Cancellation stopped the named step, or kept it from starting.
    #[error("cancelled at step: {0}")]
    Cancelled(String),

    /// The sync command is not one this handler knows.
    #[error("unrecognized sync command: {0}")]
    UnrecognizedSyncCommand(String),

    /// A collaborator call failed.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// The protocol panicked; the panic was contained at the handler boundary.
    #[error("protocol panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    /// Whether retrying the whole protocol later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TaskError::SteadyStateTimeout { .. } | TaskError::Cancelled(_) => true,
            TaskError::Cloud(e) => e.is_transient(),
            TaskError::ParameterMismatch { .. }
            | TaskError::MissingParameter(_)
            | TaskError::InvalidCapacity { .. }
            | TaskError::UnrecognizedSyncCommand(_)
            | TaskError::Panicked(_) => false,
        }
    }
}

impl From<GroupError> for TaskError {
    fn from(err: GroupError) -> Self {
        TaskError::Cloud(err.into())
    }
}

impl From<ListenerError> for TaskError {
    fn from(err: ListenerError) -> Self {
        TaskError::Cloud(err.into())
    }
}

impl From<InventoryError> for TaskError {
    fn from(err: InventoryError) -> Self {
        TaskError::Cloud(err.into())
    }
}
