// ABOUTME: Task result envelope and per-protocol response payloads.
// ABOUTME: The envelope is the only value handed back to the caller.

use serde::{Deserialize, Serialize};

use crate::cloud::{ElasticGroup, Instance};
use crate::types::GroupId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Success,
    Failure,
}

/// Outcome of one protocol invocation. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskExecutionResult {
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<TaskResponse>,
}

impl TaskExecutionResult {
    pub fn success(response: TaskResponse) -> Self {
        Self {
            status: TaskStatus::Success,
            error_message: None,
            response: Some(response),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failure,
            error_message: Some(message.into()),
            response: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn response(&self) -> Option<&TaskResponse> {
        self.response.as_ref()
    }

    pub fn into_response(self) -> Option<TaskResponse> {
        self.response
    }
}

/// Protocol-specific payload of a successful task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", content = "data", rename_all = "snake_case")]
pub enum TaskResponse {
    Deploy(DeployResponse),
    SwapRoutes(SwapRoutesResponse),
    TrafficShift(TrafficShiftResponse),
    Sync(SyncResponse),
}

impl From<DeployResponse> for TaskResponse {
    fn from(value: DeployResponse) -> Self {
        TaskResponse::Deploy(value)
    }
}

impl From<SwapRoutesResponse> for TaskResponse {
    fn from(value: SwapRoutesResponse) -> Self {
        TaskResponse::SwapRoutes(value)
    }
}

impl From<TrafficShiftResponse> for TaskResponse {
    fn from(value: TrafficShiftResponse) -> Self {
        TaskResponse::TrafficShift(value)
    }
}

impl From<SyncResponse> for TaskResponse {
    fn from(value: SyncResponse) -> Self {
        TaskResponse::Sync(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResponse {
    /// Instances of the new group after resizing.
    pub instances_added: Vec<Instance>,
    /// Instances still running in the old group after resizing.
    pub instances_existing: Vec<Instance>,
}

/// What happened to the prod/stage listener pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerOutcome {
    Swapped,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoutesResponse {
    /// Name now carried by the group serving production, if one was renamed to it.
    pub prod_group_name: Option<String>,
    /// Name now carried by the group behind the stage listener.
    pub stage_group_name: Option<String>,
    pub listener: ListenerOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficShiftResponse {
    pub instances_added: Vec<Instance>,
    pub instances_existing: Vec<Instance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncResponse {
    Groups {
        groups: Vec<ElasticGroup>,
    },
    GroupConfig {
        group_id: GroupId,
        config: serde_json::Value,
    },
    Instances {
        group_id: GroupId,
        instances: Vec<Instance>,
    },
}
