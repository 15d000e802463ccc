// ABOUTME: Typed task parameters, one variant per orchestration protocol.
// ABOUTME: Rollback is a flag inside each mutating variant, not a separate task type.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cloud::ElasticGroup;
use crate::error::{Error, Result};
use crate::types::{GroupId, GroupNamePrefix, ListenerArn, TargetGroupArn};

pub const DEFAULT_REGION: &str = "us-east-1";

/// The orchestration protocols a task can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Deploy,
    SwapRoutes,
    TrafficShift,
    Sync,
}

impl Protocol {
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Deploy => "deploy",
            Protocol::SwapRoutes => "swap-routes",
            Protocol::TrafficShift => "traffic-shift",
            Protocol::Sync => "sync",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata common to every task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for TaskHeader {
    fn default() -> Self {
        Self {
            activity_id: None,
            command_name: None,
            account_id: None,
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Resize the new and old groups to their given capacities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployParameters {
    #[serde(default)]
    pub header: TaskHeader,
    #[serde(default)]
    pub new_group: Option<ElasticGroup>,
    #[serde(default)]
    pub old_group: Option<ElasticGroup>,
    #[serde(default)]
    pub resize_new_first: bool,
    #[serde(default)]
    pub is_rollback: bool,
    #[serde(default, with = "humantime_serde")]
    pub steady_state_timeout: Option<Duration>,
}

/// Blue/green cutover: rename groups and swap the prod and stage listeners.
///
/// On rollback, `old_group.capacity` is the capacity the old group held before
/// the forward swap; it is applied as-is, without consulting the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoutesParameters {
    #[serde(default)]
    pub header: TaskHeader,
    #[serde(default)]
    pub new_group: Option<ElasticGroup>,
    #[serde(default)]
    pub old_group: Option<ElasticGroup>,
    pub group_name_prefix: GroupNamePrefix,
    pub prod_listener_arn: ListenerArn,
    pub stage_listener_arn: ListenerArn,
    pub target_group_arn_for_new_group: TargetGroupArn,
    #[serde(default)]
    pub downsize_old_group: bool,
    #[serde(default)]
    pub is_rollback: bool,
    #[serde(default, with = "humantime_serde")]
    pub steady_state_timeout: Option<Duration>,
}

/// Canary: grow the new group alongside the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficShiftParameters {
    #[serde(default)]
    pub header: TaskHeader,
    #[serde(default)]
    pub new_group: Option<ElasticGroup>,
    #[serde(default)]
    pub old_group: Option<ElasticGroup>,
    #[serde(default, with = "humantime_serde")]
    pub steady_state_timeout: Option<Duration>,
}

/// Read-only queries against the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParameters {
    #[serde(default)]
    pub header: TaskHeader,
    pub command_type: SyncCommand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

/// Sub-operation of a sync task.
///
/// Unknown command strings are kept rather than rejected at parse time, so the
/// handler can report them as a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncCommand {
    ListGroups,
    GetGroupConfig,
    ListGroupInstances,
    Unrecognized(String),
}

impl SyncCommand {
    pub fn as_str(&self) -> &str {
        match self {
            SyncCommand::ListGroups => "LIST_ELASTI_GROUPS",
            SyncCommand::GetGroupConfig => "GET_ELASTI_GROUP_JSON",
            SyncCommand::ListGroupInstances => "LIST_ELASTI_GROUP_INSTANCES",
            SyncCommand::Unrecognized(other) => other,
        }
    }
}

impl From<String> for SyncCommand {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LIST_ELASTI_GROUPS" => SyncCommand::ListGroups,
            "GET_ELASTI_GROUP_JSON" => SyncCommand::GetGroupConfig,
            "LIST_ELASTI_GROUP_INSTANCES" => SyncCommand::ListGroupInstances,
            _ => SyncCommand::Unrecognized(value),
        }
    }
}

impl From<SyncCommand> for String {
    fn from(value: SyncCommand) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters delivered to the orchestrator; exactly one protocol per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskParameters {
    Deploy(DeployParameters),
    SwapRoutes(SwapRoutesParameters),
    TrafficShift(TrafficShiftParameters),
    Sync(SyncParameters),
}

impl TaskParameters {
    /// Parse a task from YAML (or JSON, which YAML accepts).
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| Error::InvalidTask {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            TaskParameters::Deploy(_) => Protocol::Deploy,
            TaskParameters::SwapRoutes(_) => Protocol::SwapRoutes,
            TaskParameters::TrafficShift(_) => Protocol::TrafficShift,
            TaskParameters::Sync(_) => Protocol::Sync,
        }
    }

    /// Name of the parameter type, as reported in mismatch failures.
    pub fn class_name(&self) -> &'static str {
        match self {
            TaskParameters::Deploy(_) => "DeployParameters",
            TaskParameters::SwapRoutes(_) => "SwapRoutesParameters",
            TaskParameters::TrafficShift(_) => "TrafficShiftParameters",
            TaskParameters::Sync(_) => "SyncParameters",
        }
    }

    pub fn header(&self) -> &TaskHeader {
        match self {
            TaskParameters::Deploy(p) => &p.header,
            TaskParameters::SwapRoutes(p) => &p.header,
            TaskParameters::TrafficShift(p) => &p.header,
            TaskParameters::Sync(p) => &p.header,
        }
    }

    /// Whether this task undoes a previous forward execution.
    pub fn is_rollback(&self) -> bool {
        match self {
            TaskParameters::Deploy(p) => p.is_rollback,
            TaskParameters::SwapRoutes(p) => p.is_rollback,
            TaskParameters::TrafficShift(_) | TaskParameters::Sync(_) => false,
        }
    }
}

impl From<DeployParameters> for TaskParameters {
    fn from(value: DeployParameters) -> Self {
        TaskParameters::Deploy(value)
    }
}

impl From<SwapRoutesParameters> for TaskParameters {
    fn from(value: SwapRoutesParameters) -> Self {
        TaskParameters::SwapRoutes(value)
    }
}

impl From<TrafficShiftParameters> for TaskParameters {
    fn from(value: TrafficShiftParameters) -> Self {
        TaskParameters::TrafficShift(value)
    }
}

impl From<SyncParameters> for TaskParameters {
    fn from(value: SyncParameters) -> Self {
        TaskParameters::Sync(value)
    }
}
