// ABOUTME: Shared data types for cloud collaborator traits.
// ABOUTME: Elastic groups, instance health snapshots, listener rules, and instance descriptors.

use serde::{Deserialize, Serialize};

use crate::types::{Capacity, GroupId, InstanceId, ListenerArn, TargetGroupArn};

/// A named, horizontally scalable set of instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticGroup {
    pub id: GroupId,
    pub name: String,
    pub capacity: Capacity,
}

impl ElasticGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            id: GroupId::new(id),
            name: name.into(),
            capacity,
        }
    }
}

/// A partial update to an elastic group. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
}

impl GroupUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            capacity: None,
        }
    }

    pub fn resize(capacity: Capacity) -> Self {
        Self {
            name: None,
            capacity: Some(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.capacity.is_none()
    }
}

/// Health reported for a single instance of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    InsufficientData,
    #[serde(other)]
    Unknown,
}

/// Point-in-time health of one instance belonging to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceHealth {
    pub instance_id: InstanceId,
    pub health_status: HealthStatus,
}

impl InstanceHealth {
    pub fn is_healthy(&self) -> bool {
        self.health_status == HealthStatus::Healthy
    }
}

/// The load balancer's current routing target for a listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerForwardingRule {
    pub listener_arn: ListenerArn,
    pub target_group_arn: TargetGroupArn,
}

/// Lifecycle state of an instance as reported by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    Terminated,
    #[serde(other)]
    Unknown,
}

/// Full descriptor of an instance, resolved from its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: InstanceId,
    pub region: String,
    pub state: InstanceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dns: Option<String>,
}

/// Account scoping for group listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}
