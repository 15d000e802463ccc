// ABOUTME: Elastic group operations trait for the compute provider.
// ABOUTME: Read, list, update (capacity and name), and query instance health of groups.

use super::shared_types::{AccountContext, ElasticGroup, GroupUpdate, InstanceHealth};
use crate::types::{Capacity, GroupId};
use async_trait::async_trait;

/// Elastic group operations.
///
/// `update_group` is a single PUT-style request: applying the same update twice
/// leaves the group in the same state.
#[async_trait]
pub trait GroupOps: Send + Sync {
    /// Fetch a group by id.
    async fn get_group(&self, id: &GroupId) -> Result<ElasticGroup, GroupError>;

    /// List every group visible to the account.
    async fn list_groups(&self, account: &AccountContext)
    -> Result<Vec<ElasticGroup>, GroupError>;

    /// Fetch the provider's raw JSON configuration of a group.
    async fn get_raw_config(&self, id: &GroupId) -> Result<serde_json::Value, GroupError>;

    /// Apply a partial update (name and/or capacity) to a group.
    async fn update_group(&self, id: &GroupId, update: &GroupUpdate) -> Result<(), GroupError>;

    /// Health snapshot of every instance currently in the group.
    async fn list_instance_health(&self, id: &GroupId)
    -> Result<Vec<InstanceHealth>, GroupError>;

    /// Set the group's capacity.
    async fn update_capacity(&self, id: &GroupId, capacity: Capacity) -> Result<(), GroupError> {
        self.update_group(id, &GroupUpdate::resize(capacity)).await
    }

    /// Set the group's display name.
    async fn rename(&self, id: &GroupId, name: &str) -> Result<(), GroupError> {
        self.update_group(id, &GroupUpdate::rename(name)).await
    }
}

/// Errors from group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("elastigroup not found: {0}")]
    NotFound(String),

    #[error("invalid group update: {0}")]
    InvalidUpdate(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("provider error: {0}")]
    Provider(String),
}
