// ABOUTME: Instance inventory trait.
// ABOUTME: Resolves instance ids from health records into full instance descriptors.

use super::shared_types::Instance;
use crate::types::InstanceId;
use async_trait::async_trait;

#[async_trait]
pub trait InstanceInventory: Send + Sync {
    /// Describe the given instances in `region`. Unknown ids are omitted.
    async fn list_instances_by_ids(
        &self,
        region: &str,
        ids: &[InstanceId],
    ) -> Result<Vec<Instance>, InventoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("provider error: {0}")]
    Provider(String),
}
