// ABOUTME: Resolves a group's current members into full instance descriptors.
// ABOUTME: Health records supply the ids; the inventory supplies the details.

use crate::cloud::{GroupOps, Instance, InstanceInventory};
use crate::types::{GroupId, InstanceId};

use super::context::TaskContext;
use super::error::TaskError;

/// Instances currently belonging to `group`, described in the task's region.
pub(crate) async fn group_instances<C: GroupOps + InstanceInventory + ?Sized>(
    ctx: &TaskContext<'_, C>,
    group: &GroupId,
) -> Result<Vec<Instance>, TaskError> {
    let ids: Vec<InstanceId> = ctx
        .cloud
        .list_instance_health(group)
        .await?
        .into_iter()
        .map(|h| h.instance_id)
        .collect();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let instances = ctx
        .cloud
        .list_instances_by_ids(&ctx.region, &ids)
        .await?;
    tracing::debug!(%group, count = instances.len(), "resolved group instances");
    Ok(instances)
}
