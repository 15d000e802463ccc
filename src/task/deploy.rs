// ABOUTME: Deploy protocol: resize the new and old groups in policy order.
// ABOUTME: New-first only on forward runs that ask for it; old-first otherwise, including every rollback.

use crate::cloud::CloudProvider;

use super::context::TaskContext;
use super::error::TaskError;
use super::instances::group_instances;
use super::mutator::{DOWNSCALE, Resize, UPSCALE, resize_and_wait};
use super::params::DeployParameters;
use super::result::DeployResponse;

pub(crate) async fn run<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: DeployParameters,
) -> Result<DeployResponse, TaskError> {
    let timeout = ctx.timeout(params.steady_state_timeout);
    let new_group = params.new_group.as_ref();
    let old_group = params.old_group.as_ref();

    if params.resize_new_first && !params.is_rollback {
        ctx.log.info("Resizing the new Elastigroup before the old one");
        resize_and_wait(ctx, new_group.map(Resize::configured), timeout, UPSCALE).await?;
        resize_and_wait(ctx, old_group.map(Resize::configured), timeout, DOWNSCALE).await?;
    } else {
        // On rollback the old group is the one growing back.
        let (old_step, new_step) = if params.is_rollback {
            ctx.log.info("Rolling back: restoring the old Elastigroup first");
            (UPSCALE, DOWNSCALE)
        } else {
            ctx.log.info("Resizing the old Elastigroup before the new one");
            (DOWNSCALE, UPSCALE)
        };
        resize_and_wait(ctx, old_group.map(Resize::configured), timeout, old_step).await?;
        resize_and_wait(ctx, new_group.map(Resize::configured), timeout, new_step).await?;
    }

    let instances_added = match new_group {
        Some(group) => group_instances(ctx, &group.id).await?,
        None => Vec::new(),
    };
    let instances_existing = match old_group {
        Some(group) => group_instances(ctx, &group.id).await?,
        None => Vec::new(),
    };
    ctx.log.info(format!(
        "New Elastigroup has {} instance(s), old Elastigroup has {}",
        instances_added.len(),
        instances_existing.len()
    ));

    Ok(DeployResponse {
        instances_added,
        instances_existing,
    })
}
