// ABOUTME: Traffic-shift (canary) protocol: grow only the new group.
// ABOUTME: No renames and no listener changes; weights are managed by the load-balancing layer.

use crate::cloud::CloudProvider;

use super::context::TaskContext;
use super::error::TaskError;
use super::instances::group_instances;
use super::mutator::{Resize, UPSCALE, resize_and_wait};
use super::params::TrafficShiftParameters;
use super::result::TrafficShiftResponse;

pub(crate) async fn run<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: TrafficShiftParameters,
) -> Result<TrafficShiftResponse, TaskError> {
    let new_group = params
        .new_group
        .as_ref()
        .ok_or(TaskError::MissingParameter("new_group"))?;
    let timeout = ctx.timeout(params.steady_state_timeout);

    resize_and_wait(ctx, Some(Resize::configured(new_group)), timeout, UPSCALE).await?;

    let instances_added = group_instances(ctx, &new_group.id).await?;
    let instances_existing = match params.old_group.as_ref() {
        Some(old) => group_instances(ctx, &old.id).await?,
        None => Vec::new(),
    };

    Ok(TrafficShiftResponse {
        instances_added,
        instances_existing,
    })
}
