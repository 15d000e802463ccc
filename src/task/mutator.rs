// ABOUTME: Capacity and name mutations shared by every protocol.
// ABOUTME: Each resize is followed by a steady-state wait before the next step starts.

use std::time::Duration;

use crate::cloud::{ElasticGroup, GroupOps};
use crate::log_sink::{ExecutionLog, UnitStatus};
use crate::types::Capacity;

use super::context::TaskContext;
use super::error::TaskError;
use super::waiter::SteadyState;

/// Log units used for one resize: the request itself, then the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleStep {
    pub resize_unit: &'static str,
    pub wait_unit: &'static str,
}

pub const UPSCALE: ScaleStep = ScaleStep {
    resize_unit: "Upscale Elastigroup",
    wait_unit: "Upscale wait for steady state",
};

pub const DOWNSCALE: ScaleStep = ScaleStep {
    resize_unit: "Downscale Elastigroup",
    wait_unit: "Downscale wait for steady state",
};

/// A group and the capacity it should be set to.
#[derive(Debug, Clone, Copy)]
pub struct Resize<'g> {
    pub group: &'g ElasticGroup,
    pub capacity: Capacity,
}

impl<'g> Resize<'g> {
    /// Resize to the capacity carried by the group itself.
    pub fn configured(group: &'g ElasticGroup) -> Self {
        Self {
            group,
            capacity: group.capacity,
        }
    }

    pub fn to(group: &'g ElasticGroup, capacity: Capacity) -> Self {
        Self { group, capacity }
    }
}

/// Set a group's capacity and wait for it to settle.
///
/// An absent group is logged and skipped.
///
/// # Errors
///
/// Returns `TaskError::SteadyStateTimeout` if the group does not settle in time,
/// `TaskError::Cancelled` if cancellation interrupts the step, or the provider error.
pub(crate) async fn resize_and_wait<C: GroupOps + ?Sized>(
    ctx: &TaskContext<'_, C>,
    resize: Option<Resize<'_>>,
    timeout: Duration,
    step: ScaleStep,
) -> Result<(), TaskError> {
    let log = ctx.log.unit(step.resize_unit);
    let Some(Resize { group, capacity }) = resize else {
        log.info("No Elastigroup eligible for this step");
        log.close(UnitStatus::Success);
        return Ok(());
    };

    capacity
        .validate()
        .map_err(|source| TaskError::InvalidCapacity {
            group: group.id.clone(),
            source,
        })
        .map_err(|e| fail(&log, e))?;
    ctx.checkpoint(step.resize_unit)
        .map_err(|e| fail(&log, e))?;

    let current = ctx
        .cloud
        .get_group(&group.id)
        .await
        .map_err(|e| fail(&log, e.into()))?;
    log.info(format!(
        "Current state of Elastigroup: [{}], {}, Id: [{}]",
        current.name, current.capacity, current.id
    ));

    log.info(format!(
        "Sending request to update Elastigroup: [{}] with {}",
        group.id, capacity
    ));
    ctx.cloud
        .update_capacity(&group.id, capacity)
        .await
        .map_err(|e| fail(&log, e.into()))?;
    tracing::info!(group = %group.id, %capacity, "elastigroup capacity updated");
    log.info("Request sent to update Elastigroup");
    log.close(UnitStatus::Success);

    let wait_log = ctx.log.unit(step.wait_unit);
    let state = ctx
        .waiter
        .wait(
            ctx.cloud,
            &group.id,
            capacity.target,
            timeout,
            &ctx.cancel,
            &wait_log,
        )
        .await
        .map_err(|e| fail(&wait_log, e.into()))?;

    match state {
        SteadyState::Reached => {
            wait_log.info(format!("Elastigroup: [{}] reached steady state", group.id));
            wait_log.close(UnitStatus::Success);
            Ok(())
        }
        SteadyState::TimedOut => Err(fail(
            &wait_log,
            TaskError::SteadyStateTimeout {
                group: group.id.clone(),
                timeout,
            },
        )),
        SteadyState::Cancelled => Err(fail(
            &wait_log,
            TaskError::Cancelled(step.wait_unit.to_string()),
        )),
    }
}

/// Rename a group. An absent group is logged and skipped.
pub(crate) async fn rename<C: GroupOps + ?Sized>(
    ctx: &TaskContext<'_, C>,
    log: &ExecutionLog,
    group: Option<&ElasticGroup>,
    name: &str,
) -> Result<(), TaskError> {
    let Some(group) = group else {
        log.info(format!("No Elastigroup to rename to: [{name}]"));
        return Ok(());
    };

    ctx.checkpoint(log.unit_name())?;
    log.info(format!(
        "Renaming Elastigroup with id: [{}] to name: [{}]",
        group.id, name
    ));
    ctx.cloud.rename(&group.id, name).await?;
    tracing::info!(group = %group.id, name, "elastigroup renamed");
    log.info(format!(
        "Renamed Elastigroup with id: [{}] to name: [{}]",
        group.id, name
    ));
    Ok(())
}

/// Log an error into a unit, close it as failed, and hand the error back.
pub(crate) fn fail(log: &ExecutionLog, err: TaskError) -> TaskError {
    log.error(err.to_string());
    log.close(UnitStatus::Failure);
    err
}
