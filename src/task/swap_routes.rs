// ABOUTME: Swap-routes protocol: the blue/green cutover and its mirror-image rollback.
// ABOUTME: Renames groups, swaps the prod and stage listeners, and resizes the losing group.

use std::time::Duration;

use crate::cloud::{CloudProvider, ElasticGroup, ListenerOps};
use crate::log_sink::{ExecutionLog, UnitStatus};
use crate::types::Capacity;

use super::context::TaskContext;
use super::error::TaskError;
use super::mutator::{DOWNSCALE, Resize, UPSCALE, fail, rename, resize_and_wait};
use super::params::SwapRoutesParameters;
use super::result::{ListenerOutcome, SwapRoutesResponse};

const RENAME_UNIT: &str = "Rename Elastigroups";
const SWAP_UNIT: &str = "Swap Routes";

pub(crate) async fn run<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: SwapRoutesParameters,
) -> Result<SwapRoutesResponse, TaskError> {
    let timeout = ctx.timeout(params.steady_state_timeout);
    if params.is_rollback {
        rollback(ctx, &params, timeout).await
    } else {
        forward(ctx, &params, timeout).await
    }
}

/// Rename, swap listeners, then optionally shrink the old group to zero.
async fn forward<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: &SwapRoutesParameters,
    timeout: Duration,
) -> Result<SwapRoutesResponse, TaskError> {
    let prod_name = params.group_name_prefix.prod_name();
    let stage_name = params.group_name_prefix.stage_name();
    let new_group = params.new_group.as_ref();
    let old_group = params.old_group.as_ref();

    let rename_log = ctx.log.unit(RENAME_UNIT);
    rename(ctx, &rename_log, new_group, &prod_name)
        .await
        .map_err(|e| fail(&rename_log, e))?;
    rename(ctx, &rename_log, old_group, &stage_name)
        .await
        .map_err(|e| fail(&rename_log, e))?;
    rename_log.close(UnitStatus::Success);

    let swap_log = ctx.log.unit(SWAP_UNIT);
    let listener = cut_over(ctx, &swap_log, params)
        .await
        .map_err(|e| fail(&swap_log, e))?;
    swap_log.close(UnitStatus::Success);

    if params.downsize_old_group {
        let zeroed = old_group.map(|g| Resize::to(g, Capacity::zero()));
        resize_and_wait(ctx, zeroed, timeout, DOWNSCALE).await?;
    } else if let Some(old) = old_group {
        ctx.log.info(format!(
            "Leaving old Elastigroup: [{}] running behind the stage listener",
            old.id
        ));
    }

    Ok(SwapRoutesResponse {
        prod_group_name: new_group.map(|_| prod_name),
        stage_group_name: old_group.map(|_| stage_name),
        listener,
    })
}

/// Undo `forward` in reverse: restore the old group, swap back, retire the new group.
async fn rollback<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    params: &SwapRoutesParameters,
    timeout: Duration,
) -> Result<SwapRoutesResponse, TaskError> {
    let prod_name = params.group_name_prefix.prod_name();
    let stage_name = params.group_name_prefix.stage_name();
    let new_group = params.new_group.as_ref();
    let old_group = params.old_group.as_ref();

    // The captured pre-swap capacity is authoritative; the live value is not consulted.
    resize_and_wait(ctx, old_group.map(Resize::configured), timeout, UPSCALE).await?;
    rename_in_unit(ctx, old_group, &prod_name).await?;

    let swap_log = ctx.log.unit(SWAP_UNIT);
    let listener = restore_routes(ctx, &swap_log, params)
        .await
        .map_err(|e| fail(&swap_log, e))?;
    swap_log.close(UnitStatus::Success);

    let zeroed = new_group.map(|g| Resize::to(g, Capacity::zero()));
    resize_and_wait(ctx, zeroed, timeout, DOWNSCALE).await?;
    rename_in_unit(ctx, new_group, &stage_name).await?;

    Ok(SwapRoutesResponse {
        prod_group_name: old_group.map(|_| prod_name),
        stage_group_name: new_group.map(|_| stage_name),
        listener,
    })
}

/// Rename one group under its own rename unit, closed whatever the outcome.
async fn rename_in_unit<C: CloudProvider + ?Sized>(
    ctx: &TaskContext<'_, C>,
    group: Option<&ElasticGroup>,
    name: &str,
) -> Result<(), TaskError> {
    let log = ctx.log.unit(RENAME_UNIT);
    rename(ctx, &log, group, name)
        .await
        .map_err(|e| fail(&log, e))?;
    log.close(UnitStatus::Success);
    Ok(())
}

/// Point prod at the new group's target group and stage at prod's previous target.
async fn cut_over<L: ListenerOps + ?Sized>(
    ctx: &TaskContext<'_, L>,
    log: &ExecutionLog,
    params: &SwapRoutesParameters,
) -> Result<ListenerOutcome, TaskError> {
    let new_target = &params.target_group_arn_for_new_group;
    let prod = ctx.cloud.describe_listener(&params.prod_listener_arn).await?;

    if &prod.target_group_arn == new_target {
        log.info(format!(
            "Prod listener: [{}] already forwards to target group: [{}], nothing to swap",
            prod.listener_arn, new_target
        ));
        return Ok(ListenerOutcome::Unchanged);
    }

    ctx.checkpoint(SWAP_UNIT)?;
    log.info(format!(
        "Prod listener: [{}] forwards to target group: [{}]",
        prod.listener_arn, prod.target_group_arn
    ));
    log.info(format!(
        "Updating prod listener: [{}] to forward to target group: [{}]",
        prod.listener_arn, new_target
    ));
    ctx.cloud
        .set_forwarding_target(&params.prod_listener_arn, new_target)
        .await?;
    log.info(format!(
        "Updated prod listener: [{}] to forward to target group: [{}]",
        prod.listener_arn, new_target
    ));
    log.info(format!(
        "Updating stage listener: [{}] to forward to target group: [{}]",
        params.stage_listener_arn, prod.target_group_arn
    ));
    ctx.cloud
        .set_forwarding_target(&params.stage_listener_arn, &prod.target_group_arn)
        .await?;
    log.info(format!(
        "Updated stage listener: [{}] to forward to target group: [{}]",
        params.stage_listener_arn, prod.target_group_arn
    ));
    tracing::info!(
        prod = %params.prod_listener_arn,
        stage = %params.stage_listener_arn,
        target_group = %new_target,
        "listeners swapped"
    );
    Ok(ListenerOutcome::Swapped)
}

/// Swap the listeners back, but only while prod still forwards to the new group.
async fn restore_routes<L: ListenerOps + ?Sized>(
    ctx: &TaskContext<'_, L>,
    log: &ExecutionLog,
    params: &SwapRoutesParameters,
) -> Result<ListenerOutcome, TaskError> {
    let new_target = &params.target_group_arn_for_new_group;
    let prod = ctx.cloud.describe_listener(&params.prod_listener_arn).await?;

    if &prod.target_group_arn != new_target {
        log.info(format!(
            "Prod listener: [{}] forwards to target group: [{}], not to the new Elastigroup's target group: [{}]. Listeners left as they are",
            prod.listener_arn, prod.target_group_arn, new_target
        ));
        return Ok(ListenerOutcome::Unchanged);
    }

    let stage = ctx
        .cloud
        .describe_listener(&params.stage_listener_arn)
        .await?;
    if &stage.target_group_arn == new_target {
        log.warn(format!(
            "Stage listener: [{}] also forwards to target group: [{}]; no previous target to restore",
            stage.listener_arn, new_target
        ));
        return Ok(ListenerOutcome::Unchanged);
    }

    ctx.checkpoint(SWAP_UNIT)?;
    log.info(format!(
        "Restoring prod listener: [{}] to forward to target group: [{}]",
        prod.listener_arn, stage.target_group_arn
    ));
    ctx.cloud
        .set_forwarding_target(&params.prod_listener_arn, &stage.target_group_arn)
        .await?;
    log.info(format!(
        "Restored prod listener: [{}] to forward to target group: [{}]",
        prod.listener_arn, stage.target_group_arn
    ));
    log.info(format!(
        "Restoring stage listener: [{}] to forward to target group: [{}]",
        stage.listener_arn, new_target
    ));
    ctx.cloud
        .set_forwarding_target(&params.stage_listener_arn, new_target)
        .await?;
    log.info(format!(
        "Restored stage listener: [{}] to forward to target group: [{}]",
        stage.listener_arn, new_target
    ));
    tracing::info!(
        prod = %params.prod_listener_arn,
        stage = %params.stage_listener_arn,
        target_group = %stage.target_group_arn,
        "listeners swapped back"
    );
    Ok(ListenerOutcome::Swapped)
}
