// ABOUTME: Integration tests for the deploy protocol.
// ABOUTME: Covers resize ordering, rollback ordering, absent groups, and failure stops.

mod support;

use std::time::Duration;

use cutover::cloud::{ElasticGroup, GroupUpdate};
use cutover::log_sink::UnitStatus;
use cutover::sim::{CloudCall, CloudOp, SimulatedCloud};
use cutover::task::{DeployParameters, TaskHeader, TaskParameters, TaskResponse};
use cutover::types::{Capacity, GroupId};
use support::{BLUE, GREEN, blue_green_cloud, group, orchestrator};

fn deploy(
    new_group: Option<ElasticGroup>,
    old_group: Option<ElasticGroup>,
    resize_new_first: bool,
    is_rollback: bool,
) -> TaskParameters {
    DeployParameters {
        header: TaskHeader::default(),
        new_group,
        old_group,
        resize_new_first,
        is_rollback,
        steady_state_timeout: None,
    }
    .into()
}

fn resized(id: &str, capacity: Capacity) -> CloudCall {
    CloudCall::UpdateGroup {
        group: GroupId::new(id),
        update: GroupUpdate::resize(capacity),
    }
}

fn green_target() -> Capacity {
    Capacity::new(1, 3, 2)
}

fn blue_target() -> Capacity {
    Capacity::new(0, 3, 1)
}

#[tokio::test(start_paused = true)]
async fn forward_resizes_old_group_first_by_default() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud().with_warmup(GREEN, 2));

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", green_target())),
            Some(group(BLUE, "shop__prod", blue_target())),
            false,
            false,
        ))
        .await;

    assert!(result.is_success(), "{:?}", result.error_message());
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![resized(BLUE, blue_target()), resized(GREEN, green_target())]
    );
    let Some(TaskResponse::Deploy(response)) = result.response() else {
        panic!("expected a deploy response");
    };
    assert_eq!(response.instances_added.len(), 2);
    assert_eq!(response.instances_existing.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resize_new_first_grows_new_group_before_shrinking_old() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", green_target())),
            Some(group(BLUE, "shop__prod", blue_target())),
            true,
            false,
        ))
        .await;

    assert!(result.is_success());
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![resized(GREEN, green_target()), resized(BLUE, blue_target())]
    );
    assert!(
        sink.messages_for("Upscale Elastigroup")
            .iter()
            .any(|m| m.contains(GREEN))
    );
    assert_eq!(
        sink.unit_status("Downscale wait for steady state"),
        Some(UnitStatus::Success)
    );
}

#[tokio::test(start_paused = true)]
async fn rollback_restores_old_group_first_even_when_new_first_requested() {
    let cloud = SimulatedCloud::new()
        .with_group(ElasticGroup::new(BLUE, "shop__prod", Capacity::zero()))
        .with_group(ElasticGroup::new(GREEN, "shop__stage", green_target()));
    let (orchestrator, sink) = orchestrator(cloud);

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", Capacity::zero())),
            Some(group(BLUE, "shop__prod", Capacity::new(1, 3, 2))),
            true,
            true,
        ))
        .await;

    assert!(result.is_success());
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![
            resized(BLUE, Capacity::new(1, 3, 2)),
            resized(GREEN, Capacity::zero())
        ]
    );
    assert!(
        sink.messages_for("Upscale Elastigroup")
            .iter()
            .any(|m| m.contains(BLUE))
    );
    assert!(
        sink.messages_for("Downscale Elastigroup")
            .iter()
            .any(|m| m.contains(GREEN))
    );
    assert_eq!(orchestrator.cloud().instance_count(GREEN), 0);
}

#[tokio::test(start_paused = true)]
async fn absent_old_group_is_skipped() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", green_target())),
            None,
            false,
            false,
        ))
        .await;

    assert!(result.is_success());
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![resized(GREEN, green_target())]
    );
    assert!(sink.contains("No Elastigroup eligible for this step"));
    let Some(TaskResponse::Deploy(response)) = result.response() else {
        panic!("expected a deploy response");
    };
    assert!(response.instances_existing.is_empty());
}

#[tokio::test(start_paused = true)]
async fn steady_state_timeout_fails_without_touching_the_next_group() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud().never_healthy(GREEN));

    let params = DeployParameters {
        header: TaskHeader::default(),
        new_group: Some(group(GREEN, "shop__stage", green_target())),
        old_group: Some(group(BLUE, "shop__prod", blue_target())),
        resize_new_first: true,
        is_rollback: false,
        steady_state_timeout: Some(Duration::from_secs(5)),
    };
    let start = tokio::time::Instant::now();
    let result = orchestrator.execute(params.into()).await;

    assert!(!result.is_success());
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    let message = result.error_message().unwrap();
    assert!(message.contains("timed out after 5s"), "{message}");
    assert!(message.contains(GREEN), "{message}");
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![resized(GREEN, green_target())]
    );
    assert_eq!(
        sink.unit_status("Upscale wait for steady state"),
        Some(UnitStatus::Failure)
    );
    assert_eq!(
        sink.unit_status("Elastigroup Deploy"),
        Some(UnitStatus::Failure)
    );
}

#[tokio::test(start_paused = true)]
async fn inconsistent_capacity_is_rejected_before_any_request() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", Capacity::new(3, 1, 2))),
            None,
            false,
            false,
        ))
        .await;

    assert!(!result.is_success());
    assert!(result.error_message().unwrap().contains("invalid capacity"));
    assert!(orchestrator.cloud().journal().is_empty());
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_reported() {
    let cloud = blue_green_cloud();
    cloud.throttle_next(CloudOp::UpdateGroup);
    let (orchestrator, _sink) = orchestrator(cloud);

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", green_target())),
            None,
            false,
            false,
        ))
        .await;

    assert!(!result.is_success());
    assert!(result.error_message().unwrap().contains("throttled"));
    assert!(orchestrator.cloud().journal().is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_first_deploy_brings_up_new_fleet_and_empties_old() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud().with_warmup(GREEN, 4));

    let result = orchestrator
        .execute(deploy(
            Some(group(GREEN, "shop__stage", Capacity::fixed(2))),
            Some(group(BLUE, "shop__prod", Capacity::zero())),
            true,
            false,
        ))
        .await;

    assert!(result.is_success(), "{:?}", result.error_message());
    let Some(TaskResponse::Deploy(response)) = result.response() else {
        panic!("expected a deploy response");
    };
    assert_eq!(response.instances_added.len(), 2);
    assert!(response.instances_existing.is_empty());
    let cloud = orchestrator.cloud();
    assert!(cloud.group(BLUE).unwrap().capacity.is_zero());
    assert_eq!(cloud.instance_count(BLUE), 0);
}

#[tokio::test(start_paused = true)]
async fn absent_new_group_rollback_restores_old_only() {
    let cloud =
        SimulatedCloud::new().with_group(ElasticGroup::new(BLUE, "shop__prod", Capacity::zero()));
    let (orchestrator, _sink) = orchestrator(cloud);

    let result = orchestrator
        .execute(deploy(
            None,
            Some(group(BLUE, "shop__prod", Capacity::new(1, 3, 2))),
            false,
            true,
        ))
        .await;

    assert!(result.is_success(), "{:?}", result.error_message());
    assert_eq!(
        orchestrator.cloud().journal(),
        vec![resized(BLUE, Capacity::new(1, 3, 2))]
    );
    let Some(TaskResponse::Deploy(response)) = result.response() else {
        panic!("expected a deploy response");
    };
    assert!(response.instances_added.is_empty());
    assert_eq!(response.instances_existing.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unbounded_timeout_still_waits_for_steady_state() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud().with_warmup(GREEN, 2));

    let params = DeployParameters {
        header: TaskHeader::default(),
        new_group: Some(group(GREEN, "shop__stage", green_target())),
        old_group: None,
        resize_new_first: true,
        is_rollback: false,
        steady_state_timeout: Some(Duration::from_secs(u64::MAX)),
    };
    let start = tokio::time::Instant::now();
    let result = orchestrator.execute(params.into()).await;

    assert!(result.is_success(), "{:?}", result.error_message());
    // Two unhealthy polls one second apart, healthy on the third.
    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert_eq!(orchestrator.cloud().instance_count(GREEN), 2);
}
