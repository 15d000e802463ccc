// ABOUTME: Integration tests for the task handler boundary.
// ABOUTME: Parameter mismatches, cancellation, panics, and log sink failures all end in a result.

mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cutover::cloud::{
    AccountContext, ElasticGroup, GroupError, GroupOps, GroupUpdate, Instance, InstanceHealth,
    InstanceInventory, InventoryError, ListenerError, ListenerForwardingRule, ListenerOps,
};
use cutover::log_sink::{LogLine, LogSink, MemorySink, SinkError, UnitStatus};
use cutover::task::{
    DeployParameters, Orchestrator, SyncCommand, SyncParameters, TaskHeader, TaskParameters,
    TaskStatus, cancellation,
};
use cutover::types::{Capacity, GroupId, InstanceId, ListenerArn, TargetGroupArn};
use support::{BLUE, GREEN, blue_green_cloud, fast_steady_state, group, orchestrator, swap_params};

fn grow_green_first() -> TaskParameters {
    DeployParameters {
        header: TaskHeader {
            activity_id: Some("act-1".to_string()),
            ..TaskHeader::default()
        },
        new_group: Some(group(GREEN, "shop__stage", Capacity::new(1, 3, 2))),
        old_group: Some(group(BLUE, "shop__prod", Capacity::zero())),
        resize_new_first: true,
        is_rollback: false,
        steady_state_timeout: Some(Duration::from_secs(3600)),
    }
    .into()
}

#[tokio::test(start_paused = true)]
async fn successful_run_is_narrated_under_protocol_unit() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud());

    let result = orchestrator.execute(grow_green_first()).await;

    assert_eq!(result.status(), TaskStatus::Success);
    let narration = sink.messages_for("Elastigroup Deploy");
    assert_eq!(
        narration.first().map(String::as_str),
        Some("Starting deploy task for activity: [act-1]")
    );
    assert_eq!(
        narration.last().map(String::as_str),
        Some("Completed deploy task successfully")
    );
    assert_eq!(
        sink.unit_status("Elastigroup Deploy"),
        Some(UnitStatus::Success)
    );
}

#[tokio::test]
async fn mismatched_parameters_fail_without_calls() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud());
    let params: TaskParameters = SyncParameters {
        header: TaskHeader::default(),
        command_type: SyncCommand::ListGroups,
        group_id: None,
    }
    .into();

    let result = orchestrator.execute_deploy(params).await;

    assert_eq!(result.status(), TaskStatus::Failure);
    assert_eq!(
        result.error_message(),
        Some("parameters of unrecognized class SyncParameters while executing deploy")
    );
    assert!(result.response().is_none());
    assert!(orchestrator.cloud().journal().is_empty());
    assert_eq!(
        sink.unit_status("Elastigroup Deploy"),
        Some(UnitStatus::Failure)
    );
}

#[tokio::test]
async fn matching_entry_point_runs_its_protocol() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator.execute_swap_routes(swap_params(false).into()).await;

    assert!(result.is_success());
}

#[tokio::test(start_paused = true)]
async fn cancellation_before_start_makes_no_changes() {
    let (handle, signal) = cancellation();
    handle.cancel();
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());
    let orchestrator = orchestrator.with_cancel_signal(signal);

    let result = orchestrator.execute(swap_params(true).into()).await;

    assert_eq!(
        result.error_message(),
        Some("cancelled at step: Rename Elastigroups")
    );
    assert!(orchestrator.cloud().journal().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_steady_state_wait() {
    let (handle, signal) = cancellation();
    let (orchestrator, sink) = orchestrator(blue_green_cloud().never_healthy(GREEN));
    let orchestrator = orchestrator.with_cancel_signal(signal);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        handle.cancel();
    });
    let start = tokio::time::Instant::now();
    let result = orchestrator.execute(grow_green_first()).await;
    canceller.await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(
        result.error_message(),
        Some("cancelled at step: Upscale wait for steady state")
    );
    // The old group was never touched.
    assert_eq!(orchestrator.cloud().journal().len(), 1);
    assert_eq!(
        orchestrator.cloud().group(BLUE).unwrap().capacity,
        support::blue_capacity()
    );
    assert_eq!(
        sink.unit_status("Upscale wait for steady state"),
        Some(UnitStatus::Failure)
    );
}

struct BrokenSink;

impl LogSink for BrokenSink {
    fn append(&self, _unit: &str, _line: &LogLine) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("sink offline".to_string()))
    }

    fn close_unit(&self, _unit: &str, _status: UnitStatus) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("sink offline".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn log_sink_failure_does_not_change_outcome() {
    support::init_tracing();
    let orchestrator = Orchestrator::new(blue_green_cloud(), Arc::new(BrokenSink))
        .with_steady_state(&fast_steady_state());

    let result = orchestrator.execute(swap_params(true).into()).await;

    assert!(result.is_success());
    assert!(orchestrator.cloud().group(BLUE).unwrap().capacity.is_zero());
}

/// A provider whose group lookups panic.
struct PanickingCloud;

#[async_trait]
impl GroupOps for PanickingCloud {
    async fn get_group(&self, _id: &GroupId) -> Result<ElasticGroup, GroupError> {
        panic!("provider exploded");
    }

    async fn list_groups(
        &self,
        _account: &AccountContext,
    ) -> Result<Vec<ElasticGroup>, GroupError> {
        Ok(Vec::new())
    }

    async fn get_raw_config(&self, id: &GroupId) -> Result<serde_json::Value, GroupError> {
        Err(GroupError::NotFound(id.to_string()))
    }

    async fn update_group(&self, id: &GroupId, _update: &GroupUpdate) -> Result<(), GroupError> {
        Err(GroupError::NotFound(id.to_string()))
    }

    async fn list_instance_health(
        &self,
        _id: &GroupId,
    ) -> Result<Vec<InstanceHealth>, GroupError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ListenerOps for PanickingCloud {
    async fn describe_listener(
        &self,
        listener: &ListenerArn,
    ) -> Result<ListenerForwardingRule, ListenerError> {
        Err(ListenerError::NotFound(listener.to_string()))
    }

    async fn set_forwarding_target(
        &self,
        listener: &ListenerArn,
        _target_group: &TargetGroupArn,
    ) -> Result<(), ListenerError> {
        Err(ListenerError::NotFound(listener.to_string()))
    }
}

#[async_trait]
impl InstanceInventory for PanickingCloud {
    async fn list_instances_by_ids(
        &self,
        _region: &str,
        _ids: &[InstanceId],
    ) -> Result<Vec<Instance>, InventoryError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn panic_in_protocol_becomes_failure() {
    support::init_tracing();
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Orchestrator::new(PanickingCloud, sink.clone());

    let result = orchestrator.execute(grow_green_first()).await;

    assert_eq!(result.status(), TaskStatus::Failure);
    assert_eq!(
        result.error_message(),
        Some("protocol panicked: provider exploded")
    );
    assert_eq!(
        sink.unit_status("Elastigroup Deploy"),
        Some(UnitStatus::Failure)
    );
}
