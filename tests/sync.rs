// ABOUTME: Integration tests for the read-only sync protocol.
// ABOUTME: Group listing, raw configuration, instance listing, and unknown commands.

mod support;

use cutover::sim::CloudOp;
use cutover::task::{SyncCommand, SyncParameters, SyncResponse, TaskHeader, TaskParameters, TaskResponse};
use cutover::types::GroupId;
use support::{BLUE, GREEN, blue_green_cloud, orchestrator};

fn sync(command_type: SyncCommand, group_id: Option<&str>) -> TaskParameters {
    SyncParameters {
        header: TaskHeader::default(),
        command_type,
        group_id: group_id.map(GroupId::new),
    }
    .into()
}

fn sync_response(result: &cutover::task::TaskExecutionResult) -> &SyncResponse {
    match result.response() {
        Some(TaskResponse::Sync(response)) => response,
        other => panic!("expected a sync response, got {other:?}"),
    }
}

#[tokio::test]
async fn lists_groups() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator.execute(sync(SyncCommand::ListGroups, None)).await;

    assert!(result.is_success());
    let SyncResponse::Groups { groups } = sync_response(&result) else {
        panic!("expected groups");
    };
    let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec![BLUE, GREEN]);
    assert!(orchestrator.cloud().journal().is_empty());
}

#[tokio::test]
async fn fetches_raw_group_config() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(sync(SyncCommand::GetGroupConfig, Some(BLUE)))
        .await;

    let SyncResponse::GroupConfig { group_id, config } = sync_response(&result) else {
        panic!("expected group config");
    };
    assert_eq!(group_id.as_str(), BLUE);
    assert_eq!(config["group"]["name"], "shop__prod");
    assert_eq!(config["group"]["capacity"]["target"], 2);
}

#[tokio::test]
async fn lists_group_instances_in_task_region() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(sync(SyncCommand::ListGroupInstances, Some(BLUE)))
        .await;

    let SyncResponse::Instances { instances, .. } = sync_response(&result) else {
        panic!("expected instances");
    };
    assert_eq!(instances.len(), 2);
    assert!(instances.iter().all(|i| i.region == "us-east-1"));
    assert!(instances.iter().all(|i| i.private_ip.is_some()));
}

#[tokio::test]
async fn empty_group_has_no_instances() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());
    orchestrator.cloud().fail_next(CloudOp::ListInstances, "must not be called");

    let result = orchestrator
        .execute(sync(SyncCommand::ListGroupInstances, Some(GREEN)))
        .await;

    let SyncResponse::Instances { instances, .. } = sync_response(&result) else {
        panic!("expected instances");
    };
    assert!(instances.is_empty());
}

#[tokio::test]
async fn missing_group_id_fails() {
    let (orchestrator, _sink) = orchestrator(blue_green_cloud());

    let result = orchestrator.execute(sync(SyncCommand::GetGroupConfig, None)).await;

    assert_eq!(
        result.error_message(),
        Some("missing required parameter: group_id")
    );
}

#[tokio::test]
async fn unrecognized_command_fails() {
    let (orchestrator, sink) = orchestrator(blue_green_cloud());

    let result = orchestrator
        .execute(sync(SyncCommand::from("PURGE".to_string()), None))
        .await;

    assert!(!result.is_success());
    assert_eq!(
        result.error_message(),
        Some("unrecognized sync command: PURGE")
    );
    assert!(sink.contains("unrecognized sync command: PURGE"));
}
