// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup plus a seeded blue/green simulated cloud and orchestrator builders.

// Each test binary only uses some of these helpers.
#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use cutover::cloud::ElasticGroup;
use cutover::config::SteadyStateConfig;
use cutover::log_sink::MemorySink;
use cutover::sim::SimulatedCloud;
use cutover::task::{Orchestrator, SwapRoutesParameters, TaskHeader, TaskParameters};
use cutover::types::{Capacity, GroupNamePrefix, ListenerArn, TargetGroupArn};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("cutover=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const BLUE: &str = "sig-blue";
pub const GREEN: &str = "sig-green";
pub const PROD_LISTENER: &str = "arn:listener/prod";
pub const STAGE_LISTENER: &str = "arn:listener/stage";
pub const BLUE_TG: &str = "arn:tg/blue";
pub const GREEN_TG: &str = "arn:tg/green";

/// Capacity blue runs with before any task touches it.
pub fn blue_capacity() -> Capacity {
    Capacity::new(1, 3, 2)
}

/// Blue serves prod behind the prod listener; green is empty behind stage.
pub fn blue_green_cloud() -> SimulatedCloud {
    SimulatedCloud::new()
        .with_group(ElasticGroup::new(BLUE, "shop__prod", blue_capacity()))
        .with_group(ElasticGroup::new(GREEN, "shop__stage", Capacity::zero()))
        .with_listener(PROD_LISTENER, BLUE_TG)
        .with_listener(STAGE_LISTENER, GREEN_TG)
}

/// One-second polls with a one-minute default timeout.
pub fn fast_steady_state() -> SteadyStateConfig {
    SteadyStateConfig {
        poll_interval: Duration::from_secs(1),
        default_timeout: Duration::from_secs(60),
    }
}

/// An orchestrator over `cloud` narrating into a memory sink.
pub fn orchestrator(cloud: SimulatedCloud) -> (Orchestrator<SimulatedCloud>, Arc<MemorySink>) {
    init_tracing();
    let sink = Arc::new(MemorySink::new());
    let orchestrator = Orchestrator::new(cloud, sink.clone()).with_steady_state(&fast_steady_state());
    (orchestrator, sink)
}

pub fn group(id: &str, name: &str, capacity: Capacity) -> ElasticGroup {
    ElasticGroup::new(id, name, capacity)
}

/// Forward swap of green (new, target 2) over blue (old), as captured before the swap.
pub fn swap_params(downsize_old_group: bool) -> SwapRoutesParameters {
    SwapRoutesParameters {
        header: TaskHeader {
            activity_id: Some("act-swap".to_string()),
            ..TaskHeader::default()
        },
        new_group: Some(group(GREEN, "shop__stage", Capacity::new(1, 3, 2))),
        old_group: Some(group(BLUE, "shop__prod", blue_capacity())),
        group_name_prefix: GroupNamePrefix::new("shop").unwrap(),
        prod_listener_arn: ListenerArn::new(PROD_LISTENER),
        stage_listener_arn: ListenerArn::new(STAGE_LISTENER),
        target_group_arn_for_new_group: TargetGroupArn::new(GREEN_TG),
        downsize_old_group,
        is_rollback: false,
        steady_state_timeout: None,
    }
}

/// The rollback of [`swap_params`].
pub fn swap_rollback_params(downsize_old_group: bool) -> TaskParameters {
    SwapRoutesParameters {
        is_rollback: true,
        ..swap_params(downsize_old_group)
    }
    .into()
}
