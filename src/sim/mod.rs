// ABOUTME: In-memory cloud implementing every collaborator trait.
// ABOUTME: Drives tests and `cutover run`; records mutations and injects one-shot failures.

mod fixture;

pub use fixture::{CloudFixture, GroupFixture, ListenerFixture};

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::cloud::{
    AccountContext, ElasticGroup, GroupError, GroupOps, GroupUpdate, HealthStatus, Instance,
    InstanceHealth, InstanceInventory, InstanceState, InventoryError, ListenerError,
    ListenerForwardingRule, ListenerOps,
};
use crate::task::DEFAULT_REGION;
use crate::types::{GroupId, InstanceId, ListenerArn, TargetGroupArn};

/// A collaborator call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CloudOp {
    GetGroup,
    ListGroups,
    GetRawConfig,
    UpdateGroup,
    ListInstanceHealth,
    DescribeListener,
    SetForwardingTarget,
    ListInstances,
}

/// A mutation applied to the simulated cloud, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCall {
    UpdateGroup {
        group: GroupId,
        update: GroupUpdate,
    },
    SetForwardingTarget {
        listener: ListenerArn,
        target_group: TargetGroupArn,
    },
}

impl CloudCall {
    /// The group this call touched, if any.
    pub fn group(&self) -> Option<&GroupId> {
        match self {
            CloudCall::UpdateGroup { group, .. } => Some(group),
            CloudCall::SetForwardingTarget { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Fault {
    Throttled,
    Provider(String),
}

#[derive(Debug)]
struct SimInstance {
    id: InstanceId,
    private_ip: String,
    polls_until_healthy: u32,
}

#[derive(Debug)]
struct SimGroup {
    group: ElasticGroup,
    instances: Vec<SimInstance>,
    warmup_polls: u32,
    never_healthy: bool,
}

#[derive(Debug)]
struct SimState {
    region: String,
    groups: BTreeMap<GroupId, SimGroup>,
    listeners: BTreeMap<ListenerArn, TargetGroupArn>,
    target_groups: BTreeSet<TargetGroupArn>,
    faults: BTreeMap<CloudOp, Fault>,
    journal: Vec<CloudCall>,
    launched: u32,
}

impl SimState {
    fn take_fault(&mut self, op: CloudOp) -> Option<Fault> {
        self.faults.remove(&op)
    }

    /// Launch or terminate instances until the group matches its target.
    fn reconcile(&mut self, id: &GroupId) {
        let Some(group) = self.groups.get_mut(id) else {
            return;
        };
        let target = group.group.capacity.target as usize;
        if group.instances.len() > target {
            group.instances.truncate(target);
            return;
        }
        while group.instances.len() < target {
            self.launched += 1;
            let n = self.launched;
            group.instances.push(SimInstance {
                id: InstanceId::new(format!("i-{n:08x}")),
                private_ip: format!("10.0.{}.{}", n / 256, n % 256),
                polls_until_healthy: group.warmup_polls,
            });
        }
    }

    fn group(&self, id: &GroupId) -> Result<&SimGroup, GroupError> {
        self.groups
            .get(id)
            .ok_or_else(|| GroupError::NotFound(id.to_string()))
    }
}

fn group_fault(fault: Fault) -> GroupError {
    match fault {
        Fault::Throttled => GroupError::Throttled("rate exceeded".to_string()),
        Fault::Provider(message) => GroupError::Provider(message),
    }
}

fn listener_fault(fault: Fault) -> ListenerError {
    match fault {
        Fault::Throttled => ListenerError::Provider("rate exceeded".to_string()),
        Fault::Provider(message) => ListenerError::Provider(message),
    }
}

fn inventory_fault(fault: Fault) -> InventoryError {
    match fault {
        Fault::Throttled => InventoryError::Provider("rate exceeded".to_string()),
        Fault::Provider(message) => InventoryError::Provider(message),
    }
}

/// Simulated compute provider and load balancer.
///
/// Groups launch instances to match their target capacity. New instances stay
/// unhealthy for the group's warm-up poll count; instances present when the
/// group is added are healthy from the start.
#[derive(Debug)]
pub struct SimulatedCloud {
    state: Mutex<SimState>,
}

impl Default for SimulatedCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCloud {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                region: DEFAULT_REGION.to_string(),
                groups: BTreeMap::new(),
                listeners: BTreeMap::new(),
                target_groups: BTreeSet::new(),
                faults: BTreeMap::new(),
                journal: Vec::new(),
                launched: 0,
            }),
        }
    }

    /// Build a cloud from a fixture.
    pub fn from_fixture(fixture: &CloudFixture) -> Self {
        let mut cloud = Self::new().with_region(&fixture.region);
        for g in &fixture.groups {
            cloud = cloud.with_group(g.group());
            if g.warmup_polls > 0 {
                cloud = cloud.with_warmup(g.id.as_str(), g.warmup_polls);
            }
            if g.never_healthy {
                cloud = cloud.never_healthy(g.id.as_str());
            }
        }
        for l in &fixture.listeners {
            cloud = cloud.with_listener(l.listener_arn.as_str(), l.target_group_arn.as_str());
        }
        for tg in &fixture.target_groups {
            cloud = cloud.with_target_group(tg.as_str());
        }
        cloud
    }

    pub fn with_region(self, region: &str) -> Self {
        self.state.lock().region = region.to_string();
        self
    }

    /// Add a group with healthy instances matching its target capacity.
    pub fn with_group(self, group: ElasticGroup) -> Self {
        {
            let mut state = self.state.lock();
            let id = group.id.clone();
            state.groups.insert(
                id.clone(),
                SimGroup {
                    group,
                    instances: Vec::new(),
                    warmup_polls: 0,
                    never_healthy: false,
                },
            );
            state.reconcile(&id);
        }
        self
    }

    /// Instances launched from now on report unhealthy for `polls` health polls.
    pub fn with_warmup(self, group: &str, polls: u32) -> Self {
        if let Some(g) = self.state.lock().groups.get_mut(&GroupId::new(group)) {
            g.warmup_polls = polls;
        }
        self
    }

    /// Instances of `group` never report healthy.
    pub fn never_healthy(self, group: &str) -> Self {
        if let Some(g) = self.state.lock().groups.get_mut(&GroupId::new(group)) {
            g.never_healthy = true;
        }
        self
    }

    /// Add a listener forwarding to `target_group`, registering the target group.
    pub fn with_listener(self, listener: &str, target_group: &str) -> Self {
        {
            let mut state = self.state.lock();
            state
                .listeners
                .insert(ListenerArn::new(listener), TargetGroupArn::new(target_group));
            state.target_groups.insert(TargetGroupArn::new(target_group));
        }
        self
    }

    pub fn with_target_group(self, target_group: &str) -> Self {
        self.state
            .lock()
            .target_groups
            .insert(TargetGroupArn::new(target_group));
        self
    }

    /// Make the next call of `op` fail with a provider error.
    pub fn fail_next(&self, op: CloudOp, message: impl Into<String>) {
        self.state
            .lock()
            .faults
            .insert(op, Fault::Provider(message.into()));
    }

    /// Make the next call of `op` fail as throttled.
    pub fn throttle_next(&self, op: CloudOp) {
        self.state.lock().faults.insert(op, Fault::Throttled);
    }

    /// Mutations applied so far, oldest first.
    pub fn journal(&self) -> Vec<CloudCall> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Current state of a group.
    pub fn group(&self, id: &str) -> Option<ElasticGroup> {
        self.state
            .lock()
            .groups
            .get(&GroupId::new(id))
            .map(|g| g.group.clone())
    }

    /// Number of instances a group currently runs.
    pub fn instance_count(&self, id: &str) -> usize {
        self.state
            .lock()
            .groups
            .get(&GroupId::new(id))
            .map_or(0, |g| g.instances.len())
    }

    /// Target group a listener currently forwards to.
    pub fn listener_target(&self, listener: &str) -> Option<TargetGroupArn> {
        self.state
            .lock()
            .listeners
            .get(&ListenerArn::new(listener))
            .cloned()
    }

    /// Repoint a listener out of band, as an operator would.
    pub fn set_listener_target(&self, listener: &str, target_group: &str) {
        let mut state = self.state.lock();
        state
            .listeners
            .insert(ListenerArn::new(listener), TargetGroupArn::new(target_group));
        state.target_groups.insert(TargetGroupArn::new(target_group));
    }

    /// Capture the current state as a fixture.
    pub fn snapshot(&self) -> CloudFixture {
        let state = self.state.lock();
        let forwarded: BTreeSet<&TargetGroupArn> = state.listeners.values().collect();
        CloudFixture {
            region: state.region.clone(),
            groups: state
                .groups
                .values()
                .map(|g| GroupFixture {
                    id: g.group.id.clone(),
                    name: g.group.name.clone(),
                    capacity: g.group.capacity,
                    warmup_polls: g.warmup_polls,
                    never_healthy: g.never_healthy,
                })
                .collect(),
            listeners: state
                .listeners
                .iter()
                .map(|(listener, target)| ListenerFixture {
                    listener_arn: listener.clone(),
                    target_group_arn: target.clone(),
                })
                .collect(),
            target_groups: state
                .target_groups
                .iter()
                .filter(|tg| !forwarded.contains(tg))
                .cloned()
                .collect(),
        }
    }
}

#[async_trait]
impl GroupOps for SimulatedCloud {
    async fn get_group(&self, id: &GroupId) -> Result<ElasticGroup, GroupError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::GetGroup) {
            return Err(group_fault(fault));
        }
        Ok(state.group(id)?.group.clone())
    }

    async fn list_groups(
        &self,
        _account: &AccountContext,
    ) -> Result<Vec<ElasticGroup>, GroupError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::ListGroups) {
            return Err(group_fault(fault));
        }
        Ok(state.groups.values().map(|g| g.group.clone()).collect())
    }

    async fn get_raw_config(&self, id: &GroupId) -> Result<serde_json::Value, GroupError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::GetRawConfig) {
            return Err(group_fault(fault));
        }
        let region = state.region.clone();
        let g = &state.group(id)?.group;
        Ok(json!({
            "group": {
                "id": g.id,
                "name": g.name,
                "region": region,
                "capacity": g.capacity,
            }
        }))
    }

    async fn update_group(&self, id: &GroupId, update: &GroupUpdate) -> Result<(), GroupError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::UpdateGroup) {
            return Err(group_fault(fault));
        }
        if update.is_empty() {
            return Err(GroupError::InvalidUpdate("empty update".to_string()));
        }
        if let Some(capacity) = update.capacity {
            capacity
                .validate()
                .map_err(|e| GroupError::InvalidUpdate(e.to_string()))?;
        }

        let group = state
            .groups
            .get_mut(id)
            .ok_or_else(|| GroupError::NotFound(id.to_string()))?;
        if let Some(name) = &update.name {
            group.group.name = name.clone();
        }
        if let Some(capacity) = update.capacity {
            group.group.capacity = capacity;
        }
        state.reconcile(id);
        state.journal.push(CloudCall::UpdateGroup {
            group: id.clone(),
            update: update.clone(),
        });
        Ok(())
    }

    async fn list_instance_health(
        &self,
        id: &GroupId,
    ) -> Result<Vec<InstanceHealth>, GroupError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::ListInstanceHealth) {
            return Err(group_fault(fault));
        }
        let group = state
            .groups
            .get_mut(id)
            .ok_or_else(|| GroupError::NotFound(id.to_string()))?;
        let never_healthy = group.never_healthy;
        Ok(group
            .instances
            .iter_mut()
            .map(|instance| {
                let health_status = if never_healthy {
                    HealthStatus::Unhealthy
                } else if instance.polls_until_healthy > 0 {
                    instance.polls_until_healthy -= 1;
                    HealthStatus::Unhealthy
                } else {
                    HealthStatus::Healthy
                };
                InstanceHealth {
                    instance_id: instance.id.clone(),
                    health_status,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ListenerOps for SimulatedCloud {
    async fn describe_listener(
        &self,
        listener: &ListenerArn,
    ) -> Result<ListenerForwardingRule, ListenerError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::DescribeListener) {
            return Err(listener_fault(fault));
        }
        let target = state
            .listeners
            .get(listener)
            .ok_or_else(|| ListenerError::NotFound(listener.to_string()))?;
        Ok(ListenerForwardingRule {
            listener_arn: listener.clone(),
            target_group_arn: target.clone(),
        })
    }

    async fn set_forwarding_target(
        &self,
        listener: &ListenerArn,
        target_group: &TargetGroupArn,
    ) -> Result<(), ListenerError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::SetForwardingTarget) {
            return Err(listener_fault(fault));
        }
        if !state.target_groups.contains(target_group) {
            return Err(ListenerError::TargetGroupNotFound(target_group.to_string()));
        }
        let current = state
            .listeners
            .get_mut(listener)
            .ok_or_else(|| ListenerError::NotFound(listener.to_string()))?;
        *current = target_group.clone();
        state.journal.push(CloudCall::SetForwardingTarget {
            listener: listener.clone(),
            target_group: target_group.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl InstanceInventory for SimulatedCloud {
    async fn list_instances_by_ids(
        &self,
        region: &str,
        ids: &[InstanceId],
    ) -> Result<Vec<Instance>, InventoryError> {
        let mut state = self.state.lock();
        if let Some(fault) = state.take_fault(CloudOp::ListInstances) {
            return Err(inventory_fault(fault));
        }
        if region != state.region {
            return Err(InventoryError::UnknownRegion(region.to_string()));
        }
        let wanted: BTreeSet<&InstanceId> = ids.iter().collect();
        Ok(state
            .groups
            .values()
            .flat_map(|g| g.instances.iter())
            .filter(|i| wanted.contains(&i.id))
            .map(|i| Instance {
                instance_id: i.id.clone(),
                region: region.to_string(),
                state: InstanceState::Running,
                private_ip: Some(i.private_ip.clone()),
                public_dns: None,
            })
            .collect())
    }
}
