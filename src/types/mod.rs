// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Identifiers carry their resource kind; capacities and name prefixes validate on construction.

mod capacity;
mod group_name;
mod id;

pub use capacity::{Capacity, CapacityError};
pub use group_name::{GroupNamePrefix, GroupNamePrefixError, PROD_SUFFIX, STAGE_SUFFIX};
pub use id::{
    GroupId, GroupKind, Id, InstanceId, InstanceKind, ListenerArn, ListenerKind, ResourceKind,
    TargetGroupArn, TargetGroupKind,
};
