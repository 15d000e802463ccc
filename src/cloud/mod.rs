// ABOUTME: Composable capability traits for the cloud collaborators.
// ABOUTME: Defines GroupOps, ListenerOps, InstanceInventory and the CloudProvider bundle.

mod error;
mod group;
mod inventory;
mod listener;
mod shared_types;

pub use error::{CloudError, CloudErrorKind};
pub use group::{GroupError, GroupOps};
pub use inventory::{InstanceInventory, InventoryError};
pub use listener::{ListenerError, ListenerOps};
pub use shared_types::*;

/// Every capability a protocol may need.
///
/// Automatically implemented for any type implementing all the capability traits.
pub trait CloudProvider: GroupOps + ListenerOps + InstanceInventory {}

impl<T> CloudProvider for T where T: GroupOps + ListenerOps + InstanceInventory {}
