// ABOUTME: Cloud error types with SNAFU pattern.
// ABOUTME: Unifies group, listener, and inventory errors for programmatic handling.

use snafu::Snafu;

use super::group::GroupError;
use super::inventory::InventoryError;
use super::listener::ListenerError;

/// Unified error for every collaborator call made by a protocol.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CloudError {
    #[snafu(display("elastigroup request failed: {source}"))]
    Group { source: GroupError },

    #[snafu(display("load balancer request failed: {source}"))]
    Listener { source: ListenerError },

    #[snafu(display("instance inventory request failed: {source}"))]
    Inventory { source: InventoryError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudErrorKind {
    /// The referenced group, listener, or target group does not exist.
    NotFound,
    /// The provider rejected the request as malformed.
    InvalidRequest,
    /// Rate limiting; retrying the protocol later is safe.
    Throttled,
    /// Any other provider-side or transport failure.
    Provider,
}

impl CloudError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> CloudErrorKind {
        match self {
            CloudError::Group { source } => match source {
                GroupError::NotFound(_) => CloudErrorKind::NotFound,
                GroupError::InvalidUpdate(_) => CloudErrorKind::InvalidRequest,
                GroupError::Throttled(_) => CloudErrorKind::Throttled,
                GroupError::Provider(_) => CloudErrorKind::Provider,
            },
            CloudError::Listener { source } => match source {
                ListenerError::NotFound(_) | ListenerError::TargetGroupNotFound(_) => {
                    CloudErrorKind::NotFound
                }
                ListenerError::NoForwardAction(_) => CloudErrorKind::InvalidRequest,
                ListenerError::Provider(_) => CloudErrorKind::Provider,
            },
            CloudError::Inventory { source } => match source {
                InventoryError::UnknownRegion(_) => CloudErrorKind::InvalidRequest,
                InventoryError::Provider(_) => CloudErrorKind::Provider,
            },
        }
    }

    /// Whether a caller-level retry of the whole protocol may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            CloudErrorKind::Throttled | CloudErrorKind::Provider
        )
    }
}

impl From<GroupError> for CloudError {
    fn from(source: GroupError) -> Self {
        CloudError::Group { source }
    }
}

impl From<ListenerError> for CloudError {
    fn from(source: ListenerError) -> Self {
        CloudError::Listener { source }
    }
}

impl From<InventoryError> for CloudError {
    fn from(source: InventoryError) -> Self {
        CloudError::Inventory { source }
    }
}
