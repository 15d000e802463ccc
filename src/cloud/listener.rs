// ABOUTME: Load balancer listener operations trait.
// ABOUTME: Describe a listener's forwarding target and repoint it at another target group.

use super::shared_types::ListenerForwardingRule;
use crate::types::{ListenerArn, TargetGroupArn};
use async_trait::async_trait;

/// Load balancer listener operations.
#[async_trait]
pub trait ListenerOps: Send + Sync {
    /// Current default forwarding rule of a listener.
    async fn describe_listener(
        &self,
        listener: &ListenerArn,
    ) -> Result<ListenerForwardingRule, ListenerError>;

    /// Point the listener's default forward action at `target_group`.
    async fn set_forwarding_target(
        &self,
        listener: &ListenerArn,
        target_group: &TargetGroupArn,
    ) -> Result<(), ListenerError>;
}

/// Errors from listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("listener not found: {0}")]
    NotFound(String),

    #[error("listener has no default forward action: {0}")]
    NoForwardAction(String),

    #[error("target group not found: {0}")]
    TargetGroupNotFound(String),

    #[error("provider error: {0}")]
    Provider(String),
}
