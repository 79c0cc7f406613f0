//! Node error types

use synergy_governance::GovernanceError;
use thiserror::Error;

use crate::state::NodeState;

/// Errors raised by the node and its intake engine
#[derive(Error, Debug)]
pub enum NodeError {
    /// Configuration, IO or other shared failure
    #[error(transparent)]
    Common(#[from] synergy_common::Error),

    /// The engine rejected an action
    #[error("Action rejected: {0}")]
    Governance(#[from] GovernanceError),

    /// Lifecycle transition not allowed from the current state
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: NodeState, to: NodeState },

    /// The intake engine is gone
    #[error("Engine is not running")]
    EngineStopped,

    /// The engine task failed
    #[error("Engine task failed: {0}")]
    Engine(String),
}

/// Result type for node operations
pub type NodeResult<T> = std::result::Result<T, NodeError>;

impl NodeError {
    /// Whether the error is an action rejected by governance rules, as
    /// opposed to a failure of the node itself
    pub fn is_rejection(&self) -> bool {
        matches!(self, NodeError::Governance(_))
    }
}
