//! Node state management

use std::fmt;
use std::sync::RwLock;

use crate::error::{NodeError, NodeResult};

/// Possible states of a Synergy node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Node is created but not initialized
    #[default]
    Created,
    /// Node is initialized but not started
    Initialized,
    /// Node is starting up
    Starting,
    /// Node is running
    Running,
    /// Node is stopping
    Stopping,
    /// Node is stopped
    Stopped,
    /// Node is in error state
    Error,
}

impl NodeState {
    /// Whether the lifecycle may move from `self` to `next`
    pub fn can_transition(self, next: NodeState) -> bool {
        use NodeState::*;
        matches!(
            (self, next),
            (Created, Initialized)
                | (Initialized, Starting)
                | (Stopped, Starting)
                | (Starting, Running)
                | (Running, Stopping)
                | (Stopping, Stopped)
                | (_, Error)
        )
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Created => write!(f, "Created"),
            NodeState::Initialized => write!(f, "Initialized"),
            NodeState::Starting => write!(f, "Starting"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error => write!(f, "Error"),
        }
    }
}

/// Tracks the node lifecycle
#[derive(Debug, Default)]
pub struct StateManager {
    state: RwLock<NodeState>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> NodeState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Move to `next`, failing if the lifecycle does not allow it
    pub fn transition(&self, next: NodeState) -> NodeResult<()> {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.can_transition(next) {
            return Err(NodeError::InvalidTransition { from: *state, to: next });
        }
        tracing::debug!(from = %*state, to = %next, "node state transition");
        *state = next;
        Ok(())
    }
}
