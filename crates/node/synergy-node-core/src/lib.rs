//! Core node functionality for Synergy
//!
//! This crate provides what is needed to run a Synergy node around the
//! governance engine: configuration, lifecycle management and the intake
//! task that owns the governance state.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use synergy_common::Configuration;
use synergy_governance::{Hooks, State};
use tokio::task::JoinHandle;
use tracing::info;

mod config;
mod engine;
mod error;
mod state;

pub use config::{NodeConfig, DEFAULT_INTAKE_CAPACITY};
pub use engine::{Command, Engine, EngineHandle};
pub use error::{NodeError, NodeResult};
pub use state::{NodeState, StateManager};

/// The Node trait defines the core functionality of a Synergy node
#[async_trait]
pub trait Node {
    /// Initialize the node with the given configuration
    async fn initialize(config: NodeConfig) -> NodeResult<Self>
    where
        Self: Sized;

    /// Start the node's services
    async fn start(&mut self) -> NodeResult<()>;

    /// Stop the node's services
    async fn stop(&mut self) -> NodeResult<()>;

    /// Check if the node is currently running
    fn is_running(&self) -> bool;

    /// Get the current state of the node
    fn state(&self) -> NodeState;

    /// Get the node's configuration
    fn config(&self) -> &NodeConfig;
}

/// Node running a single governance engine
pub struct SynergyNode {
    config: NodeConfig,
    state_manager: Arc<StateManager>,
    /// Hooks handed to the engine on the next start
    hooks: Option<Hooks>,
    engine: Option<(EngineHandle, JoinHandle<State>)>,
}

impl SynergyNode {
    /// Create a new node with the specified configuration
    pub async fn new(config: NodeConfig) -> NodeResult<Self> {
        Self::initialize(config).await
    }

    /// Create a new node from a configuration file
    pub async fn from_config_file(path: impl AsRef<Path>) -> NodeResult<Self> {
        let config = NodeConfig::from_file(path)?;
        Self::new(config).await
    }

    /// Indexer and notifier for the engine; takes effect on the next start
    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = Some(hooks);
    }

    /// Handle to the running engine
    pub fn handle(&self) -> NodeResult<EngineHandle> {
        self.engine
            .as_ref()
            .map(|(handle, _)| handle.clone())
            .ok_or(NodeError::EngineStopped)
    }
}

#[async_trait]
impl Node for SynergyNode {
    async fn initialize(config: NodeConfig) -> NodeResult<Self> {
        config.validate()?;
        let state_manager = Arc::new(StateManager::new());
        state_manager.transition(NodeState::Initialized)?;
        Ok(Self {
            config,
            state_manager,
            hooks: None,
            engine: None,
        })
    }

    async fn start(&mut self) -> NodeResult<()> {
        self.state_manager.transition(NodeState::Starting)?;
        let hooks = self.hooks.take().unwrap_or_default();
        let state = State::with_hooks(self.config.governance.clone(), hooks);
        self.engine = Some(Engine::spawn(state, self.config.intake_capacity));
        self.state_manager.transition(NodeState::Running)?;
        info!(node_id = %self.config.node_id, "node started");
        Ok(())
    }

    async fn stop(&mut self) -> NodeResult<()> {
        self.state_manager.transition(NodeState::Stopping)?;
        if let Some((handle, task)) = self.engine.take() {
            handle.shutdown().await?;
            if let Err(e) = task.await {
                self.state_manager.transition(NodeState::Error)?;
                return Err(NodeError::Engine(e.to_string()));
            }
        }
        self.state_manager.transition(NodeState::Stopped)?;
        info!(node_id = %self.config.node_id, "node stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        matches!(self.state_manager.current_state(), NodeState::Running)
    }

    fn state(&self) -> NodeState {
        self.state_manager.current_state()
    }

    fn config(&self) -> &NodeConfig {
        &self.config
    }
}
