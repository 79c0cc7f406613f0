//! Node configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use synergy_common::config::env_override;
use synergy_common::{Configuration, Error, Result};
use synergy_governance::GovernanceConfig;

/// Default size of the intake queue
pub const DEFAULT_INTAKE_CAPACITY: usize = 1024;

/// Node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node identifier
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Actions that may wait for the engine before senders block
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,

    /// Governance engine settings
    #[serde(default)]
    pub governance: GovernanceConfig,
}

fn default_node_id() -> String {
    "node-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_intake_capacity() -> usize {
    DEFAULT_INTAKE_CAPACITY
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            log_level: default_log_level(),
            intake_capacity: default_intake_capacity(),
            governance: GovernanceConfig::default(),
        }
    }
}

impl Configuration for NodeConfig {
    fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            return Err(Error::validation("Node ID cannot be empty"));
        }
        if self.intake_capacity == 0 {
            return Err(Error::validation("Intake capacity must be positive"));
        }
        self.governance.validate()
    }
}

impl NodeConfig {
    /// Load from `path` when given, otherwise start from defaults; then
    /// apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `SYNERGY_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(node_id) = env_override::<String>("SYNERGY_NODE_ID")? {
            self.node_id = node_id;
        }
        if let Some(log_level) = env_override::<String>("SYNERGY_LOG_LEVEL")? {
            self.log_level = log_level;
        }
        if let Some(deadline) = env_override::<u64>("SYNERGY_PROPOSAL_DEADLINE")? {
            self.governance.proposal_deadline = deadline;
        }
        if let Some(capacity) = env_override::<usize>("SYNERGY_INTAKE_CAPACITY")? {
            self.intake_capacity = capacity;
        }
        Ok(())
    }
}
