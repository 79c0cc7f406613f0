//! Governance engine configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synergy_common::{Configuration, Error, Result};

/// Epochs a proposal stays open without reaching quorum: 30 days of
/// one-second epochs.
pub const DEFAULT_PROPOSAL_DEADLINE: u64 = 30 * 24 * 60 * 60;

/// Number of distinct reactions an object can receive
pub const DEFAULT_REACTIONS_COUNT: usize = 5;

/// Configuration of the governance engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Epochs after creation at which an unresolved proposal expires
    #[serde(default = "default_proposal_deadline")]
    pub proposal_deadline: u64,

    /// Wall-clock time of epoch zero
    #[serde(default = "default_genesis_time")]
    pub genesis_time: DateTime<Utc>,

    #[serde(default = "default_reactions_count")]
    pub reactions_count: usize,
}

fn default_proposal_deadline() -> u64 {
    DEFAULT_PROPOSAL_DEADLINE
}

fn default_genesis_time() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

fn default_reactions_count() -> usize {
    DEFAULT_REACTIONS_COUNT
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            proposal_deadline: default_proposal_deadline(),
            genesis_time: default_genesis_time(),
            reactions_count: default_reactions_count(),
        }
    }
}

impl Configuration for GovernanceConfig {
    fn validate(&self) -> Result<()> {
        if self.proposal_deadline == 0 {
            return Err(Error::validation("proposal_deadline must be positive"));
        }
        if self.reactions_count == 0 {
            return Err(Error::validation("reactions_count must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GovernanceConfig::default();
        assert_eq!(config.proposal_deadline, 2_592_000);
        assert_eq!(config.reactions_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = GovernanceConfig::from_str("proposal_deadline = 10\n").unwrap();
        assert_eq!(config.proposal_deadline, 10);
        assert_eq!(config.reactions_count, DEFAULT_REACTIONS_COUNT);
    }

    #[test]
    fn test_rejects_zero_deadline() {
        let config = GovernanceConfig {
            proposal_deadline: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
