//! Governance policy and ballots

use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;

/// Highest accepted quorum percentage
pub const MAX_PERCENTAGE: u8 = 100;

/// Quorum percentages of a collective.
///
/// `super_majority` governs changes to the policy itself, `majority`
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub majority: u8,
    pub super_majority: u8,
}

impl Policy {
    pub fn new(majority: u8, super_majority: u8) -> Self {
        Self { majority, super_majority }
    }

    /// Both percentages within `[0, 100]`
    pub fn is_valid(&self) -> bool {
        self.majority <= MAX_PERCENTAGE && self.super_majority <= MAX_PERCENTAGE
    }
}

/// A ballot on a pending proposal. Immutable once cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    /// Resolution hash of the proposal this ballot targets
    pub hash: Hash,
    pub approve: bool,
}

impl Vote {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("vote")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.hash)
            .put_bool(self.approve)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_range() {
        assert!(Policy::new(0, 100).is_valid());
        assert!(!Policy::new(101, 50).is_valid());
        assert!(!Policy::new(50, 200).is_valid());
    }

    #[test]
    fn test_vote_json_defaults_reasons() {
        let token = Token::new([7; 32]);
        let hash = Hash::of(b"proposal");
        let json = format!(
            r#"{{"epoch":3,"author":"{}","hash":"{}","approve":true}}"#,
            token, hash
        );
        let vote: Vote = serde_json::from_str(&json).unwrap();
        assert_eq!(vote.reasons, "");
        assert_eq!(vote.hash, hash);
        assert!(vote.approve);
    }
}
