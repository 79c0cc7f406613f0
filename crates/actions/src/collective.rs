//! Collective actions

use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;
use crate::policy::Policy;

/// Creates a named collective with the author as its sole member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollective {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub policy: Policy,
}

impl CreateCollective {
    /// Collectives are addressed by the hash of their name
    pub fn hashed(&self) -> Hash {
        Hash::of(self.name.as_bytes())
    }
}

/// Changes the description and/or policy of a collective. `None` fields
/// are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollective {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub description: Option<String>,
    pub majority: Option<u8>,
    pub super_majority: Option<u8>,
}

impl UpdateCollective {
    /// Whether the update touches the policy, which calls for a supermajority
    pub fn changes_policy(&self) -> bool {
        self.majority.is_some() || self.super_majority.is_some()
    }

    pub fn hashed(&self) -> Hash {
        HashBuilder::new("update_collective")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.on_behalf_of)
            .put_option(self.description.as_deref(), HashBuilder::put_str)
            .put_option(self.majority, HashBuilder::put_u8)
            .put_option(self.super_majority, HashBuilder::put_u8)
            .finish()
    }
}

/// Asks to join (`include`) or leave a collective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMembership {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub collective: String,
    pub include: bool,
}

impl RequestMembership {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("request_membership")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.collective)
            .put_bool(self.include)
            .finish()
    }
}

/// Removes a member from a collective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMember {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub member: Token,
}

impl RemoveMember {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("remove_member")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.on_behalf_of)
            .put_token(&self.member)
            .finish()
    }
}
