//! Member actions that never open a proposal

use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;

/// Registers a token as a protocol member under a unique handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signin {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub handle: String,
}

impl Signin {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("signin")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.handle)
            .finish()
    }
}

/// Reacts to any addressed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct React {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub hash: Hash,
    /// Index into the configured reaction set
    pub reaction: u8,
}

impl React {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("react")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.hash)
            .put_u8(self.reaction)
            .finish()
    }
}
