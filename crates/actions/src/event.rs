//! Event actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;

/// Proposes an event organised by a collective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEvent {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub start_at: DateTime<Utc>,
    pub estimated_end: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub venue: String,
    pub open: bool,
    pub public: bool,
    pub manager_majority: u8,
    /// Empty means the members of the collective manage the event
    #[serde(default)]
    pub managers: Vec<Token>,
}

impl CreateEvent {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("create_event")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.on_behalf_of)
            .put_time(&self.start_at)
            .put_time(&self.estimated_end)
            .put_str(&self.description)
            .put_str(&self.venue)
            .put_bool(self.open)
            .put_bool(self.public)
            .put_u8(self.manager_majority)
            .put_tokens(&self.managers)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEvent {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    /// Hash of the event
    pub hash: Hash,
}

impl CancelEvent {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("cancel_event")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.hash)
            .finish()
    }
}

/// Changes an event. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
    pub start_at: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub open: Option<bool>,
    pub public: Option<bool>,
    pub manager_majority: Option<u8>,
    pub managers: Option<Vec<Token>>,
}

impl UpdateEvent {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("update_event")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.event_hash)
            .put_option(self.start_at.as_ref(), HashBuilder::put_time)
            .put_option(self.estimated_end.as_ref(), HashBuilder::put_time)
            .put_option(self.description.as_deref(), HashBuilder::put_str)
            .put_option(self.venue.as_deref(), HashBuilder::put_str)
            .put_option(self.open, HashBuilder::put_bool)
            .put_option(self.public, HashBuilder::put_bool)
            .put_option(self.manager_majority, HashBuilder::put_u8)
            .put_option(self.managers.as_deref(), HashBuilder::put_tokens)
            .finish()
    }
}

/// An attendee checking in to a live event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEvent {
    pub epoch: u64,
    pub author: Token,
    /// Token the managers encrypt their greeting to
    pub ephemeral_token: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
}

impl CheckinEvent {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("checkin_event")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_token(&self.ephemeral_token)
            .put_str(&self.reasons)
            .put_hash(&self.event_hash)
            .finish()
    }
}

/// A manager greeting a checked-in attendee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetCheckinEvent {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub event_hash: Hash,
    pub checked_in: Token,
    pub ephemeral_token: Token,
    /// Key agreement material, opaque to the engine
    #[serde(with = "hex::serde", default)]
    pub secret_key: Vec<u8>,
    #[serde(with = "hex::serde", default)]
    pub private_content: Vec<u8>,
}

impl GreetCheckinEvent {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("greet_checkin_event")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.event_hash)
            .put_token(&self.checked_in)
            .put_token(&self.ephemeral_token)
            .put_bytes(&self.secret_key)
            .put_bytes(&self.private_content)
            .finish()
    }
}
