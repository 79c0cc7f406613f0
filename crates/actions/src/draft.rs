//! Draft, edit, release and stamp actions

use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;
use crate::policy::Policy;

/// Submits a draft, or a new version of one when `previous_draft` is set.
///
/// The content itself travels as media and is out of scope here; the draft
/// is addressed by the hash of its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    /// Collective signing the draft; `None` for individual or co-authored work
    pub on_behalf_of: Option<String>,
    #[serde(default)]
    pub co_authors: Vec<Token>,
    /// Majority among co-authors; defaults to unanimity
    pub policy: Option<Policy>,
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub content_type: String,
    pub content_hash: Hash,
    pub previous_draft: Option<Hash>,
    #[serde(default)]
    pub references: Vec<Hash>,
}

impl Draft {
    pub fn hashed(&self) -> Hash {
        self.content_hash
    }
}

/// Proposes an edit to an existing draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: Option<String>,
    #[serde(default)]
    pub co_authors: Vec<Token>,
    pub edited_draft: Hash,
    pub content_type: String,
    pub content_hash: Hash,
}

impl Edit {
    pub fn hashed(&self) -> Hash {
        self.content_hash
    }
}

/// Releases an approved draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDraft {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub content_hash: Hash,
}

impl ReleaseDraft {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("release_draft")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_hash(&self.content_hash)
            .finish()
    }
}

/// A reputation collective endorsing a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprintStamp {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    /// The reputation collective
    pub on_behalf_of: String,
    /// Hash of the released draft
    pub hash: Hash,
}

impl ImprintStamp {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("imprint_stamp")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.on_behalf_of)
            .put_hash(&self.hash)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_addressed_by_content() {
        let json = format!(
            r#"{{"epoch":1,"author":"{}","title":"t","content_type":"md","content_hash":"{}"}}"#,
            Token::new([1; 32]),
            Hash::of(b"content")
        );
        let draft: Draft = serde_json::from_str(&json).unwrap();
        assert_eq!(draft.hashed(), Hash::of(b"content"));
        assert!(draft.co_authors.is_empty());
        assert!(draft.policy.is_none());
        assert!(draft.previous_draft.is_none());
    }

    #[test]
    fn test_release_hash_is_not_content_hash() {
        let release = ReleaseDraft {
            epoch: 2,
            author: Token::new([1; 32]),
            reasons: String::new(),
            content_hash: Hash::of(b"content"),
        };
        assert_ne!(release.hashed(), release.content_hash);
    }
}
