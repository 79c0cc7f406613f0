//! Board actions

use serde::{Deserialize, Serialize};
use synergy_crypto::{Hash, Token};

use crate::hashing::HashBuilder;

/// Proposes a new board under a collective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBoard {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub on_behalf_of: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Majority of the editors needed to pin or update the board
    pub pin_majority: u8,
}

impl CreateBoard {
    /// Boards are addressed by the hash of their name
    pub fn hashed(&self) -> Hash {
        Hash::of(self.name.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBoard {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub pin_majority: Option<u8>,
}

impl UpdateBoard {
    pub fn hashed(&self) -> Hash {
        HashBuilder::new("update_board")
            .put_u64(self.epoch)
            .put_token(&self.author)
            .put_str(&self.reasons)
            .put_str(&self.board)
            .put_option(self.description.as_deref(), HashBuilder::put_str)
            .put_option(self.keywords.as_deref(), HashBuilder::put_strs)
            .put_option(self.pin_majority, HashBuilder::put_u8)
            .finish()
    }
}

/// Pins (`pin == true`) or unpins a draft on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    pub draft: Hash,
    pub pin: bool,
}

impl Pin {
    /// Addressed by (epoch, draft, board, pin) only: two editors pinning the
    /// same draft in the same epoch converge on one proposal.
    pub fn hashed(&self) -> Hash {
        HashBuilder::untagged()
            .put_u64(self.epoch)
            .put_hash(&self.draft)
            .put_str(&self.board)
            .put_bool(self.pin)
            .finish()
    }
}

/// Adds (`insert == true`) or removes an editor of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEditor {
    pub epoch: u64,
    pub author: Token,
    #[serde(default)]
    pub reasons: String,
    pub board: String,
    pub editor: Token,
    pub insert: bool,
}

impl BoardEditor {
    pub fn hashed(&self) -> Hash {
        HashBuilder::untagged()
            .put_u64(self.epoch)
            .put_token(&self.editor)
            .put_str(&self.board)
            .put_bool(self.insert)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(author: u8) -> Pin {
        Pin {
            epoch: 4,
            author: Token::new([author; 32]),
            reasons: String::new(),
            board: "news".into(),
            draft: Hash::of(b"draft"),
            pin: true,
        }
    }

    #[test]
    fn test_pin_hash_ignores_author() {
        assert_eq!(pin(1).hashed(), pin(2).hashed());
        let mut unpin = pin(1);
        unpin.pin = false;
        assert_ne!(pin(1).hashed(), unpin.hashed());
    }

    #[test]
    fn test_board_keywords_default_empty() {
        let json = format!(
            r#"{{"epoch":1,"author":"{}","on_behalf_of":"A","name":"news","pin_majority":50}}"#,
            Token::new([1; 32])
        );
        let board: CreateBoard = serde_json::from_str(&json).unwrap();
        assert!(board.keywords.is_empty());
        assert_eq!(board.hashed(), Hash::of(b"news"));
    }
}
