//! The live object graph
//!
//! Objects reference each other by content hash (drafts, events) or by
//! name (collectives, boards) through the tables of [`ObjectGraph`]. Pending
//! proposals hold their own copies and only touch these tables when they
//! resolve.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use synergy_actions::Vote;
use synergy_crypto::{Hash, Token};

use crate::collective::{Collective, Electorate, UnnamedCollective};
use crate::error::{GovernanceError, GovernanceResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub name: String,
    pub keywords: Vec<String>,
    pub description: String,
    /// Name of the collective the board belongs to
    pub collective: String,
    pub editors: UnnamedCollective,
    /// Pinned drafts, oldest first
    pub pinned: Vec<Hash>,
    pub hash: Hash,
}

impl Board {
    pub fn pin(&mut self, draft: Hash) -> GovernanceResult<()> {
        if self.pinned.contains(&draft) {
            return Err(GovernanceError::Conflict(format!(
                "draft {} already pinned on {}",
                draft, self.name
            )));
        }
        self.pinned.push(draft);
        Ok(())
    }

    pub fn unpin(&mut self, draft: &Hash) -> GovernanceResult<()> {
        match self.pinned.iter().position(|pinned| pinned == draft) {
            Some(index) => {
                self.pinned.remove(index);
                Ok(())
            }
            None => Err(GovernanceError::Conflict(format!(
                "draft {} not pinned on {}",
                draft, self.name
            ))),
        }
    }

    /// The `n` most recently pinned drafts
    pub fn last(&self, n: usize) -> &[Hash] {
        &self.pinned[self.pinned.len().saturating_sub(n)..]
    }

    /// The `n` earliest pinned drafts
    pub fn first(&self, n: usize) -> &[Hash] {
        &self.pinned[..n.min(self.pinned.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    /// Epoch of submission
    pub date: u64,
    pub description: String,
    pub authors: Electorate,
    pub content_type: String,
    pub hash: Hash,
    pub previous: Option<Hash>,
    pub keywords: Vec<String>,
    pub references: Vec<Hash>,
    pub votes: Vec<Vote>,
    /// Names of the boards the draft is pinned on
    pub pinned: Vec<String>,
    pub edits: Vec<Hash>,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub authors: Electorate,
    pub date: u64,
    pub reasons: String,
    /// The edited draft
    pub draft: Hash,
    pub content_type: String,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Name of the reputation collective
    pub reputation: String,
    /// Draft hash of the stamped release
    pub release: Hash,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub epoch: u64,
    pub draft: Hash,
    /// Hash of the release action
    pub hash: Hash,
    pub votes: Vec<Vote>,
    pub stamps: Vec<Stamp>,
}

/// Material a manager hands to a checked-in attendee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub manager: Token,
    pub secret_key: Vec<u8>,
    pub private_content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkin {
    pub ephemeral_token: Token,
    pub reasons: String,
    pub greeting: Option<Greeting>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Name of the organising collective
    pub collective: String,
    pub start_at: DateTime<Utc>,
    pub estimated_end: DateTime<Utc>,
    pub description: String,
    pub venue: String,
    pub open: bool,
    pub public: bool,
    pub hash: Hash,
    pub managers: UnnamedCollective,
    pub votes: Vec<Vote>,
    pub checkins: BTreeMap<Token, Checkin>,
    pub live: bool,
    pub reasons: String,
}

/// Every live object, indexed for lookup by the dispatcher
#[derive(Debug, Default)]
pub struct ObjectGraph {
    /// Signed-in members and their handles
    pub members: HashMap<Token, String>,
    pub handles: HashMap<String, Token>,
    /// Keyed by the hash of the collective name
    pub collectives: HashMap<Hash, Collective>,
    /// Keyed by the hash of the board name
    pub boards: HashMap<Hash, Board>,
    pub drafts: HashMap<Hash, Draft>,
    pub edits: HashMap<Hash, Edit>,
    /// Keyed by the released draft
    pub releases: HashMap<Hash, Release>,
    pub events: HashMap<Hash, Event>,
    /// One counter table per reaction
    pub reactions: Vec<HashMap<Hash, u64>>,
}

impl ObjectGraph {
    pub fn new(reactions_count: usize) -> Self {
        Self {
            reactions: vec![HashMap::new(); reactions_count],
            ..Default::default()
        }
    }

    pub fn is_member(&self, token: &Token) -> bool {
        self.members.contains_key(token)
    }

    pub fn collective(&self, name: &str) -> Option<&Collective> {
        self.collectives.get(&Hash::of(name.as_bytes()))
    }

    pub fn collective_mut(&mut self, name: &str) -> Option<&mut Collective> {
        self.collectives.get_mut(&Hash::of(name.as_bytes()))
    }

    pub fn board(&self, name: &str) -> Option<&Board> {
        self.boards.get(&Hash::of(name.as_bytes()))
    }

    pub fn board_mut(&mut self, name: &str) -> Option<&mut Board> {
        self.boards.get_mut(&Hash::of(name.as_bytes()))
    }

    /// Snapshot of an author electorate as of now. Collectives are
    /// re-read from the live table; ad-hoc groups are copied as stored.
    pub fn electorate_photo(&self, electorate: &Electorate) -> Electorate {
        match electorate {
            Electorate::Named(stored) => match self.collective(&stored.name) {
                Some(live) => Electorate::Named(live.photo()),
                None => Electorate::Named(stored.photo()),
            },
            Electorate::Unnamed(group) => Electorate::Unnamed(group.clone()),
        }
    }

    /// Count of `reaction` received by `hash`
    pub fn reactions(&self, reaction: usize, hash: &Hash) -> u64 {
        self.reactions
            .get(reaction)
            .and_then(|counts| counts.get(hash))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synergy_actions::Policy;

    fn board() -> Board {
        Board {
            name: "news".into(),
            keywords: vec![],
            description: String::new(),
            collective: "A".into(),
            editors: UnnamedCollective::new(50, [Token::new([1; 32])]),
            pinned: vec![],
            hash: Hash::of(b"news"),
        }
    }

    #[test]
    fn test_pin_unpin() {
        let mut board = board();
        let a = Hash::of(b"a");
        let b = Hash::of(b"b");
        board.pin(a).unwrap();
        board.pin(b).unwrap();
        assert!(board.pin(a).is_err());
        assert_eq!(board.last(1), &[b]);
        assert_eq!(board.first(5), &[a, b]);
        board.unpin(&a).unwrap();
        assert!(board.unpin(&a).is_err());
        assert_eq!(board.pinned, vec![b]);
    }

    #[test]
    fn test_electorate_photo_reads_live_collective() {
        let founder = Token::new([1; 32]);
        let mut graph = ObjectGraph::new(5);
        let collective = Collective::founded_by("A".into(), String::new(), founder, Policy::new(50, 50));
        let stored = Electorate::Named(collective.photo());
        graph.collectives.insert(Hash::of(b"A"), collective);
        graph
            .collective_mut("A")
            .unwrap()
            .include_member(Token::new([2; 32]));
        match graph.electorate_photo(&stored) {
            Electorate::Named(photo) => assert_eq!(photo.members.len(), 2),
            other => panic!("unexpected electorate {:?}", other),
        }
    }
}
