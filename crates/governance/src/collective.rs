//! Votable bodies
//!
//! Every electorate a proposal can be put to implements [`Consensual`]:
//! persistent named collectives, and the ad-hoc groups of co-authors, board
//! editors and event managers.

use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use synergy_actions::{Policy, Vote};
use synergy_crypto::{Hash, Token};

use crate::quorum::{self, required_votes, ConsensusState};

/// A body whose members resolve proposals by quorum
pub trait Consensual: Debug + Send {
    fn members(&self) -> &BTreeSet<Token>;

    fn policy(&self) -> Policy;

    /// Name of the collective; `None` for an ad-hoc group
    fn collective_name(&self) -> Option<&str>;

    fn is_member(&self, token: &Token) -> bool {
        self.members().contains(token)
    }

    /// Simple majority
    fn consensus(&self, hash: &Hash, votes: &[Vote]) -> ConsensusState {
        let members = self.members();
        let required = required_votes(members.len(), self.policy().majority);
        quorum::evaluate(members, required, hash, votes)
    }

    fn super_consensus(&self, hash: &Hash, votes: &[Vote]) -> ConsensusState {
        let members = self.members();
        let required = required_votes(members.len(), self.policy().super_majority);
        quorum::evaluate(members, required, hash, votes)
    }

    fn unanimous(&self, hash: &Hash, votes: &[Vote]) -> ConsensusState {
        let members = self.members();
        quorum::evaluate(members, members.len(), hash, votes)
    }

    /// Epoch at which a simple majority had approved
    fn consensus_epoch(&self, votes: &[Vote]) -> Option<u64> {
        let members = self.members();
        let required = required_votes(members.len(), self.policy().majority);
        quorum::consensus_epoch(members, required, votes)
    }
}

/// A named, persistent collective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collective {
    pub name: String,
    pub description: String,
    pub members: BTreeSet<Token>,
    pub policy: Policy,
}

impl Collective {
    /// A new collective whose only member is its founder
    pub fn founded_by(name: String, description: String, founder: Token, policy: Policy) -> Self {
        Self {
            name,
            description,
            members: BTreeSet::from([founder]),
            policy,
        }
    }

    /// Frozen copy of the electorate, taken when a proposal opens against
    /// this collective. Later changes to `self` never reach the copy.
    pub fn photo(&self) -> Collective {
        Collective {
            name: self.name.clone(),
            description: self.description.clone(),
            members: self.members.iter().copied().collect(),
            policy: Policy::new(self.policy.majority, self.policy.super_majority),
        }
    }

    pub fn include_member(&mut self, token: Token) {
        self.members.insert(token);
    }

    pub fn remove_member(&mut self, token: &Token) {
        self.members.remove(token);
    }

    pub fn change_majority(&mut self, majority: u8) {
        self.policy.majority = majority;
    }
}

impl Consensual for Collective {
    fn members(&self) -> &BTreeSet<Token> {
        &self.members
    }

    fn policy(&self) -> Policy {
        self.policy
    }

    fn collective_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// An ad-hoc electorate with a single majority percentage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnnamedCollective {
    pub members: BTreeSet<Token>,
    pub majority: u8,
}

impl UnnamedCollective {
    pub fn new(majority: u8, members: impl IntoIterator<Item = Token>) -> Self {
        Self {
            members: members.into_iter().collect(),
            majority,
        }
    }

    pub fn change_majority(&mut self, majority: u8) {
        self.majority = majority;
    }
}

impl Consensual for UnnamedCollective {
    fn members(&self) -> &BTreeSet<Token> {
        &self.members
    }

    /// Ad-hoc groups have no separate supermajority
    fn policy(&self) -> Policy {
        Policy::new(self.majority, self.majority)
    }

    fn collective_name(&self) -> Option<&str> {
        None
    }
}

/// The authors of a draft or edit: either a collective or a group of people
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Electorate {
    Named(Collective),
    Unnamed(UnnamedCollective),
}

impl Electorate {
    pub fn is_named(&self) -> bool {
        matches!(self, Electorate::Named(_))
    }

    fn inner(&self) -> &dyn Consensual {
        match self {
            Electorate::Named(collective) => collective,
            Electorate::Unnamed(group) => group,
        }
    }
}

impl Consensual for Electorate {
    fn members(&self) -> &BTreeSet<Token> {
        self.inner().members()
    }

    fn policy(&self) -> Policy {
        self.inner().policy()
    }

    fn collective_name(&self) -> Option<&str> {
        self.inner().collective_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(n: u8) -> Token {
        Token::new([n; 32])
    }

    fn approve(author: u8, hash: Hash) -> Vote {
        Vote {
            epoch: 1,
            author: token(author),
            reasons: String::new(),
            hash,
            approve: true,
        }
    }

    #[test]
    fn test_photo_is_isolated() {
        let mut live = Collective::founded_by("A".into(), String::new(), token(1), Policy::new(50, 75));
        let photo = live.photo();
        live.include_member(token(2));
        live.change_majority(0);
        assert_eq!(photo.members.len(), 1);
        assert_eq!(photo.policy.majority, 50);
        assert_eq!(live.members.len(), 2);
    }

    #[test]
    fn test_super_consensus_needs_more() {
        let mut collective =
            Collective::founded_by("A".into(), String::new(), token(1), Policy::new(50, 75));
        collective.include_member(token(2));
        collective.include_member(token(3));
        collective.include_member(token(4));
        let hash = Hash::of(b"update");
        let votes = vec![approve(1, hash), approve(2, hash), approve(3, hash)];
        assert_eq!(collective.consensus(&hash, &votes), ConsensusState::Favorable);
        assert_eq!(collective.super_consensus(&hash, &votes), ConsensusState::Undecided);
        assert_eq!(collective.unanimous(&hash, &votes), ConsensusState::Undecided);
    }

    #[test]
    fn test_unnamed_collective_has_no_name() {
        let group = Electorate::Unnamed(UnnamedCollective::new(100, [token(1), token(2)]));
        assert_eq!(group.collective_name(), None);
        assert!(group.is_member(&token(2)));
        assert_eq!(group.policy().super_majority, 100);
    }

    #[test]
    fn test_consensus_epoch_delegates() {
        let group = UnnamedCollective::new(50, [token(1), token(2), token(3)]);
        let hash = Hash::of(b"x");
        let mut second = approve(2, hash);
        second.epoch = 7;
        assert_eq!(group.consensus_epoch(&[approve(1, hash), second]), Some(7));
    }
}
