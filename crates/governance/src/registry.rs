//! The proposal registry
//!
//! Maps resolution hashes to pending records and drives their resolution.
//! A resolved proposal leaves the registry before its effect is applied, so
//! later ballots for the same hash find nothing.

use std::collections::{BTreeSet, HashMap};

use synergy_actions::{GreetCheckinEvent, Vote};
use synergy_crypto::{Hash, Token};
use tracing::{debug, info};

use crate::error::{GovernanceError, GovernanceResult, VoteRejection};
use crate::graph::ObjectGraph;
use crate::index::{Hooks, NotifyAction};
use crate::proposals::{Proposal, ProposalKind};
use crate::quorum::ConsensusState;

/// Read-only view of a pending proposal's ballot box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Copy of the electorate
    pub voters: BTreeSet<Token>,
    pub majority: u8,
    pub votes: Vec<Vote>,
}

impl Pool {
    /// Electors who have not voted yet
    pub fn missing(&self) -> BTreeSet<Token> {
        let mut missing = self.voters.clone();
        for vote in &self.votes {
            missing.remove(&vote.author);
        }
        missing
    }
}

/// Pending proposals, keyed by resolution hash
#[derive(Debug, Default)]
pub struct Proposals {
    kinds: HashMap<Hash, ProposalKind>,
    pending: HashMap<Hash, Box<dyn Proposal>>,
}

impl Proposals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record and tell its electorate a ballot is outstanding
    pub fn add(&mut self, record: Box<dyn Proposal>, hooks: &mut Hooks) -> GovernanceResult<Hash> {
        let hash = record.hash();
        if self.kinds.contains_key(&hash) {
            return Err(GovernanceError::AlreadyExists(format!("proposal {}", hash)));
        }
        let kind = record.kind();
        for electorate in record.index_electorates() {
            hooks.index(|indexer| indexer.index_vote_hash(&electorate, &hash));
        }
        debug!(hash = %hash, kind = %kind, "proposal registered");
        self.kinds.insert(hash, kind);
        self.pending.insert(hash, record);
        Ok(hash)
    }

    /// Remove `hash` from every table. Always reports the removal to the
    /// indexer, registered or not.
    pub fn delete(&mut self, hash: &Hash, hooks: &mut Hooks) -> Option<Box<dyn Proposal>> {
        self.kinds.remove(hash);
        let removed = self.pending.remove(hash);
        hooks.index(|indexer| indexer.remove_vote_hash(hash));
        removed
    }

    pub fn kind(&self, hash: &Hash) -> Option<ProposalKind> {
        self.kinds.get(hash).copied()
    }

    pub fn kind_text(&self, hash: &Hash) -> &'static str {
        self.kind(hash).map(|kind| kind.name()).unwrap_or("Unknown")
    }

    pub fn has(&self, hash: &Hash) -> bool {
        self.kinds.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &Hash> {
        self.kinds.keys()
    }

    pub fn pooling(&self, hash: &Hash) -> Option<Pool> {
        let record = self.pending.get(hash)?;
        let electorate = record.electorate();
        Some(Pool {
            voters: electorate.members().iter().copied().collect(),
            majority: record.threshold(),
            votes: record.votes().to_vec(),
        })
    }

    pub fn votes(&self, hash: &Hash) -> Option<Vec<Vote>> {
        self.pending.get(hash).map(|record| record.votes().to_vec())
    }

    /// Collective the proposal is put to; empty for ad-hoc groups
    pub fn on_behalf_of(&self, hash: &Hash) -> Option<String> {
        self.pending.get(hash).map(|record| {
            record
                .electorate()
                .collective_name()
                .unwrap_or_default()
                .to_string()
        })
    }

    /// Admit one ballot and resolve the proposal if it reached an outcome
    pub fn incorporate_vote(
        &mut self,
        vote: Vote,
        graph: &mut ObjectGraph,
        hooks: &mut Hooks,
    ) -> GovernanceResult<ConsensusState> {
        let hash = vote.hash;
        let record = self
            .pending
            .get_mut(&hash)
            .ok_or(GovernanceError::ProposalNotFound(hash))?;
        if !record.votable() {
            return Err(GovernanceError::InvalidVote(VoteRejection::NotVotable));
        }
        // records are filed under their own hash
        debug_assert_eq!(record.hash(), hash);
        if record.votes().iter().any(|cast| cast.author == vote.author) {
            return Err(GovernanceError::InvalidVote(VoteRejection::AlreadyCast));
        }
        record.admit(&vote, graph)?;
        debug!(hash = %hash, author = %vote.author, approve = vote.approve, "vote recorded");
        record.record_vote(vote);

        let state = record.consensus();
        if state.is_resolved() {
            self.resolve(hash, state == ConsensusState::Favorable, graph, hooks)?;
        }
        Ok(state)
    }

    /// Hand a manager's greeting to a pending check-in and resolve it
    pub fn incorporate_greet(
        &mut self,
        greet: &GreetCheckinEvent,
        key: Hash,
        graph: &mut ObjectGraph,
        hooks: &mut Hooks,
    ) -> GovernanceResult<()> {
        let record = self
            .pending
            .get_mut(&key)
            .ok_or(GovernanceError::ProposalNotFound(key))?;
        record.greet(greet)?;
        self.resolve(key, true, graph, hooks)
    }

    /// Take the proposal out of the registry and settle it. A favorable
    /// outcome is applied to the graph; its error is returned after the
    /// outcome has been reported.
    pub fn resolve(
        &mut self,
        hash: Hash,
        favorable: bool,
        graph: &mut ObjectGraph,
        hooks: &mut Hooks,
    ) -> GovernanceResult<()> {
        let record = self
            .delete(&hash, hooks)
            .ok_or(GovernanceError::ProposalNotFound(hash))?;
        let kind = record.kind();
        let applied = if favorable {
            record.apply(graph, hooks)
        } else {
            Ok(())
        };
        hooks.index(|indexer| indexer.index_consensus(&hash, favorable));
        let action = if favorable {
            NotifyAction::AcceptProposal
        } else {
            NotifyAction::RejectProposal
        };
        hooks.notify(action, hash);
        info!(hash = %hash, kind = %kind, favorable, "proposal resolved");
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::{Consensual, UnnamedCollective};
    use crate::index::MockIndexer;
    use mockall::{predicate::eq, Sequence};
    use tokio::sync::mpsc::unbounded_channel;

    #[derive(Debug)]
    struct Flag {
        hash: Hash,
        electorate: UnnamedCollective,
        votes: Vec<Vote>,
    }

    impl Proposal for Flag {
        fn kind(&self) -> ProposalKind {
            ProposalKind::UpdateBoard
        }

        fn hash(&self) -> Hash {
            self.hash
        }

        fn votes(&self) -> &[Vote] {
            &self.votes
        }

        fn record_vote(&mut self, vote: Vote) {
            self.votes.push(vote);
        }

        fn electorate(&self) -> &dyn Consensual {
            &self.electorate
        }

        fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
            graph.reactions[0].insert(self.hash, 1);
            Ok(())
        }
    }

    fn token(n: u8) -> Token {
        Token::new([n; 32])
    }

    fn flag(members: &[u8]) -> Box<Flag> {
        Box::new(Flag {
            hash: Hash::of(b"flag"),
            electorate: UnnamedCollective::new(50, members.iter().copied().map(token)),
            votes: Vec::new(),
        })
    }

    fn vote(author: u8, approve: bool) -> Vote {
        Vote {
            epoch: 1,
            author: token(author),
            reasons: String::new(),
            hash: Hash::of(b"flag"),
            approve,
        }
    }

    #[test]
    fn test_add_rejects_duplicate_hash() {
        let mut hooks = Hooks::default();
        let mut proposals = Proposals::new();
        proposals.add(flag(&[1]), &mut hooks).unwrap();
        assert!(matches!(
            proposals.add(flag(&[1]), &mut hooks),
            Err(GovernanceError::AlreadyExists(_))
        ));
        assert_eq!(proposals.kind_text(&Hash::of(b"flag")), "Update Board");
        assert_eq!(proposals.kind_text(&Hash::ZERO), "Unknown");
    }

    #[test]
    fn test_duplicate_vote_leaves_first_intact() {
        let mut graph = ObjectGraph::new(1);
        let mut hooks = Hooks::default();
        let mut proposals = Proposals::new();
        proposals.add(flag(&[1, 2, 3]), &mut hooks).unwrap();
        proposals.incorporate_vote(vote(1, true), &mut graph, &mut hooks).unwrap();
        let err = proposals
            .incorporate_vote(vote(1, false), &mut graph, &mut hooks)
            .unwrap_err();
        assert_eq!(err, GovernanceError::InvalidVote(VoteRejection::AlreadyCast));
        let votes = proposals.votes(&Hash::of(b"flag")).unwrap();
        assert_eq!(votes.len(), 1);
        assert!(votes[0].approve);
    }

    #[test]
    fn test_pooling_is_a_copy() {
        let mut hooks = Hooks::default();
        let mut proposals = Proposals::new();
        proposals.add(flag(&[1, 2]), &mut hooks).unwrap();
        let mut pool = proposals.pooling(&Hash::of(b"flag")).unwrap();
        pool.voters.clear();
        let again = proposals.pooling(&Hash::of(b"flag")).unwrap();
        assert_eq!(again.voters.len(), 2);
        assert_eq!(again.majority, 50);
        assert_eq!(again.missing().len(), 2);
        assert_eq!(proposals.on_behalf_of(&Hash::of(b"flag")), Some(String::new()));
    }

    #[test]
    fn test_resolution_order_and_single_outcome() {
        let hash = Hash::of(b"flag");
        let mut seq = Sequence::new();
        let mut mock = MockIndexer::new();
        mock.expect_index_vote_hash()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        mock.expect_remove_vote_hash()
            .with(eq(hash))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        mock.expect_index_consensus()
            .with(eq(hash), eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let (tx, mut rx) = unbounded_channel();
        let mut hooks = Hooks::new(Some(Box::new(mock)), Some(tx));
        let mut graph = ObjectGraph::new(1);
        let mut proposals = Proposals::new();
        proposals.add(flag(&[1, 2, 3]), &mut hooks).unwrap();

        let first = proposals.incorporate_vote(vote(1, true), &mut graph, &mut hooks).unwrap();
        assert_eq!(first, ConsensusState::Undecided);
        let second = proposals.incorporate_vote(vote(2, true), &mut graph, &mut hooks).unwrap();
        assert_eq!(second, ConsensusState::Favorable);
        assert!(!proposals.has(&hash));
        assert_eq!(graph.reactions(0, &hash), 1);

        let late = proposals.incorporate_vote(vote(3, true), &mut graph, &mut hooks);
        assert_eq!(late, Err(GovernanceError::ProposalNotFound(hash)));
        assert_eq!(
            rx.try_recv().unwrap(),
            crate::index::Updated { action: NotifyAction::AcceptProposal, hash }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_against_applies_nothing() {
        let hash = Hash::of(b"flag");
        let mut graph = ObjectGraph::new(1);
        let mut hooks = Hooks::default();
        let mut proposals = Proposals::new();
        proposals.add(flag(&[1, 2]), &mut hooks).unwrap();
        let state = proposals.incorporate_vote(vote(1, false), &mut graph, &mut hooks).unwrap();
        assert_eq!(state, ConsensusState::Against);
        assert!(proposals.is_empty());
        assert_eq!(graph.reactions(0, &hash), 0);
    }

    #[test]
    fn test_orphan_vote() {
        let mut graph = ObjectGraph::new(1);
        let mut hooks = Hooks::default();
        let mut proposals = Proposals::new();
        let err = proposals
            .incorporate_vote(vote(1, true), &mut graph, &mut hooks)
            .unwrap_err();
        assert_eq!(err, GovernanceError::ProposalNotFound(Hash::of(b"flag")));
    }
}
