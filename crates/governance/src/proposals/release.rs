//! Release and reputation stamp proposals

use synergy_actions::Vote;
use synergy_crypto::Hash;

use crate::collective::{Collective, Consensual, Electorate};
use crate::error::{GovernanceError, GovernanceResult, VoteRejection};
use crate::graph::{ObjectGraph, Release, Stamp};
use crate::index::Hooks;
use crate::proposals::{Proposal, ProposalKind};

/// Release of an approved draft, decided by the draft's authors
#[derive(Debug)]
pub struct PendingRelease {
    pub release: Release,
    pub authors: Electorate,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingRelease {
    pub fn new(release: Release, authors: Electorate) -> Self {
        Self {
            hash: release.hash,
            release,
            authors,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingRelease {
    ballot_box!(ProposalKind::ReleaseDraft, authors);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let mut release = self.release;
        if graph.releases.contains_key(&release.draft) {
            return Err(GovernanceError::Conflict(format!(
                "draft {} already released",
                release.draft
            )));
        }
        release.votes = self.votes;
        graph.releases.insert(release.draft, release);
        Ok(())
    }
}

/// A reputation collective stamping a release
#[derive(Debug)]
pub struct PendingStamp {
    pub stamp: Stamp,
    pub reputation: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingStamp {
    pub fn new(stamp: Stamp, reputation: Collective) -> Self {
        Self {
            hash: stamp.hash,
            stamp,
            reputation,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingStamp {
    ballot_box!(ProposalKind::ImprintStamp, reputation);

    /// Voters must still belong to the reputation collective when they vote
    fn admit(&self, vote: &Vote, graph: &ObjectGraph) -> GovernanceResult<()> {
        match graph.collective(&self.reputation.name) {
            Some(live) if live.is_member(&vote.author) => Ok(()),
            _ => Err(GovernanceError::InvalidVote(VoteRejection::NotRecognized)),
        }
    }

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        let mut stamp = self.stamp;
        stamp.votes = self.votes;
        let release = graph
            .releases
            .get_mut(&stamp.release)
            .ok_or_else(|| GovernanceError::NotFound(format!("release of {}", stamp.release)))?;
        hooks.index(|indexer| indexer.add_stamp_to_collective(&stamp, &stamp.reputation));
        release.stamps.push(stamp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synergy_actions::Policy;
    use synergy_crypto::Token;

    fn token(n: u8) -> Token {
        Token::new([n; 32])
    }

    fn release(hash: &[u8]) -> Release {
        Release {
            epoch: 1,
            draft: Hash::of(b"draft"),
            hash: Hash::of(hash),
            votes: vec![],
            stamps: vec![],
        }
    }

    #[test]
    fn test_second_release_conflicts() {
        let mut graph = ObjectGraph::new(1);
        let authors = Electorate::Named(Collective::founded_by(
            "A".into(),
            String::new(),
            token(1),
            Policy::new(50, 50),
        ));
        Box::new(PendingRelease::new(release(b"r1"), authors.clone()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        let again = Box::new(PendingRelease::new(release(b"r2"), authors))
            .apply(&mut graph, &mut Hooks::default());
        assert!(matches!(again, Err(GovernanceError::Conflict(_))));
        assert_eq!(graph.releases[&Hash::of(b"draft")].hash, Hash::of(b"r1"));
    }

    #[test]
    fn test_stamp_admits_live_members_only() {
        let mut graph = ObjectGraph::new(1);
        let mut reputation =
            Collective::founded_by("R".into(), String::new(), token(1), Policy::new(50, 50));
        reputation.include_member(token(2));
        let photo = reputation.photo();
        reputation.remove_member(&token(2));
        graph.collectives.insert(Hash::of(b"R"), reputation);

        let stamp = Stamp {
            reputation: "R".into(),
            release: Hash::of(b"draft"),
            hash: Hash::of(b"stamp"),
            votes: vec![],
        };
        let pending = PendingStamp::new(stamp, photo);
        let vote = |author| Vote {
            epoch: 2,
            author: token(author),
            reasons: String::new(),
            hash: Hash::of(b"stamp"),
            approve: true,
        };
        assert!(pending.admit(&vote(1), &graph).is_ok());
        assert_eq!(
            pending.admit(&vote(2), &graph),
            Err(GovernanceError::InvalidVote(VoteRejection::NotRecognized))
        );
    }
}
