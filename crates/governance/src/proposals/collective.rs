//! Proposals put to a named collective

use synergy_actions::{RemoveMember, RequestMembership, UpdateCollective, Vote};
use synergy_crypto::Hash;

use crate::collective::{Collective, Consensual};
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::ObjectGraph;
use crate::index::Hooks;
use crate::proposals::{Proposal, ProposalKind};
use crate::quorum::ConsensusState;

fn live<'a>(graph: &'a mut ObjectGraph, name: &str) -> GovernanceResult<&'a mut Collective> {
    graph
        .collective_mut(name)
        .ok_or_else(|| GovernanceError::NotFound(format!("collective {}", name)))
}

/// Description and policy changes. Policy changes need a supermajority.
#[derive(Debug)]
pub struct PendingUpdateCollective {
    pub update: UpdateCollective,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingUpdateCollective {
    pub fn new(update: UpdateCollective, collective: Collective) -> Self {
        Self {
            hash: update.hashed(),
            update,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingUpdateCollective {
    ballot_box!(ProposalKind::UpdateCollective, collective);

    fn consensus(&self) -> ConsensusState {
        if self.update.changes_policy() {
            self.collective.super_consensus(&self.hash, &self.votes)
        } else {
            self.collective.consensus(&self.hash, &self.votes)
        }
    }

    fn threshold(&self) -> u8 {
        if self.update.changes_policy() {
            self.collective.policy.super_majority
        } else {
            self.collective.policy.majority
        }
    }

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let collective = live(graph, &self.collective.name)?;
        if let Some(description) = self.update.description {
            collective.description = description;
        }
        if let Some(majority) = self.update.majority {
            collective.change_majority(majority);
        }
        if let Some(super_majority) = self.update.super_majority {
            collective.policy.super_majority = super_majority;
        }
        Ok(())
    }
}

/// A request to join a collective
#[derive(Debug)]
pub struct PendingRequestMembership {
    pub request: RequestMembership,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingRequestMembership {
    pub fn new(request: RequestMembership, collective: Collective) -> Self {
        Self {
            hash: request.hashed(),
            request,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingRequestMembership {
    ballot_box!(ProposalKind::RequestMembership, collective);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        live(graph, &self.collective.name)?.include_member(self.request.author);
        Ok(())
    }
}

#[derive(Debug)]
pub struct PendingRemoveMember {
    pub remove: RemoveMember,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingRemoveMember {
    pub fn new(remove: RemoveMember, collective: Collective) -> Self {
        Self {
            hash: remove.hashed(),
            remove,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingRemoveMember {
    ballot_box!(ProposalKind::RemoveMember, collective);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        live(graph, &self.collective.name)?.remove_member(&self.remove.member);
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

    fn graph_with(collective: &Collective) -> ObjectGraph {
        let mut graph = ObjectGraph::new(1);
        graph
            .collectives
            .insert(Hash::of(collective.name.as_bytes()), collective.clone());
        graph
    }

    fn update(majority: Option<u8>) -> UpdateCollective {
        UpdateCollective {
            epoch: 3,
            author: token(1),
            reasons: String::new(),
            on_behalf_of: "A".into(),
            description: Some("x".into()),
            majority,
            super_majority: None,
        }
    }

    fn approve(author: u8, hash: Hash) -> Vote {
        Vote {
            epoch: 3,
            author: token(author),
            reasons: String::new(),
            hash,
            approve: true,
        }
    }

    fn collective() -> Collective {
        let mut collective = Collective::founded_by("A".into(), String::new(), token(1), Policy::new(50, 100));
        collective.include_member(token(2));
        collective.include_member(token(3));
        collective
    }

    #[test]
    fn test_policy_change_needs_super_majority() {
        let mut plain = PendingUpdateCollective::new(update(None), collective().photo());
        let mut policy = PendingUpdateCollective::new(update(Some(10)), collective().photo());
        for n in 1..=2 {
            plain.record_vote(approve(n, plain.hash));
            policy.record_vote(approve(n, policy.hash));
        }
        assert_eq!(plain.consensus(), ConsensusState::Favorable);
        assert_eq!(policy.consensus(), ConsensusState::Undecided);
    }

    #[test]
    fn test_update_applies_to_live_collective() {
        let collective = collective();
        let mut graph = graph_with(&collective);
        let pending = Box::new(PendingUpdateCollective::new(update(Some(10)), collective.photo()));
        pending.apply(&mut graph, &mut Hooks::default()).unwrap();
        let live = graph.collective("A").unwrap();
        assert_eq!(live.description, "x");
        assert_eq!(live.policy, Policy::new(10, 100));
    }

    #[test]
    fn test_membership_changes() {
        let collective = collective();
        let mut graph = graph_with(&collective);
        let join = RequestMembership {
            epoch: 1,
            author: token(9),
            reasons: String::new(),
            collective: "A".into(),
            include: true,
        };
        Box::new(PendingRequestMembership::new(join, collective.photo()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        assert!(graph.collective("A").unwrap().is_member(&token(9)));

        let remove = RemoveMember {
            epoch: 2,
            author: token(1),
            reasons: String::new(),
            on_behalf_of: "A".into(),
            member: token(9),
        };
        Box::new(PendingRemoveMember::new(remove, collective.photo()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        assert!(!graph.collective("A").unwrap().is_member(&token(9)));
    }
}
