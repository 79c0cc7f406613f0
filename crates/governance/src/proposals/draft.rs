//! Draft and edit proposals

use std::collections::BTreeSet;

use synergy_actions::policy::MAX_PERCENTAGE;
use synergy_actions::Vote;
use synergy_crypto::{Hash, Token};

use crate::collective::{Consensual, Electorate, UnnamedCollective};
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::{Draft, Edit, ObjectGraph};
use crate::index::Hooks;
use crate::proposals::{Proposal, ProposalKind};
use crate::quorum::ConsensusState;

/// A draft, or a new version of one, awaiting its authors.
///
/// Resolution passes up to three gates:
/// 1. the current authors reach consensus under their policy;
/// 2. without a previous version, an ad-hoc group must be unanimous;
/// 3. with one, the previous authors reach consensus too, and between two
///    ad-hoc groups every newly added co-author must approve explicitly.
#[derive(Debug)]
pub struct PendingDraft {
    pub draft: Draft,
    /// Authors of the previous version, as of submission
    pub previous_authors: Option<Electorate>,
}

impl PendingDraft {
    pub fn new(draft: Draft, previous_authors: Option<Electorate>) -> Self {
        Self {
            draft,
            previous_authors,
        }
    }

    fn newcomers(&self, previous: &Electorate) -> BTreeSet<Token> {
        self.draft
            .authors
            .members()
            .difference(previous.members())
            .copied()
            .collect()
    }
}

impl Proposal for PendingDraft {
    fn kind(&self) -> ProposalKind {
        ProposalKind::Draft
    }

    fn hash(&self) -> Hash {
        self.draft.hash
    }

    fn votes(&self) -> &[Vote] {
        &self.draft.votes
    }

    fn record_vote(&mut self, vote: Vote) {
        self.draft.votes.push(vote);
    }

    fn electorate(&self) -> &dyn Consensual {
        &self.draft.authors
    }

    fn index_electorates(&self) -> Vec<BTreeSet<Token>> {
        let mut electorates = vec![self.draft.authors.members().clone()];
        if let Some(previous) = &self.previous_authors {
            electorates.push(previous.members().clone());
        }
        electorates
    }

    fn consensus(&self) -> ConsensusState {
        let Draft { authors, hash, votes, .. } = &self.draft;
        let current = authors.consensus(hash, votes);
        if current != ConsensusState::Favorable {
            return current;
        }
        let Some(previous) = &self.previous_authors else {
            return if authors.is_named() {
                ConsensusState::Favorable
            } else {
                authors.unanimous(hash, votes)
            };
        };
        let prior = previous.consensus(hash, votes);
        if prior != ConsensusState::Favorable {
            return prior;
        }
        if authors.is_named() || previous.is_named() {
            return ConsensusState::Favorable;
        }
        let mut waiting = self.newcomers(previous);
        for vote in votes.iter().filter(|vote| &vote.hash == hash) {
            if waiting.remove(&vote.author) && !vote.approve {
                return ConsensusState::Against;
            }
        }
        if waiting.is_empty() {
            ConsensusState::Favorable
        } else {
            ConsensusState::Undecided
        }
    }

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        let mut draft = self.draft;
        if graph.drafts.contains_key(&draft.hash) {
            return Err(GovernanceError::Conflict(format!("draft {} already published", draft.hash)));
        }
        draft.approved = true;
        hooks.index(|indexer| indexer.add_draft(&draft));
        graph.drafts.insert(draft.hash, draft);
        Ok(())
    }
}

/// Consent of one author body: a collective's policy, or every member of
/// an ad-hoc group
fn authors_consent(authors: &Electorate, hash: &Hash, votes: &[Vote]) -> ConsensusState {
    let state = authors.consensus(hash, votes);
    if state != ConsensusState::Favorable || authors.is_named() {
        return state;
    }
    authors.unanimous(hash, votes)
}

/// An edit to a published draft, decided jointly by the draft's authors
/// and the edit's own authors
#[derive(Debug)]
pub struct PendingEdit {
    pub edit: Edit,
    pub draft_authors: Electorate,
    /// Everyone entitled to a ballot
    pub voters: UnnamedCollective,
}

impl PendingEdit {
    pub fn new(edit: Edit, draft_authors: Electorate) -> Self {
        let members = draft_authors
            .members()
            .iter()
            .chain(edit.authors.members())
            .copied();
        let voters = UnnamedCollective::new(MAX_PERCENTAGE, members);
        Self {
            edit,
            draft_authors,
            voters,
        }
    }
}

impl Proposal for PendingEdit {
    fn kind(&self) -> ProposalKind {
        ProposalKind::Edit
    }

    fn hash(&self) -> Hash {
        self.edit.hash
    }

    fn votes(&self) -> &[Vote] {
        &self.edit.votes
    }

    fn record_vote(&mut self, vote: Vote) {
        self.edit.votes.push(vote);
    }

    fn electorate(&self) -> &dyn Consensual {
        &self.voters
    }

    /// Both the draft's authors and the edit's authors must consent
    fn consensus(&self) -> ConsensusState {
        let Edit { hash, votes, .. } = &self.edit;
        let draft = authors_consent(&self.draft_authors, hash, votes);
        let edit = authors_consent(&self.edit.authors, hash, votes);
        match (draft, edit) {
            (ConsensusState::Against, _) | (_, ConsensusState::Against) => ConsensusState::Against,
            (ConsensusState::Favorable, ConsensusState::Favorable) => ConsensusState::Favorable,
            _ => ConsensusState::Undecided,
        }
    }

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        let edit = self.edit;
        let draft = graph
            .drafts
            .get_mut(&edit.draft)
            .ok_or_else(|| GovernanceError::NotFound(format!("draft {}", edit.draft)))?;
        draft.edits.push(edit.hash);
        hooks.index(|indexer| indexer.add_edit(&edit));
        graph.edits.insert(edit.hash, edit);
        Ok(())
    }
}
