//! Quorum predicates
//!
//! A proposal is evaluated against a frozen electorate and the ballots cast
//! so far. Ballots are scanned in arrival order; only members voting on the
//! right hash count. The scan stops as soon as the outcome is settled.

use std::collections::BTreeSet;

use synergy_actions::Vote;
use synergy_crypto::{Hash, Token};

/// Outcome of evaluating a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusState {
    Undecided,
    Favorable,
    Against,
}

impl ConsensusState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ConsensusState::Undecided)
    }
}

/// Approvals needed out of `members` voters at `percentage` majority:
/// `floor(members * percentage / 100) + 1`, capped at `members`.
pub fn required_votes(members: usize, percentage: u8) -> usize {
    (members * usize::from(percentage) / 100 + 1).min(members)
}

/// Evaluate `votes` against an electorate needing `required` approvals
pub fn evaluate(
    members: &BTreeSet<Token>,
    required: usize,
    hash: &Hash,
    votes: &[Vote],
) -> ConsensusState {
    let tolerated = members.len().saturating_sub(required);
    let mut favor = 0;
    let mut against = 0;
    for vote in votes {
        if &vote.hash != hash || !members.contains(&vote.author) {
            continue;
        }
        if vote.approve {
            favor += 1;
            if favor >= required {
                return ConsensusState::Favorable;
            }
        } else {
            against += 1;
            if against > tolerated {
                return ConsensusState::Against;
            }
        }
    }
    ConsensusState::Undecided
}

/// Epoch of the approval that completed a `required` approval set, if any
pub fn consensus_epoch(members: &BTreeSet<Token>, required: usize, votes: &[Vote]) -> Option<u64> {
    let mut count = 0;
    for vote in votes {
        if vote.approve && members.contains(&vote.author) {
            count += 1;
            if count >= required {
                return Some(vote.epoch);
            }
        }
    }
    None
}
