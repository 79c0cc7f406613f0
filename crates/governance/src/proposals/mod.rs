//! Pending proposals
//!
//! One record type per governed action. A record carries the frozen
//! electorate it was opened against, the ballots cast so far and the delta
//! it applies to the object graph if it resolves favorably.

use std::collections::BTreeSet;
use std::fmt;

use synergy_actions::{GreetCheckinEvent, Vote};
use synergy_crypto::{Hash, Token};

use crate::collective::Consensual;
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::ObjectGraph;
use crate::index::Hooks;
use crate::quorum::ConsensusState;

/// Ballot-box plumbing shared by every record: `$kind` is the tag and
/// `$electorate` the field path of the governing body.
macro_rules! ballot_box {
    ($kind:expr, $($electorate:ident).+) => {
        fn kind(&self) -> $crate::proposals::ProposalKind {
            $kind
        }

        fn hash(&self) -> synergy_crypto::Hash {
            self.hash
        }

        fn votes(&self) -> &[synergy_actions::Vote] {
            &self.votes
        }

        fn record_vote(&mut self, vote: synergy_actions::Vote) {
            self.votes.push(vote);
        }

        fn electorate(&self) -> &dyn $crate::collective::Consensual {
            &self.$($electorate).+
        }
    };
}

pub mod board;
pub mod collective;
pub mod draft;
pub mod event;
pub mod release;

pub use board::{PendingBoard, PendingBoardEditor, PendingPin, PendingUpdateBoard};
pub use collective::{PendingRemoveMember, PendingRequestMembership, PendingUpdateCollective};
pub use draft::{PendingDraft, PendingEdit};
pub use event::{PendingCancelEvent, PendingCheckinGreet, PendingEvent, PendingEventUpdate};
pub use release::{PendingRelease, PendingStamp};

/// Kind tag of a pending proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalKind {
    UpdateCollective,
    RequestMembership,
    RemoveMember,
    Draft,
    Edit,
    CreateBoard,
    UpdateBoard,
    Pin,
    BoardEditor,
    ReleaseDraft,
    ImprintStamp,
    CreateEvent,
    CancelEvent,
    UpdateEvent,
    EventCheckinGreet,
}

impl ProposalKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProposalKind::UpdateCollective => "Update Collective",
            ProposalKind::RequestMembership => "Request Membership",
            ProposalKind::RemoveMember => "Remove Member",
            ProposalKind::Draft => "Draft",
            ProposalKind::Edit => "Edit",
            ProposalKind::CreateBoard => "Create Board",
            ProposalKind::UpdateBoard => "Update Board",
            ProposalKind::Pin => "Pin",
            ProposalKind::BoardEditor => "Board Editor",
            ProposalKind::ReleaseDraft => "Release Draft",
            ProposalKind::ImprintStamp => "Imprint Stamp",
            ProposalKind::CreateEvent => "Create Event",
            ProposalKind::CancelEvent => "Cancel Event",
            ProposalKind::UpdateEvent => "Update Event",
            ProposalKind::EventCheckinGreet => "Event Checkin Greet",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pending proposal awaiting ballots
pub trait Proposal: fmt::Debug + Send {
    fn kind(&self) -> ProposalKind;

    /// Resolution hash, the key voters address
    fn hash(&self) -> Hash;

    fn votes(&self) -> &[Vote];

    fn record_vote(&mut self, vote: Vote);

    /// The body whose policy governs the proposal
    fn electorate(&self) -> &dyn Consensual;

    /// Member sets that get an outstanding ballot on registration
    fn index_electorates(&self) -> Vec<BTreeSet<Token>> {
        vec![self.electorate().members().clone()]
    }

    /// Whether the proposal is resolved by ballots at all
    fn votable(&self) -> bool {
        true
    }

    /// Extra per-ballot admission rule, checked against the live graph
    fn admit(&self, _vote: &Vote, _graph: &ObjectGraph) -> GovernanceResult<()> {
        Ok(())
    }

    /// Take a manager's greeting. Only check-in records accept one.
    fn greet(&mut self, _greet: &GreetCheckinEvent) -> GovernanceResult<()> {
        Err(GovernanceError::Conflict(format!("{} does not take greetings", self.kind())))
    }

    fn consensus(&self) -> ConsensusState {
        self.electorate().consensus(&self.hash(), self.votes())
    }

    /// Approval percentage the proposal is decided by
    fn threshold(&self) -> u8 {
        self.electorate().policy().majority
    }

    /// Apply the favorable outcome to the live graph
    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()>;
}
