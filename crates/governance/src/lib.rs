//! Governance engine for Synergy
//!
//! Members act on a shared object graph of collectives, boards, drafts,
//! edits, releases and events. Most actions do not change the graph
//! directly: they open a proposal that freezes who is entitled to vote on
//! it, collects ballots, and is applied only once the electorate reaches a
//! favorable quorum. Unresolved proposals expire at a fixed epoch deadline.
//!
//! The entry point is [`State`], which dispatches parsed actions from
//! `synergy-actions` and reports outcomes through optional [`Hooks`].

pub mod collective;
pub mod config;
pub mod deadline;
pub mod error;
pub mod graph;
pub mod index;
pub mod proposals;
pub mod quorum;
pub mod registry;
pub mod state;

pub use collective::{Collective, Consensual, Electorate, UnnamedCollective};
pub use config::GovernanceConfig;
pub use deadline::Deadlines;
pub use error::{ErrorKind, GovernanceError, GovernanceResult, VoteRejection};
pub use graph::ObjectGraph;
pub use index::{Hooks, Indexer, Notifier, NotifyAction, Updated};
pub use proposals::{Proposal, ProposalKind};
pub use quorum::{consensus_epoch, evaluate, required_votes, ConsensusState};
pub use registry::{Pool, Proposals};
pub use state::State;
