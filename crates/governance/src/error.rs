//! Error types for the governance engine

use synergy_crypto::Hash;
use thiserror::Error;

/// Why a ballot was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteRejection {
    /// The author already voted on this proposal
    #[error("vote already cast")]
    AlreadyCast,

    /// The author may not vote on this proposal
    #[error("voter not recognized")]
    NotRecognized,

    /// The proposal is not resolved by ballots
    #[error("proposal does not accept votes")]
    NotVotable,
}

/// Broad class of a [`GovernanceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised before any proposal is opened; nothing was mutated
    Precondition,
    /// The ballot was discarded
    Vote,
    /// The addressed proposal is not registered
    Registry,
    /// The target was finalized elsewhere; the proposal was still removed
    Consistency,
}

/// Error types for governance operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Not a member: {0}")]
    NotAMember(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(VoteRejection),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(Hash),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::NotAMember(_)
            | GovernanceError::NotFound(_)
            | GovernanceError::AlreadyExists(_)
            | GovernanceError::InvalidPolicy(_)
            | GovernanceError::Unauthorized(_) => ErrorKind::Precondition,
            GovernanceError::InvalidVote(_) => ErrorKind::Vote,
            GovernanceError::ProposalNotFound(_) => ErrorKind::Registry,
            GovernanceError::Conflict(_) => ErrorKind::Consistency,
        }
    }
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(GovernanceError::NotAMember("x".into()).kind(), ErrorKind::Precondition);
        assert_eq!(
            GovernanceError::InvalidVote(VoteRejection::AlreadyCast).kind(),
            ErrorKind::Vote
        );
        assert_eq!(GovernanceError::ProposalNotFound(Hash::ZERO).kind(), ErrorKind::Registry);
        assert_eq!(GovernanceError::Conflict("released".into()).kind(), ErrorKind::Consistency);
    }

    #[test]
    fn test_message() {
        let err = GovernanceError::InvalidVote(VoteRejection::AlreadyCast);
        assert_eq!(err.to_string(), "Invalid vote: vote already cast");
    }
}
