//! Reasons an election operation can be rejected.
//!
//! Every rejection aborts the whole operation with no state change. Composite
//! preconditions report the first failing check, in a fixed order, so the
//! reported error is deterministic for a given input.

use thiserror::Error;

use crate::model::common::election::{CandidateId, ElectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ElectionError {
    /// The caller is not the authority on an authority-only operation.
    #[error("only the election authority may do this")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Temporal(#[from] TemporalError),
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Range(#[from] RangeError),
}

impl ElectionError {
    /// The error category, as reported to callers.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unauthorized => "AuthorizationError",
            Self::Validation(_) => "ValidationError",
            Self::Temporal(_) => "TemporalError",
            Self::Eligibility(_) => "EligibilityError",
            Self::Range(_) => "RangeError",
        }
    }

    /// The specific reason within the category.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "NotAuthority",
            Self::Validation(e) => e.reason(),
            Self::Temporal(e) => e.reason(),
            Self::Eligibility(e) => e.reason(),
            Self::Range(e) => e.reason(),
        }
    }
}

/// Structurally invalid election creation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("start time must be strictly before end time")]
    StartNotBeforeEnd,
    #[error("end time must be in the future")]
    EndInPast,
    #[error("an election needs more than one voter, got {0}")]
    TooFewVoters(usize),
    #[error("an election needs more than one candidate, got {0}")]
    TooFewCandidates(usize),
    #[error("the election authority cannot be a voter")]
    AuthorityIsVoter,
}

impl ValidationError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::StartNotBeforeEnd => "StartNotBeforeEnd",
            Self::EndInPast => "EndInPast",
            Self::TooFewVoters(_) => "TooFewVoters",
            Self::TooFewCandidates(_) => "TooFewCandidates",
            Self::AuthorityIsVoter => "AuthorityIsVoter",
        }
    }
}

/// A vote attempted outside the election's open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error("the election has not started yet")]
    NotStarted,
    #[error("the election has ended")]
    Ended,
}

impl TemporalError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Ended => "Ended",
        }
    }
}

/// A vote attempted by someone who may not (or may no longer) vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EligibilityError {
    #[error("caller is not a registered voter in this election")]
    NotRegistered,
    #[error("caller has already voted in this election")]
    AlreadyVoted,
}

impl EligibilityError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotRegistered => "NotRegistered",
            Self::AlreadyVoted => "AlreadyVoted",
        }
    }
}

/// A reference to an election or candidate that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("no election with ID {0}")]
    NoSuchElection(ElectionId),
    #[error("no candidate with ID {0}")]
    InvalidCandidate(CandidateId),
    /// Every election ID has been allocated.
    #[error("no election IDs remain")]
    IdsExhausted,
}

impl RangeError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoSuchElection(_) => "NoSuchElection",
            Self::InvalidCandidate(_) => "InvalidCandidate",
            Self::IdsExhausted => "IdsExhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_reasons() {
        let err: ElectionError = EligibilityError::AlreadyVoted.into();
        assert_eq!(err.category(), "EligibilityError");
        assert_eq!(err.reason(), "AlreadyVoted");

        let err: ElectionError = RangeError::InvalidCandidate(7).into();
        assert_eq!(err.category(), "RangeError");
        assert_eq!(err.reason(), "InvalidCandidate");
        assert_eq!(err.to_string(), "no candidate with ID 7");

        assert_eq!(ElectionError::Unauthorized.category(), "AuthorizationError");
    }
}
