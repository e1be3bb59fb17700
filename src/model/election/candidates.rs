use serde::{Deserialize, Serialize};

use crate::model::common::election::{CandidateId, VoteCount};

/// A single candidate and their running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique within the election, dense from 1.
    id: CandidateId,
    /// Candidate name.
    name: String,
    /// Votes received so far. Only ever incremented by a successful vote.
    vote_count: VoteCount,
}

impl Candidate {
    pub fn id(&self) -> CandidateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vote_count(&self) -> VoteCount {
        self.vote_count
    }

    pub(super) fn record_vote(&mut self) {
        self.vote_count += 1;
    }
}

/// The fixed candidate list of one election.
///
/// Candidate IDs are exactly `1..=len`, in the order the names were supplied.
/// Deserialisation enforces this, so a corrupted document is rejected rather
/// than yielding a roster with gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateRoster(Vec<Candidate>);

impl CandidateRoster {
    /// Build a roster, assigning IDs in input order with every tally at zero.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let candidates = names
            .into_iter()
            .zip(1..)
            .map(|(name, id)| Candidate {
                id,
                name,
                vote_count: 0,
            })
            .collect();
        Self(candidates)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        Self::index(id).and_then(|i| self.0.get(i))
    }

    pub(super) fn get_mut(&mut self, id: CandidateId) -> Option<&mut Candidate> {
        Self::index(id).and_then(|i| self.0.get_mut(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.0.iter()
    }

    /// Sum of every candidate's tally.
    pub fn total_votes(&self) -> u64 {
        self.0.iter().map(|c| u64::from(c.vote_count)).sum()
    }

    fn index(id: CandidateId) -> Option<usize> {
        usize::try_from(id).ok()?.checked_sub(1)
    }
}

impl TryFrom<Vec<Candidate>> for CandidateRoster {
    type Error = String;

    fn try_from(candidates: Vec<Candidate>) -> Result<Self, Self::Error> {
        for (candidate, expected) in candidates.iter().zip(1..) {
            if candidate.id != expected {
                return Err(format!(
                    "candidate IDs must be dense from 1: expected {expected}, found {}",
                    candidate.id
                ));
            }
        }
        Ok(Self(candidates))
    }
}

impl From<CandidateRoster> for Vec<Candidate> {
    fn from(roster: CandidateRoster) -> Self {
        roster.0
    }
}
