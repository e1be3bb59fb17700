//! Read-only projections of an election for one caller.
//!
//! Tallies, the voter list and per-voter choices are withheld until the
//! election has closed. The withheld arrays are present but empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{
    election::{CandidateId, ElectionId, ElectionState, VoteCount, NO_CANDIDATE},
    identity::Identity,
};

use super::election_core::Election;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: CandidateId,
    pub name: String,
}

/// Full details of one election, as seen by `caller` at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionView {
    pub id: ElectionId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: ElectionState,
    pub has_ended: bool,
    /// Every candidate, in ID order.
    pub candidates: Vec<CandidateView>,
    /// Tallies parallel to `candidates`; empty until closed.
    pub results: Vec<VoteCount>,
    pub has_voted: bool,
    /// The caller's own choice, or [`NO_CANDIDATE`].
    pub caller_choice: CandidateId,
    /// Registered voters; empty until closed.
    pub voters: Vec<Identity>,
    /// Choices parallel to `voters`, [`NO_CANDIDATE`] for abstainers; empty until closed.
    pub voter_choices: Vec<CandidateId>,
}

impl ElectionView {
    pub fn project(election: &Election, caller: &Identity, now: DateTime<Utc>) -> Self {
        let state = election.state(now);
        let has_ended = state.has_ended();
        let caller_choice = election.voters().choice_of(caller);

        let (results, voters, voter_choices) = if has_ended {
            (
                election.candidates().iter().map(|c| c.vote_count()).collect(),
                election.voters().iter().map(|v| v.identity().clone()).collect(),
                election
                    .voters()
                    .iter()
                    .map(|v| v.choice().unwrap_or(NO_CANDIDATE))
                    .collect(),
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        Self {
            id: election.id(),
            name: election.name().to_string(),
            start_time: election.start_time(),
            end_time: election.end_time(),
            state,
            has_ended,
            candidates: election
                .candidates()
                .iter()
                .map(|c| CandidateView {
                    id: c.id(),
                    name: c.name().to_string(),
                })
                .collect(),
            results,
            has_voted: caller_choice.is_some(),
            caller_choice: caller_choice.unwrap_or(NO_CANDIDATE),
            voters,
            voter_choices,
        }
    }
}

/// One line of an election listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub id: ElectionId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: ElectionState,
    pub has_voted: bool,
}

impl ElectionSummary {
    pub fn project(election: &Election, caller: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            id: election.id(),
            name: election.name().to_string(),
            start_time: election.start_time(),
            end_time: election.end_time(),
            state: election.state(now),
            has_voted: election.voters().choice_of(caller).is_some(),
        }
    }
}
