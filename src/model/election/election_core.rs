use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{
    election::{CandidateId, ElectionId, ElectionState},
    identity::Identity,
};

use super::{
    candidates::CandidateRoster,
    errors::{ElectionError, RangeError, TemporalError},
    event::ElectionEvent,
    voters::VoterRoll,
};

/// Core election data, as stored in the database.
///
/// The structure is fixed at creation. The only mutation is [`Election::vote`],
/// which touches one voter's choice and one candidate's tally together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Unique ID.
    #[serde(rename = "_id")]
    id: ElectionId,
    /// Election name.
    name: String,
    /// Votes are accepted from this time (inclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    start_time: DateTime<Utc>,
    /// Votes are accepted until this time (exclusive).
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    end_time: DateTime<Utc>,
    /// Eligible voters and their choices.
    voters: VoterRoll,
    /// Candidates and their tallies.
    candidates: CandidateRoster,
}

impl Election {
    /// Assemble an election. Callers are responsible for having validated the
    /// parameters; see [`super::ElectionSpec::into_election`].
    pub(super) fn new(
        id: ElectionId,
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        voters: VoterRoll,
        candidates: CandidateRoster,
    ) -> Self {
        Self {
            id,
            name,
            start_time,
            end_time,
            voters,
            candidates,
        }
    }

    pub fn id(&self) -> ElectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn voters(&self) -> &VoterRoll {
        &self.voters
    }

    pub fn candidates(&self) -> &CandidateRoster {
        &self.candidates
    }

    /// The lifecycle state at time `now`.
    pub fn state(&self, now: DateTime<Utc>) -> ElectionState {
        ElectionState::at(self.start_time, self.end_time, now)
    }

    /// Does `identity` have any relationship to this election?
    /// The authority relates to every election; anyone else must be on the roll.
    pub fn concerns(&self, identity: &Identity, authority: &Identity) -> bool {
        identity == authority || self.voters.is_registered(identity)
    }

    /// Record `caller`'s vote for `candidate_id`.
    ///
    /// Checked in order: the election is open, the caller is registered, the
    /// caller has not voted, the candidate exists. On success the voter's
    /// choice and the candidate's tally are updated together; on failure
    /// nothing changes.
    pub fn vote(
        &mut self,
        caller: &Identity,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<ElectionEvent, ElectionError> {
        match self.state(now) {
            ElectionState::Scheduled => return Err(TemporalError::NotStarted.into()),
            ElectionState::Closed => return Err(TemporalError::Ended.into()),
            ElectionState::Open => {}
        }

        let voter = self.voters.unvoted_mut(caller)?;
        let candidate = self
            .candidates
            .get_mut(candidate_id)
            .ok_or(RangeError::InvalidCandidate(candidate_id))?;

        voter.cast(candidate_id);
        candidate.record_vote();

        Ok(ElectionEvent::VoteCasted {
            election_id: self.id,
            voter: caller.clone(),
            candidate_id,
        })
    }

    /// The notification record announcing this election's creation.
    pub fn created_event(&self) -> ElectionEvent {
        ElectionEvent::ElectionCreated {
            election_id: self.id,
            name: self.name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::model::election::{EligibilityError, ElectionSpec};

    use super::*;

    fn open_election() -> (Election, DateTime<Utc>) {
        let spec = ElectionSpec::example();
        let during = spec.start_time + Duration::seconds(1);
        (spec.into_election(1), during)
    }

    fn snapshot(election: &Election) -> (Vec<Option<CandidateId>>, Vec<u32>) {
        (
            election.voters().iter().map(|v| v.choice()).collect(),
            election.candidates().iter().map(|c| c.vote_count()).collect(),
        )
    }

    #[test]
    fn successful_vote_updates_voter_and_tally() {
        let (mut election, now) = open_election();
        let event = election.vote(&Identity::voter(1), 2, now).unwrap();

        assert_eq!(
            event,
            ElectionEvent::VoteCasted {
                election_id: 1,
                voter: Identity::voter(1),
                candidate_id: 2,
            }
        );
        assert_eq!(election.voters().choice_of(&Identity::voter(1)), Some(2));
        assert_eq!(election.candidates().get(2).unwrap().vote_count(), 1);
        assert_eq!(election.candidates().get(1).unwrap().vote_count(), 0);
    }

    #[test]
    fn outside_window() {
        let (mut election, _) = open_election();
        let before = election.start_time() - Duration::seconds(1);
        let after = election.end_time();

        assert_eq!(
            election.vote(&Identity::voter(1), 1, before),
            Err(TemporalError::NotStarted.into())
        );
        assert_eq!(
            election.vote(&Identity::voter(1), 1, after),
            Err(TemporalError::Ended.into())
        );
        assert_eq!(election.voters().turnout(), 0);
    }

    #[test]
    fn precondition_order() {
        let (mut election, now) = open_election();
        let after = election.end_time() + Duration::days(1);

        // Timing beats eligibility and candidate range.
        assert_eq!(
            election.vote(&Identity::stranger(), 99, after),
            Err(TemporalError::Ended.into())
        );
        // Registration beats candidate range.
        assert_eq!(
            election.vote(&Identity::stranger(), 99, now),
            Err(EligibilityError::NotRegistered.into())
        );
        // Already voting beats candidate range.
        election.vote(&Identity::voter(2), 1, now).unwrap();
        assert_eq!(
            election.vote(&Identity::voter(2), 99, now),
            Err(EligibilityError::AlreadyVoted.into())
        );
    }

    #[test]
    fn invalid_candidate_changes_nothing() {
        let (mut election, now) = open_election();
        let before = snapshot(&election);

        for candidate in [0, 3, CandidateId::MAX] {
            assert_eq!(
                election.vote(&Identity::voter(1), candidate, now),
                Err(RangeError::InvalidCandidate(candidate).into())
            );
        }
        assert_eq!(snapshot(&election), before);

        // The voter can still vote properly afterwards.
        election.vote(&Identity::voter(1), 1, now).unwrap();
    }

    #[test]
    fn second_vote_leaves_tallies() {
        let (mut election, now) = open_election();
        election.vote(&Identity::voter(3), 1, now).unwrap();
        let before = snapshot(&election);

        assert_eq!(
            election.vote(&Identity::voter(3), 2, now),
            Err(EligibilityError::AlreadyVoted.into())
        );
        assert_eq!(snapshot(&election), before);
    }

    #[test]
    fn tally_sum_matches_turnout() {
        let (mut election, now) = open_election();
        for (voter, candidate) in [(1, 1), (2, 2), (3, 1)] {
            election.vote(&Identity::voter(voter), candidate, now).unwrap();
            assert_eq!(
                election.candidates().total_votes(),
                election.voters().turnout() as u64
            );
        }
        assert_eq!(election.candidates().total_votes(), 3);
    }

    #[test]
    fn concerns() {
        let (election, _) = open_election();
        let authority = Identity::authority();
        assert!(election.concerns(&authority, &authority));
        assert!(election.concerns(&Identity::voter(2), &authority));
        assert!(!election.concerns(&Identity::stranger(), &authority));
    }

    #[test]
    fn stored_window_is_exact() {
        let mut spec = ElectionSpec::example();
        spec.end_time += Duration::microseconds(700);
        let election = spec.into_election(1);

        let document = mongodb::bson::to_document(&election).unwrap();
        let stored: Election = mongodb::bson::from_document(document).unwrap();
        assert_eq!(stored, election);

        let now = election.end_time() - Duration::microseconds(300);
        assert_eq!(stored.state(now), election.state(now));
        assert_eq!(stored.created_event(), election.created_event());
    }
}
