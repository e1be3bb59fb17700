use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{election::ElectionId, identity::Identity};

use super::{
    candidates::CandidateRoster,
    election_core::Election,
    errors::{ElectionError, ValidationError},
    voters::VoterRoll,
};

/// Parameters for a new election, as supplied by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    /// Election name.
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Eligible voters. Duplicates are allowed and collapse to one entry.
    pub voters: Vec<Identity>,
    /// Candidate names, in ballot order.
    pub candidates: Vec<String>,
}

impl ElectionSpec {
    /// Check that `caller` may create this election at time `now`.
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// caller is the authority, start before end, end in the future,
    /// more than one voter, more than one candidate, authority not a voter.
    pub fn validate(
        &self,
        caller: &Identity,
        authority: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(), ElectionError> {
        if caller != authority {
            return Err(ElectionError::Unauthorized);
        }
        let (start_time, end_time) = self.window();
        if start_time >= end_time {
            return Err(ValidationError::StartNotBeforeEnd.into());
        }
        if end_time <= now {
            return Err(ValidationError::EndInPast.into());
        }
        // Counted before duplicates collapse.
        if self.voters.len() <= 1 {
            return Err(ValidationError::TooFewVoters(self.voters.len()).into());
        }
        if self.candidates.len() <= 1 {
            return Err(ValidationError::TooFewCandidates(self.candidates.len()).into());
        }
        if self.voters.contains(authority) {
            return Err(ValidationError::AuthorityIsVoter.into());
        }
        Ok(())
    }

    /// Build the election this spec describes, with no votes cast.
    pub fn into_election(self, id: ElectionId) -> Election {
        let (start_time, end_time) = self.window();
        Election::new(
            id,
            self.name,
            start_time,
            end_time,
            VoterRoll::from_identities(self.voters),
            CandidateRoster::new(self.candidates),
        )
    }
}

impl ElectionSpec {
    /// The voting window at the precision it is stored with: BSON datetimes
    /// keep whole milliseconds, so anything finer is dropped up front.
    fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start_time.trunc_subsecs(3),
            self.end_time.trunc_subsecs(3),
        )
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn check(spec: &ElectionSpec, caller: &Identity) -> Result<(), ElectionError> {
        let now = spec.start_time - Duration::hours(1);
        spec.validate(caller, &Identity::authority(), now)
    }

    #[test]
    fn valid_example() {
        assert_eq!(check(&ElectionSpec::example(), &Identity::authority()), Ok(()));
    }

    #[test]
    fn only_authority() {
        for caller in [Identity::voter(1), Identity::stranger()] {
            assert_eq!(
                check(&ElectionSpec::example(), &caller),
                Err(ElectionError::Unauthorized)
            );
        }
    }

    #[test]
    fn dates() {
        let authority = Identity::authority();

        let mut spec = ElectionSpec::example();
        spec.end_time = spec.start_time;
        assert_eq!(
            check(&spec, &authority),
            Err(ValidationError::StartNotBeforeEnd.into())
        );

        let spec = ElectionSpec::example();
        assert_eq!(
            spec.validate(&authority, &authority, spec.end_time),
            Err(ValidationError::EndInPast.into())
        );
        // Already started but still running is fine.
        assert_eq!(
            spec.validate(&authority, &authority, spec.start_time + Duration::seconds(1)),
            Ok(())
        );
    }

    #[test]
    fn roll_sizes() {
        let authority = Identity::authority();

        let spec = ElectionSpec::example().with_voters(vec![Identity::voter(1)]);
        assert_eq!(
            check(&spec, &authority),
            Err(ValidationError::TooFewVoters(1).into())
        );

        let spec = ElectionSpec::example().with_candidates(&["Alice"]);
        assert_eq!(
            check(&spec, &authority),
            Err(ValidationError::TooFewCandidates(1).into())
        );

        let spec = ElectionSpec::example().with_candidates(&[]);
        assert_eq!(
            check(&spec, &authority),
            Err(ValidationError::TooFewCandidates(0).into())
        );

        // Two entries for the same voter pass the size check.
        let spec =
            ElectionSpec::example().with_voters(vec![Identity::voter(1), Identity::voter(1)]);
        assert_eq!(check(&spec, &authority), Ok(()));
    }

    #[test]
    fn authority_cannot_vote() {
        let spec = ElectionSpec::example()
            .with_voters(vec![Identity::voter(1), Identity::authority()]);
        assert_eq!(
            check(&spec, &Identity::authority()),
            Err(ValidationError::AuthorityIsVoter.into())
        );
    }

    #[test]
    fn first_failure_is_reported() {
        // Every check fails; authorization comes first.
        let mut spec = ElectionSpec::example()
            .with_voters(vec![Identity::authority()])
            .with_candidates(&[]);
        spec.end_time = spec.start_time;
        assert_eq!(
            check(&spec, &Identity::stranger()),
            Err(ElectionError::Unauthorized)
        );
        assert_eq!(
            check(&spec, &Identity::authority()),
            Err(ValidationError::StartNotBeforeEnd.into())
        );
    }

    #[test]
    fn window_at_millisecond_precision() {
        let authority = Identity::authority();
        let mut spec = ElectionSpec::example();
        spec.end_time += Duration::microseconds(700);

        // Only the sub-millisecond part of the window remains, so it has already closed.
        let now = spec.end_time - Duration::microseconds(300);
        assert_eq!(
            spec.validate(&authority, &authority, now),
            Err(ValidationError::EndInPast.into())
        );

        // Start and end that differ by less than a millisecond coincide.
        let mut spec = ElectionSpec::example();
        spec.end_time = spec.start_time + Duration::microseconds(999);
        assert_eq!(
            check(&spec, &authority),
            Err(ValidationError::StartNotBeforeEnd.into())
        );

        let mut spec = ElectionSpec::example();
        spec.start_time += Duration::microseconds(1_500);
        spec.end_time += Duration::microseconds(2_700);
        let election = spec.clone().into_election(1);
        assert_eq!(
            election.start_time(),
            ElectionSpec::example().start_time + Duration::milliseconds(1)
        );
        assert_eq!(
            election.end_time(),
            ElectionSpec::example().end_time + Duration::milliseconds(2)
        );
    }

    #[test]
    fn built_election() {
        let spec = ElectionSpec::example()
            .with_voters(vec![Identity::voter(2), Identity::voter(1), Identity::voter(2)]);
        let election = spec.into_election(7);

        assert_eq!(election.id(), 7);
        assert_eq!(election.name(), "Student Union President");
        assert_eq!(election.voters().len(), 2);
        assert_eq!(election.candidates().len(), 2);
        assert_eq!(election.candidates().total_votes(), 0);
    }
}
