use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::common::{election::CandidateId, identity::Identity};

use super::errors::EligibilityError;

/// A registered voter. Being present in a [`VoterRoll`] is what makes an
/// identity registered; there is no unregistered entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    identity: Identity,
    /// The candidate voted for. Write-once: set by the first successful vote
    /// and never changed afterwards.
    #[serde(default)]
    choice: Option<CandidateId>,
}

impl Voter {
    fn new(identity: Identity) -> Self {
        Self {
            identity,
            choice: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn choice(&self) -> Option<CandidateId> {
        self.choice
    }

    pub fn has_voted(&self) -> bool {
        self.choice.is_some()
    }
}

/// A voter who has been checked as registered and not yet voted.
/// Holding one is the only way to record a choice.
pub(super) struct UnvotedVoter<'a>(&'a mut Voter);

impl UnvotedVoter<'_> {
    pub(super) fn cast(self, candidate: CandidateId) {
        self.0.choice = Some(candidate);
    }
}

/// The fixed set of voters eligible in one election, in registration order.
///
/// Stored as a plain list; the identity index is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Voter>", into = "Vec<Voter>")]
pub struct VoterRoll {
    voters: Vec<Voter>,
    index: HashMap<Identity, usize>,
}

impl VoterRoll {
    /// Register each identity. Duplicates collapse into a single entry at the
    /// position of their first occurrence.
    pub fn from_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        identities.into_iter().map(Voter::new).collect::<Vec<_>>().into()
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    pub fn is_registered(&self, identity: &Identity) -> bool {
        self.index.contains_key(identity)
    }

    pub fn get(&self, identity: &Identity) -> Option<&Voter> {
        self.index.get(identity).map(|&i| &self.voters[i])
    }

    /// The recorded choice for `identity`, if they are registered and have voted.
    pub fn choice_of(&self, identity: &Identity) -> Option<CandidateId> {
        self.get(identity).and_then(Voter::choice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voter> {
        self.voters.iter()
    }

    /// Number of voters who have voted.
    pub fn turnout(&self) -> usize {
        self.voters.iter().filter(|v| v.has_voted()).count()
    }

    /// Check that `identity` may vote, in order: registered, then not yet voted.
    pub(super) fn unvoted_mut(
        &mut self,
        identity: &Identity,
    ) -> Result<UnvotedVoter<'_>, EligibilityError> {
        let i = *self
            .index
            .get(identity)
            .ok_or(EligibilityError::NotRegistered)?;
        let voter = &mut self.voters[i];
        if voter.has_voted() {
            return Err(EligibilityError::AlreadyVoted);
        }
        Ok(UnvotedVoter(voter))
    }
}

impl From<Vec<Voter>> for VoterRoll {
    fn from(entries: Vec<Voter>) -> Self {
        let mut voters: Vec<Voter> = Vec::with_capacity(entries.len());
        let mut index: HashMap<Identity, usize> = HashMap::with_capacity(entries.len());
        for voter in entries {
            match index.get(&voter.identity).copied() {
                // Keep the first position; a later recorded choice still counts.
                Some(i) => {
                    if voter.choice.is_some() {
                        voters[i].choice = voter.choice;
                    }
                }
                None => {
                    index.insert(voter.identity.clone(), voters.len());
                    voters.push(voter);
                }
            }
        }
        Self { voters, index }
    }
}

impl From<VoterRoll> for Vec<Voter> {
    fn from(roll: VoterRoll) -> Self {
        roll.voters
    }
}
