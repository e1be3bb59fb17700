use std::sync::Arc;

use crate::clock::Clock;
use crate::model::{
    common::{
        election::{CandidateId, ElectionId},
        identity::Identity,
    },
    election::{
        Election, ElectionError, ElectionEvent, ElectionSpec, ElectionSummary, ElectionView,
        RangeError,
    },
};

/// Owns every election, keyed densely by ID from 1.
///
/// Each operation reads the clock once, up front, and uses that instant for
/// every check it makes. A failed operation leaves the registry untouched.
pub struct ElectionRegistry {
    /// The only identity allowed to create elections.
    authority: Identity,
    /// Election `n` lives at index `n - 1`.
    elections: Vec<Election>,
    /// Notification records, in commit order.
    events: Vec<ElectionEvent>,
    clock: Arc<dyn Clock>,
}

impl ElectionRegistry {
    pub fn new(authority: Identity, clock: Arc<dyn Clock>) -> Self {
        Self {
            authority,
            elections: Vec::new(),
            events: Vec::new(),
            clock,
        }
    }

    /// Number of elections ever created; also the highest valid ID.
    pub fn election_count(&self) -> ElectionId {
        // Creation never lets the count exceed the ID range.
        ElectionId::try_from(self.elections.len()).unwrap_or(ElectionId::MAX)
    }

    /// Create an election from `spec` on behalf of `caller`, returning its ID.
    pub fn create_election(
        &mut self,
        caller: &Identity,
        spec: ElectionSpec,
    ) -> Result<ElectionId, ElectionError> {
        let now = self.clock.now();
        spec.validate(caller, &self.authority, now)?;

        let id = Self::id_after(self.elections.len()).ok_or(RangeError::IdsExhausted)?;
        let election = spec.into_election(id);
        self.events.push(election.created_event());
        self.elections.push(election);
        Ok(id)
    }

    pub fn get_election(&self, id: ElectionId) -> Result<&Election, ElectionError> {
        Self::index(id)
            .and_then(|i| self.elections.get(i))
            .ok_or_else(|| RangeError::NoSuchElection(id).into())
    }

    fn get_election_mut(&mut self, id: ElectionId) -> Result<&mut Election, ElectionError> {
        Self::index(id)
            .and_then(|i| self.elections.get_mut(i))
            .ok_or_else(|| RangeError::NoSuchElection(id).into())
    }

    /// Cast `caller`'s vote for `candidate_id` in election `election_id`.
    pub fn vote(
        &mut self,
        caller: &Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<(), ElectionError> {
        let now = self.clock.now();
        let event = self
            .get_election_mut(election_id)?
            .vote(caller, candidate_id, now)?;
        self.events.push(event);
        Ok(())
    }

    /// Details of one election as `caller` may see them right now.
    pub fn election_details(
        &self,
        caller: &Identity,
        id: ElectionId,
    ) -> Result<ElectionView, ElectionError> {
        let now = self.clock.now();
        Ok(ElectionView::project(self.get_election(id)?, caller, now))
    }

    /// Every election `caller` is related to, in ID order.
    pub fn elections(&self, caller: &Identity) -> Vec<ElectionSummary> {
        let now = self.clock.now();
        self.elections
            .iter()
            .filter(|election| election.concerns(caller, &self.authority))
            .map(|election| ElectionSummary::project(election, caller, now))
            .collect()
    }

    /// Every notification record so far, oldest first.
    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    /// The ID of the next election once `count` exist, if there is one.
    fn id_after(count: usize) -> Option<ElectionId> {
        ElectionId::try_from(count).ok()?.checked_add(1)
    }

    fn index(id: ElectionId) -> Option<usize> {
        usize::try_from(id).ok()?.checked_sub(1)
    }
}
