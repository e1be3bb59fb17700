use std::sync::Arc;

use log::{debug, info};
use rocket::{async_trait, tokio::sync::RwLock};

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{
    common::{
        election::{CandidateId, ElectionId},
        identity::Identity,
    },
    election::{ElectionEvent, ElectionSpec, ElectionSummary, ElectionView},
    registry::ElectionRegistry,
};

use super::ElectionStore;

/// Keeps the registry in process memory. Nothing survives a restart.
///
/// Mutations hold the write lock for their whole duration, so they are
/// serialised and never observed half-done.
pub struct MemoryStore {
    registry: RwLock<ElectionRegistry>,
}

impl MemoryStore {
    pub fn new(authority: Identity, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: RwLock::new(ElectionRegistry::new(authority, clock)),
        }
    }

    /// Every notification record so far, oldest first.
    pub async fn events(&self) -> Vec<ElectionEvent> {
        self.registry.read().await.events().to_vec()
    }
}

#[async_trait]
impl ElectionStore for MemoryStore {
    async fn create_election(&self, caller: &Identity, spec: ElectionSpec) -> Result<ElectionId> {
        let mut registry = self.registry.write().await;
        match registry.create_election(caller, spec) {
            Ok(id) => {
                if let Some(event) = registry.events().last() {
                    info!("{event}");
                }
                Ok(id)
            }
            Err(err) => {
                debug!("Rejected election from {caller}: {err}");
                Err(err.into())
            }
        }
    }

    async fn vote(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<()> {
        let mut registry = self.registry.write().await;
        match registry.vote(caller, election_id, candidate_id) {
            Ok(()) => {
                if let Some(event) = registry.events().last() {
                    info!("{event}");
                }
                Ok(())
            }
            Err(err) => {
                debug!("Rejected vote by {caller} in election {election_id}: {err}");
                Err(err.into())
            }
        }
    }

    async fn election_details(
        &self,
        caller: &Identity,
        election_id: ElectionId,
    ) -> Result<ElectionView> {
        let registry = self.registry.read().await;
        Ok(registry.election_details(caller, election_id)?)
    }

    async fn elections(&self, caller: &Identity) -> Result<Vec<ElectionSummary>> {
        Ok(self.registry.read().await.elections(caller))
    }
}
