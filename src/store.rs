//! Where elections live between requests.
//!
//! Every implementation commits each mutation atomically and serialises it
//! against conflicting mutations; a failed operation leaves no trace.

use rocket::async_trait;

use crate::error::Result;
use crate::model::{
    common::{
        election::{CandidateId, ElectionId},
        identity::Identity,
    },
    election::{ElectionSpec, ElectionSummary, ElectionView},
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// The election operations, on behalf of an authenticated caller.
#[async_trait]
pub trait ElectionStore: Send + Sync {
    /// Create an election; only the authority may do this.
    async fn create_election(&self, caller: &Identity, spec: ElectionSpec) -> Result<ElectionId>;

    /// Cast `caller`'s single vote in an open election.
    async fn vote(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<()>;

    /// Details of one election, gated by whether it has closed.
    async fn election_details(&self, caller: &Identity, election_id: ElectionId)
        -> Result<ElectionView>;

    /// Summaries of every election `caller` is related to, in ID order.
    async fn elections(&self, caller: &Identity) -> Result<Vec<ElectionSummary>>;
}

/// The store held in managed state.
pub type Store = Box<dyn ElectionStore>;
