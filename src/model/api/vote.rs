use serde::{Deserialize, Serialize};

use crate::model::common::election::{CandidateId, ElectionId};

/// Body of a vote submission. The voter is whoever is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
}

/// Response to a successful election creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedElection {
    pub id: ElectionId,
}
