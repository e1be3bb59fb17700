use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::{
    election::{CandidateId, ElectionId},
    identity::Identity,
};

/// Append-only notification record, emitted once per successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ElectionEvent {
    ElectionCreated {
        election_id: ElectionId,
        name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    VoteCasted {
        election_id: ElectionId,
        voter: Identity,
        candidate_id: CandidateId,
    },
}

impl Display for ElectionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElectionCreated {
                election_id,
                name,
                start_time,
                end_time,
            } => write!(
                f,
                "ElectionCreated: election {election_id} \"{name}\" open {start_time} until {end_time}"
            ),
            Self::VoteCasted {
                election_id,
                voter,
                candidate_id,
            } => write!(
                f,
                "VoteCasted: election {election_id}, voter {voter}, candidate {candidate_id}"
            ),
        }
    }
}
