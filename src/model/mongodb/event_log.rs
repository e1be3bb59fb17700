use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::election::ElectionEvent;

/// A notification record as persisted, stamped with the instant it was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: ElectionEvent,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(event: ElectionEvent, recorded_at: DateTime<Utc>) -> Self {
        Self { event, recorded_at }
    }
}
