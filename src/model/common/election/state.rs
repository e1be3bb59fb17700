use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// States in the Election lifecycle.
///
/// These are never stored: they are recomputed from the schedule and the
/// current time on every call, so an election can never be observed in a
/// stale state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// The start time has not yet been reached.
    Scheduled,
    /// Between the start time (inclusive) and end time (exclusive); votes are accepted.
    Open,
    /// The end time has passed. Terminal.
    Closed,
}

impl ElectionState {
    /// Derive the state of an election with the given schedule at time `now`.
    pub fn at(start_time: DateTime<Utc>, end_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now >= end_time {
            Self::Closed
        } else if now >= start_time {
            Self::Open
        } else {
            Self::Scheduled
        }
    }

    /// Are results and per-voter choices visible in this state?
    pub fn has_ended(self) -> bool {
        self == Self::Closed
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn boundaries() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let end = start + Duration::hours(8);

        assert_eq!(
            ElectionState::at(start, end, start - Duration::seconds(1)),
            ElectionState::Scheduled
        );
        // Start is inclusive, end is exclusive.
        assert_eq!(ElectionState::at(start, end, start), ElectionState::Open);
        assert_eq!(
            ElectionState::at(start, end, end - Duration::milliseconds(1)),
            ElectionState::Open
        );
        assert_eq!(ElectionState::at(start, end, end), ElectionState::Closed);
        assert_eq!(
            ElectionState::at(start, end, end + Duration::days(365)),
            ElectionState::Closed
        );
    }

    #[test]
    fn only_closed_has_ended() {
        assert!(!ElectionState::Scheduled.has_ended());
        assert!(!ElectionState::Open.has_ended());
        assert!(ElectionState::Closed.has_ended());
    }
}
