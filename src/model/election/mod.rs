pub use candidates::{Candidate, CandidateRoster};
pub use election_core::Election;
pub use errors::{
    ElectionError, EligibilityError, RangeError, TemporalError, ValidationError,
};
pub use event::ElectionEvent;
pub use spec::ElectionSpec;
pub use view::{CandidateView, ElectionSummary, ElectionView};
pub use voters::{Voter, VoterRoll};

mod candidates;
mod election_core;
mod errors;
mod event;
mod spec;
mod view;
mod voters;
