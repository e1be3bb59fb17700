mod state;

pub use state::ElectionState;

/// Our election IDs are integers, allocated densely from 1.
pub type ElectionId = u32;
/// Our candidate IDs are integers, dense within each election from 1.
pub type CandidateId = u32;
/// Vote tallies.
pub type VoteCount = u32;

/// The candidate ID reported for a voter who has not voted.
/// Never a valid [`CandidateId`].
pub const NO_CANDIDATE: CandidateId = 0;
