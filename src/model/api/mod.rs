//! API-compatible types that have no counterpart in the election model.
//!
//! Datetimes are serialised as RFC 3339 strings.

mod vote;

pub use vote::{CreatedElection, VoteRequest};
