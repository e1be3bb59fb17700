//! Types shared by every layer: identifiers, identities and lifecycle states.

pub mod election;
pub mod identity;
