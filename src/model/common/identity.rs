use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated caller, as vouched for by the identity provider.
///
/// Identities are opaque to this service: the only operation that matters is
/// equality, e.g. against the election authority or a voter roll entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("identity must not be empty")]
pub struct EmptyIdentity;

impl Identity {
    /// Wrap the given identity string.
    ///
    /// Prefer [`str::parse`] for untrusted input, which rejects blank identities.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identity {
    type Err = EmptyIdentity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err(EmptyIdentity)
        } else {
            Ok(Self(s.to_string()))
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
