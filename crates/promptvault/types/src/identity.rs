use serde::{Deserialize, Serialize};
use std::fmt;

/// A caller identity used for authorization checks.
///
/// Every mutating operation carries one, and each component compares it
/// against the relevant stored field (`admin`, `author`, `owner`) before
/// allowing the mutation. There is no ambient trust.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity of a protocol-owned custody account (vault treasury,
    /// stake pool). Custody identities never sign calls; they only appear
    /// as transfer endpoints.
    pub fn custody(tag: &str) -> Self {
        Self(format!("custody:{tag}"))
    }

    /// Create an Identity for testing purposes.
    /// Each call produces a unique, random identity.
    pub fn ephemeral() -> Self {
        Self(format!("ephemeral:{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
