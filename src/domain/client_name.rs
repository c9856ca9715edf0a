//! Client name attribute.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The name a connection claims via `join_remote`.
///
/// Equality is exact, case-sensitive string equality: `"Alice"` and
/// `"alice"` are two different clients. Uniqueness among currently-registered
/// connections is enforced by the registry, not here — a `ClientName` value
/// by itself is just a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientName(String);

impl ClientName {
    /// Creates a `ClientName` from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for ClientName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
