//! Stable deck identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a stored deck.
///
/// Allocated once per generation request, before any slide is produced, so
/// repeated stores of the same invocation land on the same record.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(uuid::Uuid);

impl DeckId {
    /// Create a new random DeckId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for DeckId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for DeckId {
    type Err = crate::DeckError;

    fn from_str(s: &str) -> crate::Result<Self> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| crate::DeckError::InvalidId(format!("'{}': {}", s, e)))
    }
}

impl fmt::Debug for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeckId({})", self.0)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
