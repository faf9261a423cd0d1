//! Durability tier reported by the persistence authority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Current retention tier of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceStatus {
    /// Default tier; the host may evict it under storage pressure.
    BestEffort,
    /// Durable tier; not subject to silent eviction.
    Persisted,
}

impl PersistenceStatus {
    /// Check if the store is durable.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

impl From<bool> for PersistenceStatus {
    fn from(persisted: bool) -> Self {
        if persisted {
            Self::Persisted
        } else {
            Self::BestEffort
        }
    }
}

impl From<PersistenceStatus> for bool {
    fn from(status: PersistenceStatus) -> Self {
        status.is_persisted()
    }
}

impl fmt::Display for PersistenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best-effort"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

impl FromStr for PersistenceStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best-effort" => Ok(Self::BestEffort),
            "persisted" => Ok(Self::Persisted),
            other => Err(ParseError::PersistenceStatus(other.to_string())),
        }
    }
}
