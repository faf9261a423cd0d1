//! Permission authority disposition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// The permission authority's current disposition toward a capability.
///
/// Queried read-only; querying never triggers a user-facing prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The capability may be exercised without asking the user.
    Granted,
    /// Exercising the capability would ask the user first.
    Prompt,
    /// The capability will not be granted.
    Denied,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Prompt => write!(f, "prompt"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

impl FromStr for PermissionState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(Self::Granted),
            "prompt" => Ok(Self::Prompt),
            "denied" => Ok(Self::Denied),
            other => Err(ParseError::PermissionState(other.to_string())),
        }
    }
}
