//! Negotiation outcome.
//!
//! The three values a negotiation may settle on. Upgrade failure is not an
//! outcome; it is surfaced as an error by the negotiator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Result of negotiating persisted storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationOutcome {
    /// The store can never become persisted here; do not offer a prompt.
    Never,
    /// Persisting would (or might) ask the user; leave it to caller UI.
    Prompt,
    /// The store is durable, either already or after a silent upgrade.
    Persisted,
}

impl NegotiationOutcome {
    /// Check if the store ended up durable
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// Check if persistence is impossible
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Check if the caller should offer its own consent flow
    pub fn requires_prompt(&self) -> bool {
        matches!(self, Self::Prompt)
    }
}

impl fmt::Display for NegotiationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Prompt => write!(f, "prompt"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

impl FromStr for NegotiationOutcome {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "prompt" => Ok(Self::Prompt),
            "persisted" => Ok(Self::Persisted),
            other => Err(ParseError::NegotiationOutcome(other.to_string())),
        }
    }
}
