//! Error types for persisted-storage negotiation.
//!
//! Missing capabilities and "would prompt" are ordinary outcomes, not errors.
//! The only exceptional case is an upgrade that fails after the permission
//! authority reported the capability as granted.

use persist_types::ParseError;
use thiserror::Error;

use crate::report::StepRecord;

/// Result type for negotiation.
pub type Result<T> = std::result::Result<T, NegotiationError>;

/// Result type returned by authority implementations.
pub type AuthorityResult<T> = std::result::Result<T, AuthorityError>;

/// Errors surfaced to callers of `negotiate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    /// Permission was granted but the persistence authority did not upgrade.
    #[error("upgrade to persisted storage failed although '{capability}' was granted: {reason}")]
    UpgradeFailed {
        capability: String,
        reason: String,
        /// Steps the negotiation ran, ending with the failed upgrade
        steps: Vec<StepRecord>,
    },
}

impl NegotiationError {
    pub fn upgrade_failed(
        capability: impl Into<String>,
        reason: impl Into<String>,
        steps: Vec<StepRecord>,
    ) -> Self {
        Self::UpgradeFailed {
            capability: capability.into(),
            reason: reason.into(),
            steps,
        }
    }

    /// Steps recorded before the negotiation failed
    pub fn steps(&self) -> &[StepRecord] {
        match self {
            Self::UpgradeFailed { steps, .. } => steps,
        }
    }
}

/// Errors reported by a host authority.
///
/// The negotiator collapses these into "unavailable"; they never reach the
/// caller of `negotiate` except as the reason of an upgrade failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// The authority exists but cannot perform this operation.
    #[error("operation not supported by host: {0}")]
    Unsupported(String),

    /// The host failed internally while servicing the call.
    #[error("host failure: {0}")]
    Host(String),

    /// The host answered with a state outside the known set.
    ///
    /// A permission query answering this way settles the negotiation as
    /// `never`, the same as `denied`.
    #[error("host reported an unrecognized state: {0}")]
    UnrecognizedState(String),
}

impl AuthorityError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_unrecognized_state(&self) -> bool {
        matches!(self, Self::UnrecognizedState(_))
    }
}

impl From<ParseError> for AuthorityError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::PermissionState(raw)
            | ParseError::NegotiationOutcome(raw)
            | ParseError::PersistenceStatus(raw) => Self::UnrecognizedState(raw),
        }
    }
}
