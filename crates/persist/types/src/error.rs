use thiserror::Error;

/// Error parsing one of the negotiation enums from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown permission state: {0}")]
    PermissionState(String),

    #[error("unknown negotiation outcome: {0}")]
    NegotiationOutcome(String),

    #[error("unknown persistence status: {0}")]
    PersistenceStatus(String),
}
