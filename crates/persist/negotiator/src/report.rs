//! Negotiation reports
//!
//! A report records which checks a negotiation actually performed and what
//! each one observed, so hosts can audit why a store was (or was not)
//! upgraded.

use chrono::{DateTime, Utc};
use persist_types::NegotiationOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A check performed during negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStep {
    /// Persistence authority availability and current status
    StatusQuery,
    /// Permission authority availability and capability state
    PermissionQuery,
    /// Silent upgrade attempt
    Upgrade,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationStep::StatusQuery => write!(f, "status_query"),
            NegotiationStep::PermissionQuery => write!(f, "permission_query"),
            NegotiationStep::Upgrade => write!(f, "upgrade"),
        }
    }
}

/// Record of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Which check ran
    pub step: NegotiationStep,

    /// What the authority answered, or why it could not
    pub observation: String,

    /// Time spent waiting on the authority, in microseconds
    pub duration_us: u64,
}

impl StepRecord {
    /// Create a new step record
    pub fn new(step: NegotiationStep, observation: impl Into<String>, duration_us: u64) -> Self {
        Self {
            step,
            observation: observation.into(),
            duration_us,
        }
    }
}

/// Audit report for one negotiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationReport {
    /// Unique identifier for this negotiation
    pub id: String,

    /// Capability consulted on the permission authority
    pub capability: String,

    /// When the negotiation started
    pub started_at: DateTime<Utc>,

    /// Steps in the order they ran
    pub steps: Vec<StepRecord>,

    /// Final outcome
    pub outcome: NegotiationOutcome,
}

impl NegotiationReport {
    /// Create a report that has not run any step yet.
    ///
    /// The outcome starts as `Never` and is overwritten when the
    /// negotiation settles.
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            capability: capability.into(),
            started_at: Utc::now(),
            steps: Vec::new(),
            outcome: NegotiationOutcome::Never,
        }
    }

    /// Append a step record
    pub fn record(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    /// Check whether a given step ran
    pub fn ran(&self, step: NegotiationStep) -> bool {
        self.steps.iter().any(|r| r.step == step)
    }

    /// Whether the negotiation mutated the store's durability
    pub fn attempted_upgrade(&self) -> bool {
        self.ran(NegotiationStep::Upgrade)
    }

    /// Total time spent waiting on authorities
    pub fn total_duration_us(&self) -> u64 {
        self.steps
            .iter()
            .fold(0u64, |total, r| total.saturating_add(r.duration_us))
    }
}
