//! Persisted-storage negotiation
//!
//! [`PersistenceNegotiator`] decides between `never`, `prompt` and `persisted`
//! without surfacing an unsolicited permission prompt. The checks run in a
//! fixed order and short-circuit:
//!
//! 1. persistence authority absent or unable to report status → `never`
//! 2. store already durable → `persisted` (nothing else is touched)
//! 3. permission authority absent or unable to answer → `prompt`
//! 4. permission `granted` → silent upgrade, `persisted` or `UpgradeFailed`;
//!    `prompt` → `prompt`; `denied` or any unrecognized state → `never`
//!
//! The negotiator keeps no state between calls. Every call re-reads the
//! authorities.

use std::sync::Arc;
use std::time::Instant;

use persist_types::{
    Availability, NegotiationOutcome, PermissionState, PersistenceStatus, StorageEstimate,
};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::authority::{PermissionAuthority, PersistenceAuthority};
use crate::config::NegotiatorConfig;
use crate::error::{AuthorityError, NegotiationError, Result};
use crate::report::{NegotiationReport, NegotiationStep, StepRecord};

/// Negotiates persisted storage against a pair of host authorities.
#[derive(Debug, Clone, Default)]
pub struct PersistenceNegotiator {
    persistence: Option<Arc<dyn PersistenceAuthority>>,
    permissions: Option<Arc<dyn PermissionAuthority>>,
    config: NegotiatorConfig,
}

impl PersistenceNegotiator {
    /// Create a negotiator. `None` marks an authority the host does not have.
    pub fn new(
        persistence: Option<Arc<dyn PersistenceAuthority>>,
        permissions: Option<Arc<dyn PermissionAuthority>>,
    ) -> Self {
        Self {
            persistence,
            permissions,
            config: NegotiatorConfig::default(),
        }
    }

    /// Start building a negotiator
    pub fn builder() -> NegotiatorBuilder {
        NegotiatorBuilder::new()
    }

    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    /// Decide whether the store is, can silently become, or can never become
    /// persisted. Upgrades the store only when permission is already granted.
    pub async fn negotiate(&self) -> Result<NegotiationOutcome> {
        Ok(self.negotiate_with_report().await?.outcome)
    }

    /// Same as [`negotiate`](Self::negotiate), returning the steps taken.
    pub async fn negotiate_with_report(&self) -> Result<NegotiationReport> {
        let mut report = NegotiationReport::new(&self.config.capability_name);
        let span = info_span!(
            "negotiate",
            report_id = %report.id,
            capability = %self.config.capability_name
        );

        let outcome = self.run(&mut report).instrument(span).await?;
        report.outcome = outcome;
        info!(
            report_id = %report.id,
            outcome = %outcome,
            steps = report.steps.len(),
            "persistence negotiation settled"
        );
        Ok(report)
    }

    async fn run(&self, report: &mut NegotiationReport) -> Result<NegotiationOutcome> {
        let persistence = match &self.persistence {
            Some(authority) => authority,
            None => {
                debug!("no persistence authority; persistence is never possible");
                report.record(StepRecord::new(
                    NegotiationStep::StatusQuery,
                    "persistence authority absent",
                    0,
                ));
                return Ok(NegotiationOutcome::Never);
            }
        };

        let start = Instant::now();
        let status = persistence.is_persisted().await;
        let duration_us = elapsed_us(start);

        let status = match status {
            Ok(status) => status,
            Err(err) => {
                warn!(authority = persistence.name(), error = %err, "persistence status unavailable");
                report.record(StepRecord::new(
                    NegotiationStep::StatusQuery,
                    err.to_string(),
                    duration_us,
                ));
                return Ok(NegotiationOutcome::Never);
            }
        };
        report.record(StepRecord::new(
            NegotiationStep::StatusQuery,
            status.to_string(),
            duration_us,
        ));
        debug!(%status, "persistence status");

        if status.is_persisted() {
            return Ok(NegotiationOutcome::Persisted);
        }

        let permissions = match &self.permissions {
            Some(authority) => authority,
            None => {
                debug!("no permission authority; deferring to an explicit upgrade");
                report.record(StepRecord::new(
                    NegotiationStep::PermissionQuery,
                    "permission authority absent",
                    0,
                ));
                return Ok(NegotiationOutcome::Prompt);
            }
        };

        let capability = self.config.capability_name.as_str();
        let start = Instant::now();
        let state = permissions.query(capability).await;
        let duration_us = elapsed_us(start);

        let state = match state {
            Ok(state) => state,
            Err(AuthorityError::UnrecognizedState(raw)) => {
                debug!(
                    authority = permissions.name(),
                    capability,
                    state = %raw,
                    "unrecognized permission state; treating as denied"
                );
                report.record(StepRecord::new(
                    NegotiationStep::PermissionQuery,
                    format!("unrecognized state '{}'", raw),
                    duration_us,
                ));
                return Ok(NegotiationOutcome::Never);
            }
            Err(err) => {
                warn!(
                    authority = permissions.name(),
                    capability,
                    error = %err,
                    "permission state unavailable; assuming a prompt may be needed"
                );
                report.record(StepRecord::new(
                    NegotiationStep::PermissionQuery,
                    err.to_string(),
                    duration_us,
                ));
                return Ok(NegotiationOutcome::Prompt);
            }
        };
        report.record(StepRecord::new(
            NegotiationStep::PermissionQuery,
            state.to_string(),
            duration_us,
        ));
        debug!(%state, capability, "permission state");

        match state {
            PermissionState::Granted => self.upgrade(persistence.as_ref(), report).await,
            PermissionState::Prompt => Ok(NegotiationOutcome::Prompt),
            PermissionState::Denied => Ok(NegotiationOutcome::Never),
        }
    }

    async fn upgrade(
        &self,
        persistence: &dyn PersistenceAuthority,
        report: &mut NegotiationReport,
    ) -> Result<NegotiationOutcome> {
        let capability = self.config.capability_name.as_str();
        let start = Instant::now();
        let upgraded = persistence.persist().await;
        let duration_us = elapsed_us(start);

        let reason = match upgraded {
            Ok(true) => {
                report.record(StepRecord::new(NegotiationStep::Upgrade, "upgraded", duration_us));
                info!(authority = persistence.name(), "store upgraded to persisted storage");
                return Ok(NegotiationOutcome::Persisted);
            }
            Ok(false) => "persistence authority declined the upgrade".to_string(),
            Err(err) => err.to_string(),
        };

        report.record(StepRecord::new(NegotiationStep::Upgrade, &reason, duration_us));
        error!(
            authority = persistence.name(),
            capability,
            reason = %reason,
            steps = ?report.steps,
            "upgrade failed although permission was granted"
        );
        Err(NegotiationError::upgrade_failed(
            capability,
            reason,
            report.steps.clone(),
        ))
    }

    /// Current durability tier, or `Unavailable` when it cannot be read.
    pub async fn query_status(&self) -> Availability<PersistenceStatus> {
        let Some(persistence) = &self.persistence else {
            return Availability::Unavailable;
        };
        match persistence.is_persisted().await {
            Ok(status) => Availability::Available(status),
            Err(err) => {
                warn!(authority = persistence.name(), error = %err, "persistence status unavailable");
                Availability::Unavailable
            }
        }
    }

    /// Ask the host to persist the store, unconditionally.
    ///
    /// Unlike [`negotiate`](Self::negotiate) this may show a host prompt;
    /// call it only after the user has chosen to persist.
    pub async fn request_upgrade(&self) -> Availability<bool> {
        let Some(persistence) = &self.persistence else {
            return Availability::Unavailable;
        };
        match persistence.persist().await {
            Ok(upgraded) => {
                info!(authority = persistence.name(), upgraded, "explicit upgrade requested");
                Availability::Available(upgraded)
            }
            Err(AuthorityError::Unsupported(op)) => {
                debug!(authority = persistence.name(), op = %op, "upgrade not supported by host");
                Availability::Unavailable
            }
            Err(err) => {
                warn!(authority = persistence.name(), error = %err, "explicit upgrade failed");
                Availability::Available(false)
            }
        }
    }

    /// Quota and usage of the store.
    pub async fn estimate(&self) -> Availability<StorageEstimate> {
        let Some(persistence) = &self.persistence else {
            return Availability::Unavailable;
        };
        match persistence.estimate().await {
            Ok(estimate) => Availability::Available(estimate),
            Err(err) => {
                debug!(authority = persistence.name(), error = %err, "storage estimate unavailable");
                Availability::Unavailable
            }
        }
    }
}

fn elapsed_us(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Builder for [`PersistenceNegotiator`]
#[derive(Debug, Default)]
pub struct NegotiatorBuilder {
    persistence: Option<Arc<dyn PersistenceAuthority>>,
    permissions: Option<Arc<dyn PermissionAuthority>>,
    config: NegotiatorConfig,
}

impl NegotiatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persistence_authority(mut self, authority: Arc<dyn PersistenceAuthority>) -> Self {
        self.persistence = Some(authority);
        self
    }

    pub fn permission_authority(mut self, authority: Arc<dyn PermissionAuthority>) -> Self {
        self.permissions = Some(authority);
        self
    }

    pub fn config(mut self, config: NegotiatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> PersistenceNegotiator {
        PersistenceNegotiator {
            persistence: self.persistence,
            permissions: self.permissions,
            config: self.config,
        }
    }
}
