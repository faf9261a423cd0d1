//! In-memory authorities.
//!
//! Deterministic, scriptable stand-ins for host authorities. Every call is
//! counted so callers can assert which checks a negotiation performed.

use crate::authority::{PermissionAuthority, PersistenceAuthority};
use crate::error::{AuthorityError, AuthorityResult};
use async_trait::async_trait;
use persist_types::{PermissionState, PersistenceStatus, StorageEstimate, PERSISTENT_STORAGE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct PersistenceState {
    status: PersistenceStatus,
    upgrade_granted: bool,
    status_error: Option<AuthorityError>,
    persist_error: Option<AuthorityError>,
    estimate: Option<StorageEstimate>,
}

impl Default for PersistenceState {
    fn default() -> Self {
        Self {
            status: PersistenceStatus::BestEffort,
            upgrade_granted: true,
            status_error: None,
            persist_error: None,
            estimate: None,
        }
    }
}

/// In-memory persistence authority.
///
/// Starts best-effort; `persist()` upgrades it unless configured to decline.
#[derive(Debug, Default)]
pub struct InMemoryPersistenceAuthority {
    state: RwLock<PersistenceState>,
    status_calls: AtomicUsize,
    persist_calls: AtomicUsize,
    estimate_calls: AtomicUsize,
}

impl InMemoryPersistenceAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// An authority whose store is already durable.
    pub fn persisted() -> Self {
        Self::new().with_status(PersistenceStatus::Persisted)
    }

    pub fn with_status(self, status: PersistenceStatus) -> Self {
        self.update(|s| s.status = status);
        self
    }

    /// Whether `persist()` succeeds.
    pub fn with_upgrade_result(self, granted: bool) -> Self {
        self.update(|s| s.upgrade_granted = granted);
        self
    }

    pub fn with_status_error(self, error: AuthorityError) -> Self {
        self.update(|s| s.status_error = Some(error));
        self
    }

    pub fn with_persist_error(self, error: AuthorityError) -> Self {
        self.update(|s| s.persist_error = Some(error));
        self
    }

    pub fn with_estimate(self, estimate: StorageEstimate) -> Self {
        self.update(|s| s.estimate = Some(estimate));
        self
    }

    /// Change the durability tier behind the negotiator's back, as a host
    /// eviction or a user settings change would.
    pub fn set_status(&self, status: PersistenceStatus) {
        self.update(|s| s.status = status);
    }

    /// Current tier without counting a call.
    pub fn current_status(&self) -> PersistenceStatus {
        self.read().status
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    fn update(&self, f: impl FnOnce(&mut PersistenceState)) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }

    fn read(&self) -> PersistenceState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl PersistenceAuthority for InMemoryPersistenceAuthority {
    async fn is_persisted(&self) -> AuthorityResult<PersistenceStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.read();
        match state.status_error {
            Some(err) => Err(err),
            None => Ok(state.status),
        }
    }

    async fn persist(&self) -> AuthorityResult<bool> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        let mut guard = self
            .state
            .write()
            .map_err(|_| AuthorityError::Host("persistence state lock poisoned".to_string()))?;

        if let Some(err) = &guard.persist_error {
            return Err(err.clone());
        }
        if guard.upgrade_granted {
            guard.status = PersistenceStatus::Persisted;
        }
        Ok(guard.upgrade_granted)
    }

    async fn estimate(&self) -> AuthorityResult<StorageEstimate> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.read()
            .estimate
            .ok_or_else(|| AuthorityError::Unsupported("estimate".to_string()))
    }

    fn name(&self) -> &str {
        "in-memory-persistence"
    }
}

/// In-memory permission authority.
///
/// Capabilities without a configured state are reported as unsupported,
/// the way a host rejects an unknown permission name. Raw host strings set
/// with [`with_host_state`](Self::with_host_state) are parsed on every query.
#[derive(Debug, Default)]
pub struct InMemoryPermissionAuthority {
    states: RwLock<HashMap<String, PermissionState>>,
    host_states: RwLock<HashMap<String, String>>,
    query_error: RwLock<Option<AuthorityError>>,
    query_calls: AtomicUsize,
}

impl InMemoryPermissionAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authority answering `state` for the persistent-storage capability.
    pub fn with_persistent_storage(state: PermissionState) -> Self {
        Self::new().with_state(PERSISTENT_STORAGE, state)
    }

    pub fn with_state(self, capability: impl Into<String>, state: PermissionState) -> Self {
        self.set_state(capability, state);
        self
    }

    /// Answer `capability` with a host-provided state string.
    pub fn with_host_state(self, capability: impl Into<String>, raw: impl Into<String>) -> Self {
        let mut guard = match self.host_states.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(capability.into(), raw.into());
        drop(guard);
        self
    }

    /// Fail every query with `error`.
    pub fn with_query_error(self, error: AuthorityError) -> Self {
        let mut guard = match self.query_error.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(error);
        drop(guard);
        self
    }

    pub fn set_state(&self, capability: impl Into<String>, state: PermissionState) {
        let mut guard = match self.states.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(capability.into(), state);
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionAuthority for InMemoryPermissionAuthority {
    async fn query(&self, capability: &str) -> AuthorityResult<PermissionState> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .query_error
            .read()
            .map_err(|_| AuthorityError::Host("permission error lock poisoned".to_string()))?
            .clone();
        if let Some(err) = injected {
            return Err(err);
        }

        let known = self
            .states
            .read()
            .map_err(|_| AuthorityError::Host("permission state lock poisoned".to_string()))?
            .get(capability)
            .copied();
        if let Some(state) = known {
            return Ok(state);
        }

        let host_states = self
            .host_states
            .read()
            .map_err(|_| AuthorityError::Host("permission state lock poisoned".to_string()))?;
        match host_states.get(capability) {
            Some(raw) => Ok(raw.parse::<PermissionState>()?),
            None => Err(AuthorityError::Unsupported(format!(
                "unknown capability '{}'",
                capability
            ))),
        }
    }

    fn name(&self) -> &str {
        "in-memory-permissions"
    }
}
