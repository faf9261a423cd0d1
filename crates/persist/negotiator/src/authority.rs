//! Host authority traits.
//!
//! The negotiator never talks to a host directly. Both authorities are handed
//! in explicitly so tests and embedders can substitute their own. An absent
//! authority is `None` at construction; an authority that exists but cannot
//! perform an operation returns [`AuthorityError::Unsupported`].
//!
//! [`AuthorityError::Unsupported`]: crate::AuthorityError::Unsupported

use async_trait::async_trait;
use persist_types::{PermissionState, PersistenceStatus, StorageEstimate};

use crate::error::AuthorityResult;

/// Reports and upgrades the durability tier of a store.
#[async_trait]
pub trait PersistenceAuthority: Send + Sync + std::fmt::Debug {
    /// Current durability tier.
    async fn is_persisted(&self) -> AuthorityResult<PersistenceStatus>;

    /// Attempt the upgrade to persisted storage.
    ///
    /// `Ok(false)` means the host declined. The host may show its own
    /// prompt while servicing this call.
    async fn persist(&self) -> AuthorityResult<bool>;

    /// Quota and usage of the store.
    async fn estimate(&self) -> AuthorityResult<StorageEstimate>;

    /// Name used in logs and reports.
    fn name(&self) -> &str {
        "persistence-authority"
    }
}

/// Reports the permission state of a named capability.
#[async_trait]
pub trait PermissionAuthority: Send + Sync + std::fmt::Debug {
    /// Read-only query; must never prompt the user.
    async fn query(&self, capability: &str) -> AuthorityResult<PermissionState>;

    /// Name used in logs and reports.
    fn name(&self) -> &str {
        "permission-authority"
    }
}
