use serde::{Deserialize, Serialize};

/// Quota and usage reported by the persistence authority, in bytes.
///
/// Diagnostic only; the negotiation never consults it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEstimate {
    pub quota: u64,
    pub usage: u64,
}

impl StorageEstimate {
    pub fn new(quota: u64, usage: u64) -> Self {
        Self { quota, usage }
    }

    /// Bytes left before the quota is reached.
    pub fn remaining(&self) -> u64 {
        self.quota.saturating_sub(self.usage)
    }

    /// Fraction of the quota in use, or `None` for a zero quota.
    pub fn usage_ratio(&self) -> Option<f64> {
        if self.quota == 0 {
            None
        } else {
            Some(self.usage as f64 / self.quota as f64)
        }
    }
}
