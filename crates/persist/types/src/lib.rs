//! # persist-types
//!
//! Transient value types exchanged during a persisted-storage negotiation.
//!
//! Every value here lives for a single negotiation: it is produced by a host
//! authority (or by the negotiator itself), consumed once and discarded. None
//! of them carry identity or storage of their own.
//!
//! - [`PersistenceStatus`]: whether the store is currently durable
//! - [`PermissionState`]: the host's disposition toward the capability
//! - [`NegotiationOutcome`]: `never`, `prompt` or `persisted`
//! - [`StorageEstimate`]: quota/usage diagnostic
//! - [`Availability`]: the `unavailable` sentinel for auxiliary queries

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod availability;
mod error;
mod estimate;
mod outcome;
mod permission;
mod status;

pub use availability::Availability;
pub use error::ParseError;
pub use estimate::StorageEstimate;
pub use outcome::NegotiationOutcome;
pub use permission::PermissionState;
pub use status::PersistenceStatus;

/// Capability name the permission authority is queried with by default.
pub const PERSISTENT_STORAGE: &str = "persistent-storage";
