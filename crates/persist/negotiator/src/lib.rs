//! # Persisted Storage Negotiation
//!
//! Decides whether a client-side store can move from best-effort to
//! persisted retention without surprising the user with a permission prompt,
//! and performs the upgrade silently when the host already grants it.
//!
//! ## Overview
//!
//! A negotiation settles on one of three outcomes:
//!
//! - **never**: the host has no way to persist the store; do not offer a prompt
//! - **prompt**: persisting would, or might, ask the user; leave it to caller UI
//! - **persisted**: the store is durable, already or after a silent upgrade
//!
//! The host capabilities are reached through two traits, handed to the
//! negotiator explicitly:
//!
//! - [`PersistenceAuthority`]: reports and upgrades the durability tier
//! - [`PermissionAuthority`]: reports the permission state of a capability
//!
//! A missing authority is an expected condition, not an error. The only
//! error is [`NegotiationError::UpgradeFailed`]: permission was granted yet the
//! upgrade did not happen.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use persist_negotiator::{
//!     InMemoryPermissionAuthority, InMemoryPersistenceAuthority, NegotiationOutcome,
//!     PermissionState, PersistenceNegotiator,
//! };
//!
//! # async fn example() -> persist_negotiator::Result<()> {
//! let negotiator = PersistenceNegotiator::builder()
//!     .persistence_authority(Arc::new(InMemoryPersistenceAuthority::new()))
//!     .permission_authority(Arc::new(InMemoryPermissionAuthority::with_persistent_storage(
//!         PermissionState::Prompt,
//!     )))
//!     .build();
//!
//! match negotiator.negotiate().await? {
//!     NegotiationOutcome::Persisted => println!("store is durable"),
//!     NegotiationOutcome::Prompt => {
//!         // show an explanation, then on user consent:
//!         let _ = negotiator.request_upgrade().await;
//!     }
//!     NegotiationOutcome::Never => println!("persistence not available here"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Audit Trail
//!
//! [`PersistenceNegotiator::negotiate_with_report`] returns a
//! [`NegotiationReport`] listing each check that ran and what it observed.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod authority;
pub mod config;
pub mod error;
pub mod memory;
pub mod negotiator;
pub mod report;
pub mod telemetry;

// Re-exports
pub use authority::{PermissionAuthority, PersistenceAuthority};
pub use config::{LoggingConfig, NegotiatorConfig};
pub use error::{AuthorityError, AuthorityResult, NegotiationError, Result};
pub use memory::{InMemoryPermissionAuthority, InMemoryPersistenceAuthority};
pub use negotiator::{NegotiatorBuilder, PersistenceNegotiator};
pub use report::{NegotiationReport, NegotiationStep, StepRecord};
pub use telemetry::init_tracing;

pub use persist_types::{
    Availability, NegotiationOutcome, PermissionState, PersistenceStatus, StorageEstimate,
    PERSISTENT_STORAGE,
};
