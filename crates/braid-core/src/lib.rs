#![forbid(unsafe_code)]
//! braid-core: the launch & test-item merge engine.
//!
//! Braid combines N independently executed test launches (each a tree of
//! suites/tests/steps with pass/fail statistics) into one logical launch:
//! tree restructuring, duplicate detection, statistics re-aggregation,
//! attribute policy, and time-range reconciliation.
//!
//! The engine is a library: it is handed repository handles
//! ([`store::Repositories`]) and an identity generator, and invoked through
//! [`merge::service::MergeService`]. Two stores ship in-crate
//! ([`store::memory::InMemoryStore`], [`store::sqlite::SqliteStore`]).
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::MergeError`] at the engine boundary,
//!   `anyhow::Result` inside the storage layer.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod error;
pub mod identity;
pub mod merge;
pub mod model;
pub mod store;

pub use error::{MergeError, MergeErrorCode};
pub use merge::service::MergeService;
pub use merge::{MergeLaunchesRequest, MergeStrategyType, ProjectContext, UserContext};
