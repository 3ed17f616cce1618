//! Typed errors for the merge engine.
//!
//! Business-rule violations get their own variant carrying the offending
//! values so callers can render precise messages; backend failures are
//! wrapped as [`MergeError::Store`]. Nothing in the engine retries or
//! swallows an error; every failure propagates to the caller.

use chrono::{DateTime, Utc};

use crate::model::ids::{LaunchId, TestItemId};
use crate::model::launch::LaunchStatus;

// ---------------------------------------------------------------------------
// Machine-readable error codes
// ---------------------------------------------------------------------------

/// Machine-readable codes for [`MergeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeErrorCode {
    EmptySources,
    LaunchesNotFound,
    LaunchNotFound,
    ItemNotFound,
    LaunchNotFinished,
    ProjectMismatch,
    InvalidSourceLaunch,
    FinishTimeEarlierThanStartTime,
    StoreFailure,
}

impl MergeErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptySources => "E4001",
            Self::LaunchesNotFound => "E4002",
            Self::LaunchNotFound => "E4003",
            Self::ItemNotFound => "E4004",
            Self::LaunchNotFinished => "E4005",
            Self::ProjectMismatch => "E4006",
            Self::InvalidSourceLaunch => "E4007",
            Self::FinishTimeEarlierThanStartTime => "E4008",
            Self::StoreFailure => "E5001",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while merging launches.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The merge request named no source launches.
    #[error("at least one launch id must be provided for merging")]
    EmptySources,

    /// Some of the requested launch ids do not exist.
    #[error("not all launches were found: requested {requested}, found {found}")]
    LaunchesNotFound { requested: usize, found: usize },

    /// A launch id vanished between validation and merge.
    #[error("launch {0} was not found")]
    LaunchNotFound(LaunchId),

    /// A test item referenced during folding does not exist.
    #[error("test item {0} was not found")]
    ItemNotFound(TestItemId),

    /// A source launch has not finished yet.
    #[error("cannot merge launch {id} with status '{status}'")]
    LaunchNotFinished { id: LaunchId, status: LaunchStatus },

    /// A source launch belongs to a different project.
    #[error("cannot merge launches from different projects: launch {id} belongs to project {actual}, expected {expected}")]
    ProjectMismatch {
        id: LaunchId,
        actual: i64,
        expected: i64,
    },

    /// A source launch is missing the time bounds a merge needs.
    #[error("launch {id} has no finish time and cannot participate in a merge")]
    InvalidSourceLaunch { id: LaunchId },

    /// The resolved (or overridden) time range is inverted.
    #[error("finish time {end} is earlier than start time {start}")]
    FinishTimeEarlierThanStartTime {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A storage backend failed.
    #[error("storage failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl MergeError {
    /// Return the machine-readable error code for this error.
    #[must_use]
    pub const fn code(&self) -> MergeErrorCode {
        match self {
            Self::EmptySources => MergeErrorCode::EmptySources,
            Self::LaunchesNotFound { .. } => MergeErrorCode::LaunchesNotFound,
            Self::LaunchNotFound(_) => MergeErrorCode::LaunchNotFound,
            Self::ItemNotFound(_) => MergeErrorCode::ItemNotFound,
            Self::LaunchNotFinished { .. } => MergeErrorCode::LaunchNotFinished,
            Self::ProjectMismatch { .. } => MergeErrorCode::ProjectMismatch,
            Self::InvalidSourceLaunch { .. } => MergeErrorCode::InvalidSourceLaunch,
            Self::FinishTimeEarlierThanStartTime { .. } => {
                MergeErrorCode::FinishTimeEarlierThanStartTime
            }
            Self::Store(_) => MergeErrorCode::StoreFailure,
        }
    }
}
