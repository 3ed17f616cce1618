//! The launch merge engine.
//!
//! Callers build a [`MergeLaunchesRequest`], pick a [`MergeStrategyType`],
//! and go through [`service::MergeService`] (validation and finalization
//! included) or straight to a [`launch::LaunchMergeStrategy`] resolved from
//! the [`MergeStrategyRegistry`].
//!
//! A merge is single-threaded and synchronous: one request is processed
//! start-to-finish on the calling thread. Correctness depends on the strict
//! reparent, fold, delete sequencing inside [`suite`]. Concurrent merges
//! over disjoint launch sets are fine; merges sharing a source launch must
//! be serialized by the caller, since the engine takes no locks. The engine is
//! not idempotent across retries either: it deletes source rows as it goes,
//! so a failed merge must be inspected, not blindly retried.

pub mod attributes;
pub mod launch;
pub mod service;
pub mod statistics;
pub mod suite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::identity::UniqueIdGenerator;
use crate::model::attribute::ItemAttribute;
use crate::model::ids::LaunchId;
use crate::model::launch::LaunchMode;
use crate::model::{ParseEnumError, normalize};
use crate::store::Repositories;

use self::launch::{BasicLaunchMerge, DeepLaunchMerge, LaunchMergeStrategy};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// The two supported merge algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategyType {
    /// Shallow fold: suite-level items are grouped by name within each
    /// scope; trees below the folded suites run side by side.
    Basic,
    /// Full duplicate-detection fold across all descendants by unique id.
    Deep,
}

impl MergeStrategyType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Deep => "deep",
        }
    }
}

impl fmt::Display for MergeStrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategyType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "basic" => Ok(Self::Basic),
            "deep" => Ok(Self::Deep),
            _ => Err(ParseEnumError {
                expected: "merge strategy type",
                got: s.to_string(),
            }),
        }
    }
}

/// The project a merge runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub id: i64,
    pub name: String,
}

impl ProjectContext {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The user a merge acts as. The merged launch is owned by this user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub id: i64,
    pub login: String,
}

impl UserContext {
    #[must_use]
    pub fn new(id: i64, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
        }
    }
}

/// A caller-supplied merge request: which launches to fold together, which
/// algorithm to use, and optional overrides for the merged launch header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeLaunchesRequest {
    pub launches: Vec<LaunchId>,
    pub merge_type: MergeStrategyType,
    /// Overrides the computed `"Merged: ..."` name.
    pub name: Option<String>,
    /// Overrides the concatenated source descriptions.
    pub description: Option<String>,
    /// Overrides the earliest source start time.
    pub start_time: Option<DateTime<Utc>>,
    /// Overrides the latest source end time.
    pub end_time: Option<DateTime<Utc>>,
    pub mode: Option<LaunchMode>,
    /// When set, replaces attribute inheritance wholesale.
    pub attributes: Option<Vec<ItemAttribute>>,
    /// Append an `@launch 'name #number'` fragment to every top-level item's
    /// description. Purely cosmetic; never affects identity or folding.
    pub extend_suites_description: bool,
}

impl MergeLaunchesRequest {
    /// A request with no overrides.
    #[must_use]
    pub const fn new(launches: Vec<LaunchId>, merge_type: MergeStrategyType) -> Self {
        Self {
            launches,
            merge_type,
            name: None,
            description: None,
            start_time: None,
            end_time: None,
            mode: None,
            attributes: None,
            extend_suites_description: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// Maps a [`MergeStrategyType`] to its orchestrator + item-merge pair.
///
/// The enum is closed, so an unknown *variant* is unrepresentable; unknown
/// merge-type *strings* fail earlier, in [`MergeStrategyType::from_str`].
pub struct MergeStrategyRegistry<'a> {
    basic: BasicLaunchMerge<'a>,
    deep: DeepLaunchMerge<'a>,
}

impl<'a> MergeStrategyRegistry<'a> {
    #[must_use]
    pub const fn new(repos: Repositories<'a>, identity: &'a dyn UniqueIdGenerator) -> Self {
        Self {
            basic: BasicLaunchMerge::new(repos, identity),
            deep: DeepLaunchMerge::new(repos, identity),
        }
    }

    /// Resolve the orchestrator for `merge_type`.
    #[must_use]
    pub fn resolve(&self, merge_type: MergeStrategyType) -> &dyn LaunchMergeStrategy {
        match merge_type {
            MergeStrategyType::Basic => &self.basic,
            MergeStrategyType::Deep => &self.deep,
        }
    }
}
