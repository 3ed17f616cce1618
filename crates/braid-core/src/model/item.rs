//! Test items: the nodes of a launch's execution tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use super::{
    ParseEnumError,
    ids::{LaunchId, TestItemId},
    normalize,
};

/// Kind of a test item, ordered by nesting level.
///
/// Suite-level items (level 0) sit directly under the launch; each further
/// level nests one step deeper. The merge engine uses the level both for the
/// "suite" predicate of the shallow fold and for the description suffix on
/// top-level items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestItemType {
    Suite,
    Story,
    Test,
    Scenario,
    Step,
}

impl TestItemType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Suite => "suite",
            Self::Story => "story",
            Self::Test => "test",
            Self::Scenario => "scenario",
            Self::Step => "step",
        }
    }

    /// Nesting level of the item type; suites are level 0.
    #[must_use]
    pub const fn nesting_level(self) -> u8 {
        match self {
            Self::Suite => 0,
            Self::Story => 1,
            Self::Test => 2,
            Self::Scenario => 3,
            Self::Step => 4,
        }
    }

    /// Returns `true` for top-level (suite-depth) item types.
    #[must_use]
    pub const fn is_suite_level(self) -> bool {
        self.nesting_level() == 0
    }
}

/// Execution status of a test item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Passed,
    Failed,
    Skipped,
    Interrupted,
}

impl ItemStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Interrupted => "interrupted",
        }
    }
}

/// A key/value pair parameterizing a test invocation. The key is optional;
/// positional parameters carry only a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub key: Option<String>,
    pub value: String,
}

impl Parameter {
    #[must_use]
    pub fn new(key: Option<&str>, value: &str) -> Self {
        Self {
            key: key.map(str::to_string),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{key}={}", self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// A defect classification attached to a failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Locator of the defect type, e.g. `pb001` (product bug).
    pub issue_type: String,
    pub comment: Option<String>,
}

/// Result half of a test item: filled in when the item finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResults {
    pub status: ItemStatus,
    pub end_time: Option<DateTime<Utc>>,
    pub issue: Option<Issue>,
}

impl ItemResults {
    #[must_use]
    pub const fn finished(status: ItemStatus, end_time: DateTime<Utc>) -> Self {
        Self {
            status,
            end_time: Some(end_time),
            issue: None,
        }
    }
}

/// A node in a launch's execution tree.
///
/// `parent_id` is `None` for items directly under the launch. The invariant
/// the merge engine must uphold: after a merge completes, every item's parent
/// (when set) belongs to the same launch as the item itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    pub id: TestItemId,
    pub name: String,
    pub item_type: TestItemType,
    pub parent_id: Option<TestItemId>,
    pub launch_id: LaunchId,
    /// Stable identity fingerprint, computed from the item's position and
    /// parameterization. `None` for items reported before fingerprinting.
    pub unique_id: Option<String>,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub tags: BTreeSet<String>,
    pub parameters: Vec<Parameter>,
    pub results: ItemResults,
}

impl fmt::Display for TestItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestItemType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "suite" => Ok(Self::Suite),
            "story" => Ok(Self::Story),
            "test" => Ok(Self::Test),
            "scenario" => Ok(Self::Scenario),
            "step" => Ok(Self::Step),
            _ => Err(ParseEnumError {
                expected: "test item type",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "in_progress" => Ok(Self::InProgress),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            "interrupted" => Ok(Self::Interrupted),
            _ => Err(ParseEnumError {
                expected: "item status",
                got: s.to_string(),
            }),
        }
    }
}
