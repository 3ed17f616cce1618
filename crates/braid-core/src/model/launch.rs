//! The launch record: one test-execution run and its header metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, attribute::ItemAttribute, ids::LaunchId, normalize};

/// Lifecycle status of a launch.
///
/// A launch is created `in_progress` and finalized to one of the terminal
/// states by the finish-launch path. Only finished launches may be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    InProgress,
    Passed,
    Failed,
    Stopped,
    Interrupted,
}

impl LaunchStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns `true` once the launch has left the `in_progress` state.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Reporting mode of a launch. Debug launches are visible only to their owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    #[default]
    Default,
    Debug,
}

impl LaunchMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Debug => "debug",
        }
    }
}

/// A single test-execution record and the root of a test-item tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: LaunchId,
    pub name: String,
    /// Per-project sequence number for launches sharing a name, assigned by
    /// the store on insert.
    pub number: u32,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    /// `None` while the launch is still running.
    pub end_time: Option<DateTime<Utc>>,
    pub status: LaunchStatus,
    pub mode: LaunchMode,
    pub project_id: i64,
    pub user_id: i64,
    pub has_retries: bool,
    pub attributes: Vec<ItemAttribute>,
}

impl Launch {
    /// Start a new launch record in the `in_progress` state.
    #[must_use]
    pub fn begin(
        name: impl Into<String>,
        project_id: i64,
        user_id: i64,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LaunchId::default(),
            name: name.into(),
            number: 0,
            description: None,
            start_time,
            end_time: None,
            status: LaunchStatus::InProgress,
            mode: LaunchMode::Default,
            project_id,
            user_id,
            has_retries: false,
            attributes: Vec::new(),
        }
    }
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "in_progress" => Ok(Self::InProgress),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "stopped" => Ok(Self::Stopped),
            "interrupted" => Ok(Self::Interrupted),
            _ => Err(ParseEnumError {
                expected: "launch status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for LaunchMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "default" => Ok(Self::Default),
            "debug" => Ok(Self::Debug),
            _ => Err(ParseEnumError {
                expected: "launch mode",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Launch, LaunchMode, LaunchStatus};
    use chrono::Utc;
    use std::str::FromStr;

    #[test]
    fn display_parse_roundtrips() {
        for value in [
            LaunchStatus::InProgress,
            LaunchStatus::Passed,
            LaunchStatus::Failed,
            LaunchStatus::Stopped,
            LaunchStatus::Interrupted,
        ] {
            let rendered = value.to_string();
            assert_eq!(LaunchStatus::from_str(&rendered).unwrap(), value);
        }

        for value in [LaunchMode::Default, LaunchMode::Debug] {
            let rendered = value.to_string();
            assert_eq!(LaunchMode::from_str(&rendered).unwrap(), value);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(LaunchStatus::from_str("running").is_err());
        assert!(LaunchMode::from_str("silent").is_err());
    }

    #[test]
    fn only_in_progress_is_unfinished() {
        assert!(!LaunchStatus::InProgress.is_finished());
        assert!(LaunchStatus::Passed.is_finished());
        assert!(LaunchStatus::Failed.is_finished());
        assert!(LaunchStatus::Stopped.is_finished());
        assert!(LaunchStatus::Interrupted.is_finished());
    }

    #[test]
    fn begin_starts_in_progress_without_end_time() {
        let launch = Launch::begin("smoke", 1, 2, Utc::now());
        assert_eq!(launch.status, LaunchStatus::InProgress);
        assert!(launch.end_time.is_none());
        assert!(!launch.id.is_persisted());
        assert_eq!(launch.project_id, 1);
        assert_eq!(launch.user_id, 2);
    }
}
