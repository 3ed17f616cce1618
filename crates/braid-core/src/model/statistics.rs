//! Launch-level statistics counters.
//!
//! Statistics are stored as one row per `(launch, field)` pair, where the
//! field is a `$`-separated path naming an execution or defect counter:
//!
//! ```text
//! statistics$executions$total
//! statistics$executions$passed
//! statistics$executions$failed
//! statistics$executions$skipped
//! statistics$defects$product_bug$total
//! ```
//!
//! Rows are recomputed wholesale when a launch's rollup changes; they are
//! never partially patched.

use serde::{Deserialize, Serialize};

use super::ids::LaunchId;

pub const EXECUTIONS_TOTAL: &str = "statistics$executions$total";
pub const EXECUTIONS_PASSED: &str = "statistics$executions$passed";
pub const EXECUTIONS_FAILED: &str = "statistics$executions$failed";
pub const EXECUTIONS_SKIPPED: &str = "statistics$executions$skipped";

const DEFECTS_PREFIX: &str = "statistics$defects$";

/// Field path for a defect-group total, e.g. `product_bug` or `to_investigate`.
#[must_use]
pub fn defect_total(group: &str) -> String {
    format!("{DEFECTS_PREFIX}{group}$total")
}

/// Returns `true` if the field names a defect counter.
#[must_use]
pub fn is_defect_field(field: &str) -> bool {
    field.starts_with(DEFECTS_PREFIX)
}

/// One statistics counter row attached to a launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub launch_id: LaunchId,
    pub field: String,
    pub counter: u64,
}

impl Statistics {
    #[must_use]
    pub fn new(launch_id: LaunchId, field: impl Into<String>, counter: u64) -> Self {
        Self {
            launch_id,
            field: field.into(),
            counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EXECUTIONS_FAILED, defect_total, is_defect_field};

    #[test]
    fn defect_fields_are_recognized() {
        assert!(is_defect_field(&defect_total("product_bug")));
        assert!(is_defect_field(&defect_total("to_investigate")));
        assert!(!is_defect_field(EXECUTIONS_FAILED));
    }

    #[test]
    fn defect_total_builds_the_full_path() {
        assert_eq!(
            defect_total("automation_bug"),
            "statistics$defects$automation_bug$total"
        );
    }
}
