//! Statistics re-aggregation for merged launches.
//!
//! The aggregator trusts each source launch's pre-existing rollup instead of
//! recounting the merged item tree: it flattens all source rows, groups them
//! by field, and sums. The deep merge variant keeps this honest by folding
//! items without ever dropping a leaf, so a post-merge recount of leaf
//! statuses must match the summed counters (the integration suite checks
//! this).

use std::collections::BTreeMap;

use crate::model::ids::LaunchId;
use crate::model::launch::LaunchStatus;
use crate::model::statistics::{EXECUTIONS_FAILED, Statistics, is_defect_field};

/// Fold statistics rows from all source launches into rows for the merged
/// launch: one row per distinct field, counters summed.
///
/// Grouping is order-insensitive, so aggregation is associative and
/// commutative over the source list. Output rows come back in field order.
#[must_use]
pub fn aggregate(launch_id: LaunchId, rows: &[Statistics]) -> Vec<Statistics> {
    let mut by_field: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *by_field.entry(row.field.as_str()).or_insert(0) += row.counter;
    }
    by_field
        .into_iter()
        .map(|(field, counter)| Statistics::new(launch_id, field, counter))
        .collect()
}

/// Derive the terminal status of a finished launch from its counters:
/// any failed execution or any defect makes the launch failed.
#[must_use]
pub fn status_from_statistics(rows: &[Statistics]) -> LaunchStatus {
    let failed = rows.iter().any(|row| {
        row.counter > 0 && (row.field == EXECUTIONS_FAILED || is_defect_field(&row.field))
    });
    if failed {
        LaunchStatus::Failed
    } else {
        LaunchStatus::Passed
    }
}
