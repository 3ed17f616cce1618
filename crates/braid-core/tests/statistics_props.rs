//! Property tests for the statistics aggregator: aggregation must behave
//! like a commutative, associative fold over counter rows.

use braid_core::merge::statistics::aggregate;
use braid_core::model::ids::LaunchId;
use braid_core::model::statistics::{
    EXECUTIONS_FAILED, EXECUTIONS_PASSED, EXECUTIONS_SKIPPED, EXECUTIONS_TOTAL, Statistics,
    defect_total,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(EXECUTIONS_TOTAL.to_string()),
        Just(EXECUTIONS_PASSED.to_string()),
        Just(EXECUTIONS_FAILED.to_string()),
        Just(EXECUTIONS_SKIPPED.to_string()),
        Just(defect_total("product_bug")),
        Just(defect_total("to_investigate")),
    ]
}

fn rows_strategy() -> impl Strategy<Value = Vec<Statistics>> {
    prop::collection::vec((field_strategy(), 0u64..10_000), 0..16).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(field, counter)| Statistics::new(LaunchId(0), field, counter))
            .collect()
    })
}

fn concat(slices: &[&[Statistics]]) -> Vec<Statistics> {
    slices.iter().flat_map(|rows| rows.iter().cloned()).collect()
}

fn totals(rows: &[Statistics]) -> BTreeMap<String, u64> {
    let mut by_field = BTreeMap::new();
    for row in rows {
        *by_field.entry(row.field.clone()).or_insert(0) += row.counter;
    }
    by_field
}

proptest! {
    #[test]
    fn aggregation_is_commutative(a in rows_strategy(), b in rows_strategy()) {
        let forward = aggregate(LaunchId(9), &concat(&[&a, &b]));
        let reverse = aggregate(LaunchId(9), &concat(&[&b, &a]));
        prop_assert_eq!(forward, reverse);
    }

    #[test]
    fn aggregation_is_associative(
        a in rows_strategy(),
        b in rows_strategy(),
        c in rows_strategy(),
    ) {
        let all_at_once = aggregate(LaunchId(9), &concat(&[&a, &b, &c]));
        let left_first = {
            let ab = aggregate(LaunchId(9), &concat(&[&a, &b]));
            aggregate(LaunchId(9), &concat(&[&ab, &c]))
        };
        let right_first = {
            let bc = aggregate(LaunchId(9), &concat(&[&b, &c]));
            aggregate(LaunchId(9), &concat(&[&a, &bc]))
        };
        prop_assert_eq!(&all_at_once, &left_first);
        prop_assert_eq!(&all_at_once, &right_first);
    }

    #[test]
    fn aggregation_conserves_per_field_totals(rows in rows_strategy()) {
        let merged = aggregate(LaunchId(9), &rows);
        prop_assert_eq!(totals(&merged), totals(&rows));
        // One output row per distinct field, all attached to the target.
        let fields: Vec<&String> = merged.iter().map(|row| &row.field).collect();
        let mut deduped = fields.clone();
        deduped.dedup();
        prop_assert_eq!(fields.len(), deduped.len());
        prop_assert!(merged.iter().all(|row| row.launch_id == LaunchId(9)));
    }
}
