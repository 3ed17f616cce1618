//! Attribute-merge policy for resulting launches.

use std::collections::BTreeSet;

use crate::model::attribute::ItemAttribute;
use crate::model::launch::Launch;

/// Internal bookkeeping keys that never survive onto a merged launch,
/// regardless of which merge path produced the attribute set.
pub const BOOKKEEPING_KEYS: &[&str] = &["lastRun"];

fn is_bookkeeping(attribute: &ItemAttribute) -> bool {
    attribute
        .key
        .as_deref()
        .is_some_and(|key| BOOKKEEPING_KEYS.contains(&key))
}

/// Decide which attributes the merged launch carries.
///
/// An explicit set from the merge request wins wholesale; nothing is
/// inherited from the sources. Without one, the result is the union of every
/// **system** attribute across the sources. Both paths exclude the
/// bookkeeping deny-list and collapse duplicates by `(key, value)`, keeping
/// first-seen order.
#[must_use]
pub fn merge_attributes(
    explicit: Option<&[ItemAttribute]>,
    sources: &[Launch],
) -> Vec<ItemAttribute> {
    let candidates: Vec<ItemAttribute> = match explicit {
        Some(set) => set.to_vec(),
        None => sources
            .iter()
            .flat_map(|launch| launch.attributes.iter())
            .filter(|attribute| attribute.system)
            .cloned()
            .collect(),
    };

    let mut seen = BTreeSet::new();
    let mut merged = Vec::new();
    for attribute in candidates {
        if is_bookkeeping(&attribute) {
            continue;
        }
        if seen.insert((attribute.key.clone(), attribute.value.clone())) {
            merged.push(attribute);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::merge_attributes;
    use crate::model::attribute::ItemAttribute;
    use crate::model::launch::Launch;
    use chrono::Utc;

    fn launch_with(attributes: Vec<ItemAttribute>) -> Launch {
        let mut launch = Launch::begin("smoke", 1, 1, Utc::now());
        launch.attributes = attributes;
        launch
    }

    #[test]
    fn without_explicit_set_only_system_attributes_survive() {
        let first = launch_with(vec![
            ItemAttribute::system(Some("agent"), "pytest-5.1"),
            ItemAttribute::new(Some("env"), "staging"),
        ]);
        let second = launch_with(vec![
            ItemAttribute::system(Some("agent"), "pytest-5.1"),
            ItemAttribute::system(Some("build"), "412"),
        ]);

        let merged = merge_attributes(None, &[first, second]);
        assert_eq!(
            merged,
            vec![
                ItemAttribute::system(Some("agent"), "pytest-5.1"),
                ItemAttribute::system(Some("build"), "412"),
            ]
        );
    }

    #[test]
    fn explicit_set_wins_wholesale() {
        let source = launch_with(vec![ItemAttribute::system(Some("agent"), "pytest-5.1")]);
        let explicit = vec![ItemAttribute::new(Some("release"), "2024.1")];

        let merged = merge_attributes(Some(&explicit), &[source]);
        assert_eq!(merged, explicit);
    }

    #[test]
    fn bookkeeping_keys_are_always_excluded() {
        let source = launch_with(vec![
            ItemAttribute::system(Some("lastRun"), "2024-03-02T10:00:00Z"),
            ItemAttribute::system(Some("agent"), "pytest-5.1"),
        ]);

        let merged = merge_attributes(None, std::slice::from_ref(&source));
        assert_eq!(merged, vec![ItemAttribute::system(Some("agent"), "pytest-5.1")]);

        let explicit = vec![
            ItemAttribute::new(Some("lastRun"), "yesterday"),
            ItemAttribute::new(Some("release"), "2024.1"),
        ];
        let merged = merge_attributes(Some(&explicit), &[source]);
        assert_eq!(merged, vec![ItemAttribute::new(Some("release"), "2024.1")]);
    }

    #[test]
    fn duplicates_collapse_by_key_and_value() {
        let first = launch_with(vec![ItemAttribute::system(None, "nightly")]);
        let second = launch_with(vec![ItemAttribute::system(None, "nightly")]);

        let merged = merge_attributes(None, &[first, second]);
        assert_eq!(merged.len(), 1);
    }
}
