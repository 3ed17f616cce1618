//! Stable identity fingerprints for test items.
//!
//! A unique id is a derived value keyed by (launch identity, ancestor path,
//! item name, parameters). It is what the deep merge variant groups by, so
//! it must be regenerated whenever one of its inputs changes, notably when
//! reparenting moves an item under a launch with a different name.
//!
//! Fingerprint format: `auto:<64 lowercase hex chars>`, a BLAKE3 hash of
//! the canonical `;`-joined input string. The `auto:` prefix marks ids this
//! generator owns; ids reported by external agents fail [`validate`] and are
//! left untouched.
//!
//! [`validate`]: UniqueIdGenerator::validate

use anyhow::anyhow;
use std::collections::HashSet;

use crate::error::MergeError;
use crate::model::item::TestItem;
use crate::model::launch::Launch;
use crate::store::TestItemRepository;

const PREFIX: &str = "auto:";

/// Generates and validates test-item identity fingerprints.
pub trait UniqueIdGenerator {
    /// Returns `true` if `unique_id` was produced by this generator and may
    /// safely be regenerated.
    fn validate(&self, unique_id: &str) -> bool;

    /// Compute the fingerprint for `item` as positioned under `launch`, with
    /// `ancestors` being the names of its ancestor chain, root first.
    fn generate(&self, item: &TestItem, ancestors: &[String], launch: &Launch) -> String;
}

/// The default generator: canonical-string BLAKE3 fingerprints.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintGenerator;

impl FingerprintGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UniqueIdGenerator for FingerprintGenerator {
    fn validate(&self, unique_id: &str) -> bool {
        unique_id
            .strip_prefix(PREFIX)
            .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    fn generate(&self, item: &TestItem, ancestors: &[String], launch: &Launch) -> String {
        let mut canonical = String::new();
        canonical.push_str(&launch.project_id.to_string());
        canonical.push(';');
        canonical.push_str(&launch.name);
        canonical.push(';');
        canonical.push_str(&ancestors.join(","));
        canonical.push(';');
        canonical.push_str(&item.name);
        if !item.parameters.is_empty() {
            canonical.push(';');
            let rendered: Vec<String> = item
                .parameters
                .iter()
                .map(ToString::to_string)
                .collect();
            canonical.push_str(&rendered.join(","));
        }
        format!("{PREFIX}{}", blake3::hash(canonical.as_bytes()).to_hex())
    }
}

/// Resolve the names of `item`'s ancestors, root first.
///
/// The chain is walked through the store by parent id, so it reflects the
/// tree as currently persisted, including any reparenting already applied.
///
/// # Errors
///
/// Returns [`MergeError::ItemNotFound`] if a parent reference dangles, or a
/// store error if the walk detects a parent cycle.
pub fn ancestor_names(
    items: &dyn TestItemRepository,
    item: &TestItem,
) -> Result<Vec<String>, MergeError> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = item.parent_id;
    while let Some(parent_id) = cursor {
        if !seen.insert(parent_id) {
            return Err(MergeError::Store(anyhow!(
                "parent cycle detected at item {parent_id}"
            )));
        }
        let parent = items
            .find_by_id(parent_id)?
            .ok_or(MergeError::ItemNotFound(parent_id))?;
        names.push(parent.name.clone());
        cursor = parent.parent_id;
    }
    names.reverse();
    Ok(names)
}
