//! Suite/item merge: the tree-restructuring core.
//!
//! Both variants fold duplicate items of an already-assembled launch. The
//! difference is the grouping key and scope:
//!
//! - [`BasicItemMerge`] works scope-by-scope: suite-level items in a parent
//!   scope are grouped **by name**, the first item (lowest id) becomes the
//!   fold target, and each fold target's own children are re-scanned.
//! - [`DeepItemMerge`] pulls every item of the launch at once and groups
//!   **by unique id**, finding duplicates regardless of depth or
//!   intermediate suite naming.
//!
//! The shared fold relocates the source's entire subtree under the target
//! before deleting the source row, so ordering within a fold is strict:
//! reparent, merge metadata, delete. Folding out of order could orphan or
//! double-delete subtree nodes, which is why a merge runs single-threaded.

use chrono::Utc;
use tracing::debug;

use crate::error::MergeError;
use crate::model::ids::{LaunchId, TestItemId};
use crate::model::item::TestItem;
use crate::model::launch::Launch;
use crate::store::TestItemRepository;

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// One variant of the duplicate-folding pass over a merged launch's items.
pub trait ItemMergeStrategy {
    /// Fold duplicate items of `launch` together.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or a referenced item vanished.
    fn merge_items(&self, launch: &Launch) -> Result<(), MergeError>;
}

// ---------------------------------------------------------------------------
// Shared fold
// ---------------------------------------------------------------------------

pub(crate) struct Folder<'a> {
    items: &'a dyn TestItemRepository,
}

impl<'a> Folder<'a> {
    pub(crate) const fn new(items: &'a dyn TestItemRepository) -> Self {
        Self { items }
    }

    /// Fold every `source` into `target`: relocate subtrees, merge metadata,
    /// delete the emptied source rows. Returns the updated target.
    ///
    /// Items are re-read from the store at fold time; earlier folds in the
    /// same pass may already have moved children around.
    fn fold(&self, target: TestItemId, sources: &[TestItemId]) -> Result<TestItem, MergeError> {
        let mut target = self
            .items
            .find_by_id(target)?
            .ok_or(MergeError::ItemNotFound(target))?;
        for &source_id in sources {
            let source = self
                .items
                .find_by_id(source_id)?
                .ok_or(MergeError::ItemNotFound(source_id))?;
            debug!(
                keep = %target.id,
                fold = %source.id,
                name = %target.name,
                "folding duplicate item"
            );
            self.relocate_children(&source, &target)?;
            merge_metadata(&mut target, &source);
            self.items.delete(source.id)?;
            self.items.save(&mut target)?;
        }
        Ok(target)
    }

    /// Move every child of `source` (and, transitively, its whole subtree)
    /// under `target`.
    fn relocate_children(&self, source: &TestItem, target: &TestItem) -> Result<(), MergeError> {
        for mut child in self.items.find_children(source.id)? {
            child.parent_id = Some(target.id);
            child.launch_id = target.launch_id;
            self.items.save(&mut child)?;
            self.reassign_subtree_launch(child.id, target.launch_id)?;
        }
        Ok(())
    }

    /// Rewrite the launch reference of everything below `root`. The parent
    /// chain inside the subtree is untouched; only the relocated top gets a
    /// new parent.
    fn reassign_subtree_launch(
        &self,
        root: TestItemId,
        launch_id: LaunchId,
    ) -> Result<(), MergeError> {
        let mut subtree = self.items.find_subtree(root)?;
        if subtree.is_empty() {
            return Ok(());
        }
        for item in &mut subtree {
            item.launch_id = launch_id;
        }
        self.items.save_all(&subtree)?;
        Ok(())
    }
}

/// Merge `source`'s metadata into `target`: widen time bounds, union tags
/// and parameters, concatenate descriptions.
fn merge_metadata(target: &mut TestItem, source: &TestItem) {
    if source.start_time < target.start_time {
        target.start_time = source.start_time;
    }
    target.results.end_time = match (target.results.end_time, source.results.end_time) {
        (Some(ours), Some(theirs)) => Some(ours.max(theirs)),
        (ours, theirs) => ours.or(theirs),
    };
    target.last_modified = Utc::now();

    target.tags.extend(source.tags.iter().cloned());

    let description = merge_descriptions(
        target.description.as_deref(),
        source.description.as_deref(),
    );
    if !description.is_empty() {
        target.description = Some(description);
    }

    for parameter in &source.parameters {
        if !target.parameters.contains(parameter) {
            target.parameters.push(parameter.clone());
        }
    }

    // No strategy yet for re-deriving identity when folded duplicates
    // disagree on parameters: the target keeps its unique id as-is.
}

fn merge_descriptions(first: Option<&str>, second: Option<&str>) -> String {
    let parts: Vec<&str> = [first, second]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    parts.join("\n\n")
}

/// Group `scope` by `key`, preserving first-seen group order and member
/// order. Callers pass id-sorted scopes so fold-target election ("first in
/// the group wins") is deterministic.
fn group_by<K: Eq>(scope: Vec<TestItem>, key: impl Fn(&TestItem) -> K) -> Vec<Vec<TestItem>> {
    let mut keys: Vec<K> = Vec::new();
    let mut groups: Vec<Vec<TestItem>> = Vec::new();
    for item in scope {
        let item_key = key(&item);
        match keys.iter().position(|existing| *existing == item_key) {
            Some(index) => groups[index].push(item),
            None => {
                keys.push(item_key);
                groups.push(vec![item]);
            }
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// BASIC: shallow, name-keyed fold
// ---------------------------------------------------------------------------

/// Name-keyed, scope-by-scope fold of suite-level items.
pub struct BasicItemMerge<'a> {
    items: &'a dyn TestItemRepository,
}

impl<'a> BasicItemMerge<'a> {
    #[must_use]
    pub const fn new(items: &'a dyn TestItemRepository) -> Self {
        Self { items }
    }

    /// The predicate deciding which items participate in name-keyed folding.
    fn is_acceptable(item: &TestItem) -> bool {
        item.item_type.is_suite_level()
    }

    /// Fold same-named items within one scope and recurse into each fold
    /// target's children.
    fn merge_scope(&self, scope: Vec<TestItem>) -> Result<(), MergeError> {
        let folder = Folder::new(self.items);
        let mut scope: Vec<TestItem> = scope.into_iter().filter(Self::is_acceptable).collect();
        scope.sort_by_key(|item| item.id);

        for group in group_by(scope, |item| item.name.clone()) {
            let Some((first, rest)) = group.split_first() else {
                continue;
            };
            let source_ids: Vec<TestItemId> = rest.iter().map(|item| item.id).collect();
            let target = folder.fold(first.id, &source_ids)?;
            self.merge_scope(self.items.find_children(target.id)?)?;
        }
        Ok(())
    }
}

impl ItemMergeStrategy for BasicItemMerge<'_> {
    fn merge_items(&self, launch: &Launch) -> Result<(), MergeError> {
        self.merge_scope(self.items.find_roots(launch.id)?)
    }
}

// ---------------------------------------------------------------------------
// DEEP: unique-id-keyed fold across the whole tree
// ---------------------------------------------------------------------------

/// Unique-id-keyed fold over every item of the launch.
pub struct DeepItemMerge<'a> {
    items: &'a dyn TestItemRepository,
}

impl<'a> DeepItemMerge<'a> {
    #[must_use]
    pub const fn new(items: &'a dyn TestItemRepository) -> Self {
        Self { items }
    }
}

impl ItemMergeStrategy for DeepItemMerge<'_> {
    fn merge_items(&self, launch: &Launch) -> Result<(), MergeError> {
        let folder = Folder::new(self.items);
        let mut scope = self.items.find_by_launch(launch.id)?;
        scope.sort_by_key(|item| item.id);
        // Items without a fingerprint cannot be matched across launches and
        // stay as they are.
        scope.retain(|item| item.unique_id.is_some());

        for group in group_by(scope, |item| item.unique_id.clone()) {
            if group.len() < 2 {
                continue;
            }
            let Some((first, rest)) = group.split_first() else {
                continue;
            };
            let source_ids: Vec<TestItemId> = rest.iter().map(|item| item.id).collect();
            folder.fold(first.id, &source_ids)?;
        }
        Ok(())
    }
}
