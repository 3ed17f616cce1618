//! Storage interfaces the merge engine runs against.
//!
//! The engine never talks to a concrete database type; it is handed a
//! [`Repositories`] bundle of trait objects. Two backends ship with the
//! crate: [`memory::InMemoryStore`] (arena of records behind a mutex, the
//! test double and embedded default) and [`sqlite::SqliteStore`] (durable
//! projection).
//!
//! All trait methods return `anyhow::Result`; the engine wraps failures into
//! [`crate::error::MergeError::Store`].

pub mod memory;
pub mod sqlite;

use anyhow::Result;

use crate::model::ids::{LaunchId, TestItemId};
use crate::model::item::TestItem;
use crate::model::launch::Launch;
use crate::model::statistics::Statistics;

// ---------------------------------------------------------------------------
// Side tables
// ---------------------------------------------------------------------------

/// A log line attached to a launch (and optionally to one of its items).
///
/// The merge engine never reads log bodies; it only rewrites launch
/// references in bulk when launches are folded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub launch_id: LaunchId,
    pub item_id: Option<TestItemId>,
    pub message: String,
}

/// A binary attachment reference attached to a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub launch_id: LaunchId,
    pub item_id: Option<TestItemId>,
    pub file_name: String,
}

// ---------------------------------------------------------------------------
// Repository traits
// ---------------------------------------------------------------------------

/// Launch persistence.
pub trait LaunchRepository {
    /// Load a launch by id.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>>;

    /// Load every launch whose id is in `ids`. Missing ids are simply absent
    /// from the result; the caller decides whether that is an error.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_all_by_ids(&self, ids: &[LaunchId]) -> Result<Vec<Launch>>;

    /// Insert or update a launch. On insert the store assigns `id` and the
    /// per-project `number` for the launch's name, writing both back into
    /// `launch`.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn save(&self, launch: &mut Launch) -> Result<()>;

    /// Reload `launch` from the store so generated fields are authoritative.
    ///
    /// # Errors
    /// Returns an error if the backend fails or the launch no longer exists.
    fn refresh(&self, launch: &mut Launch) -> Result<()>;

    /// Delete a launch and everything still attached to it (items,
    /// statistics, logs, attachments).
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn delete(&self, id: LaunchId) -> Result<()>;
}

/// Test-item persistence.
///
/// Tree queries return items ordered by ascending id so that grouping and
/// fold-target election are deterministic regardless of backend.
pub trait TestItemRepository {
    /// Load an item by id.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_by_id(&self, id: TestItemId) -> Result<Option<TestItem>>;

    /// Direct children of an item.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_children(&self, id: TestItemId) -> Result<Vec<TestItem>>;

    /// The full subtree below an item (children, grandchildren, ...), not
    /// including the item itself.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_subtree(&self, id: TestItemId) -> Result<Vec<TestItem>>;

    /// Items of a launch that have no parent.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_roots(&self, launch_id: LaunchId) -> Result<Vec<TestItem>>;

    /// Every item belonging to a launch.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<TestItem>>;

    /// Insert or update an item. On insert the store assigns `id` and writes
    /// it back into `item`.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn save(&self, item: &mut TestItem) -> Result<()>;

    /// Update a batch of already-persisted items.
    ///
    /// # Errors
    /// Returns an error if the backend fails or an item is not persisted.
    fn save_all(&self, items: &[TestItem]) -> Result<()>;

    /// Delete an item row. Children are not cascaded; the merge engine
    /// relocates them before deleting a fold source.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn delete(&self, id: TestItemId) -> Result<()>;
}

/// Launch-level statistics rows.
pub trait StatisticsRepository {
    /// All counter rows of a launch.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<Statistics>>;

    /// Replace a launch's statistics wholesale (delete-then-insert, never a
    /// partial patch).
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn replace_for_launch(&self, launch_id: LaunchId, rows: &[Statistics]) -> Result<()>;
}

/// Bulk launch-reference rewrites for log lines.
pub trait LogRepository {
    /// Point every log of `from` at `to`; returns the number of rows moved.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize>;
}

/// Bulk launch-reference rewrites for attachments.
pub trait AttachmentRepository {
    /// Point every attachment of `from` at `to`; returns the number of rows
    /// moved.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// The set of repository handles the merge engine needs.
///
/// Both shipped stores implement every trait, so a bundle is usually built
/// with [`memory::InMemoryStore::repositories`] or
/// [`sqlite::SqliteStore::repositories`]; tests may mix and match.
#[derive(Clone, Copy)]
pub struct Repositories<'a> {
    pub launches: &'a dyn LaunchRepository,
    pub items: &'a dyn TestItemRepository,
    pub statistics: &'a dyn StatisticsRepository,
    pub logs: &'a dyn LogRepository,
    pub attachments: &'a dyn AttachmentRepository,
}
