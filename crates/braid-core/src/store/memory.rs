//! In-memory store: an arena of records behind a mutex.
//!
//! This is the embedded default and the test double for every repository
//! trait. Records live in `BTreeMap`s keyed by id, so every listing query
//! comes back in ascending-id order without extra sorting, the same
//! deterministic order the SQLite backend produces with `ORDER BY id`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Result, bail};

use crate::model::ids::{LaunchId, TestItemId};
use crate::model::item::TestItem;
use crate::model::launch::Launch;
use crate::model::statistics::Statistics;

use super::{
    Attachment, AttachmentRepository, LaunchRepository, LogEntry, LogRepository, Repositories,
    StatisticsRepository, TestItemRepository,
};

#[derive(Debug, Default)]
struct Inner {
    launches: BTreeMap<i64, Launch>,
    items: BTreeMap<i64, TestItem>,
    statistics: Vec<Statistics>,
    logs: BTreeMap<i64, LogEntry>,
    attachments: BTreeMap<i64, Attachment>,
    next_launch_id: i64,
    next_item_id: i64,
    next_side_id: i64,
}

/// Arena-backed store implementing every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository bundle pointing every trait at this store.
    #[must_use]
    pub fn repositories(&self) -> Repositories<'_> {
        Repositories {
            launches: self,
            items: self,
            statistics: self,
            logs: self,
            attachments: self,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a log line to a launch. Fixture helper for tests and embedders.
    pub fn add_log(&self, launch_id: LaunchId, item_id: Option<TestItemId>, message: &str) -> i64 {
        let mut inner = self.lock();
        inner.next_side_id += 1;
        let id = inner.next_side_id;
        inner.logs.insert(
            id,
            LogEntry {
                id,
                launch_id,
                item_id,
                message: message.to_string(),
            },
        );
        id
    }

    /// Attach an attachment reference to a launch.
    pub fn add_attachment(
        &self,
        launch_id: LaunchId,
        item_id: Option<TestItemId>,
        file_name: &str,
    ) -> i64 {
        let mut inner = self.lock();
        inner.next_side_id += 1;
        let id = inner.next_side_id;
        inner.attachments.insert(
            id,
            Attachment {
                id,
                launch_id,
                item_id,
                file_name: file_name.to_string(),
            },
        );
        id
    }

    /// All log lines currently pointing at a launch.
    #[must_use]
    pub fn logs_by_launch(&self, launch_id: LaunchId) -> Vec<LogEntry> {
        self.lock()
            .logs
            .values()
            .filter(|log| log.launch_id == launch_id)
            .cloned()
            .collect()
    }

    /// All attachments currently pointing at a launch.
    #[must_use]
    pub fn attachments_by_launch(&self, launch_id: LaunchId) -> Vec<Attachment> {
        self.lock()
            .attachments
            .values()
            .filter(|attachment| attachment.launch_id == launch_id)
            .cloned()
            .collect()
    }
}

impl LaunchRepository for InMemoryStore {
    fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>> {
        Ok(self.lock().launches.get(&id.0).cloned())
    }

    fn find_all_by_ids(&self, ids: &[LaunchId]) -> Result<Vec<Launch>> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.launches.get(&id.0).cloned())
            .collect())
    }

    fn save(&self, launch: &mut Launch) -> Result<()> {
        let mut inner = self.lock();
        if !launch.id.is_persisted() {
            inner.next_launch_id += 1;
            launch.id = LaunchId(inner.next_launch_id);
            let next_number = inner
                .launches
                .values()
                .filter(|other| {
                    other.project_id == launch.project_id && other.name == launch.name
                })
                .map(|other| other.number)
                .max()
                .unwrap_or(0)
                + 1;
            launch.number = next_number;
        }
        inner.launches.insert(launch.id.0, launch.clone());
        Ok(())
    }

    fn refresh(&self, launch: &mut Launch) -> Result<()> {
        let inner = self.lock();
        match inner.launches.get(&launch.id.0) {
            Some(stored) => {
                *launch = stored.clone();
                Ok(())
            }
            None => bail!("cannot refresh launch {}: not persisted", launch.id),
        }
    }

    fn delete(&self, id: LaunchId) -> Result<()> {
        let mut inner = self.lock();
        inner.launches.remove(&id.0);
        inner.items.retain(|_, item| item.launch_id != id);
        inner.statistics.retain(|row| row.launch_id != id);
        inner.logs.retain(|_, log| log.launch_id != id);
        inner
            .attachments
            .retain(|_, attachment| attachment.launch_id != id);
        Ok(())
    }
}

impl TestItemRepository for InMemoryStore {
    fn find_by_id(&self, id: TestItemId) -> Result<Option<TestItem>> {
        Ok(self.lock().items.get(&id.0).cloned())
    }

    fn find_children(&self, id: TestItemId) -> Result<Vec<TestItem>> {
        Ok(self
            .lock()
            .items
            .values()
            .filter(|item| item.parent_id == Some(id))
            .cloned()
            .collect())
    }

    fn find_subtree(&self, id: TestItemId) -> Result<Vec<TestItem>> {
        let inner = self.lock();
        let mut frontier = vec![id];
        let mut subtree = Vec::new();
        while let Some(parent) = frontier.pop() {
            for item in inner
                .items
                .values()
                .filter(|item| item.parent_id == Some(parent))
            {
                frontier.push(item.id);
                subtree.push(item.clone());
            }
        }
        subtree.sort_by_key(|item| item.id);
        Ok(subtree)
    }

    fn find_roots(&self, launch_id: LaunchId) -> Result<Vec<TestItem>> {
        Ok(self
            .lock()
            .items
            .values()
            .filter(|item| item.launch_id == launch_id && item.parent_id.is_none())
            .cloned()
            .collect())
    }

    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<TestItem>> {
        Ok(self
            .lock()
            .items
            .values()
            .filter(|item| item.launch_id == launch_id)
            .cloned()
            .collect())
    }

    fn save(&self, item: &mut TestItem) -> Result<()> {
        let mut inner = self.lock();
        if !item.id.is_persisted() {
            inner.next_item_id += 1;
            item.id = TestItemId(inner.next_item_id);
        }
        inner.items.insert(item.id.0, item.clone());
        Ok(())
    }

    fn save_all(&self, items: &[TestItem]) -> Result<()> {
        let mut inner = self.lock();
        for item in items {
            if !item.id.is_persisted() {
                bail!("save_all expects persisted items, got unsaved '{}'", item.name);
            }
            inner.items.insert(item.id.0, item.clone());
        }
        Ok(())
    }

    fn delete(&self, id: TestItemId) -> Result<()> {
        self.lock().items.remove(&id.0);
        Ok(())
    }
}

impl StatisticsRepository for InMemoryStore {
    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<Statistics>> {
        let mut rows: Vec<Statistics> = self
            .lock()
            .statistics
            .iter()
            .filter(|row| row.launch_id == launch_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.field.cmp(&b.field));
        Ok(rows)
    }

    fn replace_for_launch(&self, launch_id: LaunchId, rows: &[Statistics]) -> Result<()> {
        for row in rows {
            if row.launch_id != launch_id {
                bail!(
                    "statistics row for field '{}' targets launch {}, expected {}",
                    row.field,
                    row.launch_id,
                    launch_id
                );
            }
        }
        let mut inner = self.lock();
        inner.statistics.retain(|row| row.launch_id != launch_id);
        inner.statistics.extend(rows.iter().cloned());
        Ok(())
    }
}

impl LogRepository for InMemoryStore {
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize> {
        let mut inner = self.lock();
        let mut moved = 0;
        for log in inner.logs.values_mut() {
            if log.launch_id == from {
                log.launch_id = to;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

impl AttachmentRepository for InMemoryStore {
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize> {
        let mut inner = self.lock();
        let mut moved = 0;
        for attachment in inner.attachments.values_mut() {
            if attachment.launch_id == from {
                attachment.launch_id = to;
                moved += 1;
            }
        }
        Ok(moved)
    }
}
