//! SQLite-backed store.
//!
//! Durable counterpart of [`super::memory::InMemoryStore`]. Runtime defaults
//! are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while a merge writes
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `foreign_keys = ON` so deleting a launch cascades to its leftovers
//!
//! Times are stored as `*_us` integer microseconds. Multi-valued item fields
//! (tags, parameters) are stored as JSON columns; they are only ever read
//! and written whole, never queried into.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::model::attribute::ItemAttribute;
use crate::model::ids::{LaunchId, TestItemId};
use crate::model::item::{Issue, ItemResults, TestItem};
use crate::model::launch::Launch;
use crate::model::statistics::Statistics;

use super::{
    Attachment, AttachmentRepository, LaunchRepository, LogEntry, LogRepository, Repositories,
    StatisticsRepository, TestItemRepository,
};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS launches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    number INTEGER NOT NULL,
    description TEXT,
    start_time_us INTEGER NOT NULL,
    end_time_us INTEGER,
    status TEXT NOT NULL
        CHECK (status IN ('in_progress', 'passed', 'failed', 'stopped', 'interrupted')),
    mode TEXT NOT NULL DEFAULT 'default' CHECK (mode IN ('default', 'debug')),
    project_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    has_retries INTEGER NOT NULL DEFAULT 0 CHECK (has_retries IN (0, 1))
);

CREATE TABLE IF NOT EXISTS launch_attributes (
    launch_id INTEGER NOT NULL REFERENCES launches(id) ON DELETE CASCADE,
    key TEXT,
    value TEXT NOT NULL,
    is_system INTEGER NOT NULL DEFAULT 0 CHECK (is_system IN (0, 1))
);

CREATE TABLE IF NOT EXISTS test_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    item_type TEXT NOT NULL
        CHECK (item_type IN ('suite', 'story', 'test', 'scenario', 'step')),
    parent_id INTEGER REFERENCES test_items(id) ON DELETE SET NULL,
    launch_id INTEGER NOT NULL REFERENCES launches(id) ON DELETE CASCADE,
    unique_id TEXT,
    description TEXT,
    start_time_us INTEGER NOT NULL,
    last_modified_us INTEGER NOT NULL,
    status TEXT NOT NULL
        CHECK (status IN ('in_progress', 'passed', 'failed', 'skipped', 'interrupted')),
    end_time_us INTEGER,
    issue_type TEXT,
    issue_comment TEXT,
    tags_json TEXT NOT NULL DEFAULT '[]',
    parameters_json TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS statistics (
    launch_id INTEGER NOT NULL REFERENCES launches(id) ON DELETE CASCADE,
    field TEXT NOT NULL,
    counter INTEGER NOT NULL,
    PRIMARY KEY (launch_id, field)
);

CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    launch_id INTEGER NOT NULL REFERENCES launches(id) ON DELETE CASCADE,
    item_id INTEGER,
    message TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attachments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    launch_id INTEGER NOT NULL REFERENCES launches(id) ON DELETE CASCADE,
    item_id INTEGER,
    file_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_launch ON test_items(launch_id, id);
CREATE INDEX IF NOT EXISTS idx_items_parent ON test_items(parent_id, id);
CREATE INDEX IF NOT EXISTS idx_items_unique ON test_items(launch_id, unique_id);
"#;

const ITEM_COLUMNS: &str = "id, name, item_type, parent_id, launch_id, unique_id, description, \
     start_time_us, last_modified_us, status, end_time_us, issue_type, issue_comment, \
     tags_json, parameters_json";

/// SQLite store implementing every repository trait.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, apply pragmas and schema.
    ///
    /// # Errors
    /// Returns an error if opening, configuring, or migrating fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open store database {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store, mostly useful for tests.
    ///
    /// # Errors
    /// Returns an error if configuring or migrating fails.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory().context("open in-memory database")?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure_connection(&conn).context("configure sqlite pragmas")?;
        conn.execute_batch(SCHEMA_SQL).context("apply store schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
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

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a log line to a launch. Fixture helper for tests and embedders.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_log(
        &self,
        launch_id: LaunchId,
        item_id: Option<TestItemId>,
        message: &str,
    ) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO logs (launch_id, item_id, message) VALUES (?1, ?2, ?3)",
            params![launch_id.0, item_id.map(|id| id.0), message],
        )
        .context("insert log")?;
        Ok(conn.last_insert_rowid())
    }

    /// Attach an attachment reference to a launch.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn add_attachment(
        &self,
        launch_id: LaunchId,
        item_id: Option<TestItemId>,
        file_name: &str,
    ) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO attachments (launch_id, item_id, file_name) VALUES (?1, ?2, ?3)",
            params![launch_id.0, item_id.map(|id| id.0), file_name],
        )
        .context("insert attachment")?;
        Ok(conn.last_insert_rowid())
    }

    /// All log lines currently pointing at a launch.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn logs_by_launch(&self, launch_id: LaunchId) -> Result<Vec<LogEntry>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT id, launch_id, item_id, message FROM logs WHERE launch_id = ?1 ORDER BY id")
            .context("prepare logs query")?;
        let rows = stmt
            .query_map(params![launch_id.0], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    launch_id: LaunchId(row.get(1)?),
                    item_id: row.get::<_, Option<i64>>(2)?.map(TestItemId),
                    message: row.get(3)?,
                })
            })
            .context("query logs")?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All attachments currently pointing at a launch.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn attachments_by_launch(&self, launch_id: LaunchId) -> Result<Vec<Attachment>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, launch_id, item_id, file_name FROM attachments \
                 WHERE launch_id = ?1 ORDER BY id",
            )
            .context("prepare attachments query")?;
        let rows = stmt
            .query_map(params![launch_id.0], |row| {
                Ok(Attachment {
                    id: row.get(0)?,
                    launch_id: LaunchId(row.get(1)?),
                    item_id: row.get::<_, Option<i64>>(2)?.map(TestItemId),
                    file_name: row.get(3)?,
                })
            })
            .context("query attachments")?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn load_attributes(conn: &Connection, launch_id: LaunchId) -> Result<Vec<ItemAttribute>> {
        let mut stmt = conn
            .prepare(
                "SELECT key, value, is_system FROM launch_attributes \
                 WHERE launch_id = ?1 ORDER BY rowid",
            )
            .context("prepare attribute query")?;
        let rows = stmt
            .query_map(params![launch_id.0], |row| {
                Ok(ItemAttribute {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    system: row.get(2)?,
                })
            })
            .context("query attributes")?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn write_attributes(conn: &Connection, launch: &Launch) -> Result<()> {
        conn.execute(
            "DELETE FROM launch_attributes WHERE launch_id = ?1",
            params![launch.id.0],
        )
        .context("clear attributes")?;
        let mut stmt = conn
            .prepare(
                "INSERT INTO launch_attributes (launch_id, key, value, is_system) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .context("prepare attribute insert")?;
        for attribute in &launch.attributes {
            stmt.execute(params![
                launch.id.0,
                attribute.key,
                attribute.value,
                attribute.system
            ])
            .context("insert attribute")?;
        }
        Ok(())
    }

    fn load_launch(conn: &Connection, id: LaunchId) -> Result<Option<Launch>> {
        let launch = conn
            .query_row(
                "SELECT id, name, number, description, start_time_us, end_time_us, status, \
                 mode, project_id, user_id, has_retries FROM launches WHERE id = ?1",
                params![id.0],
                map_launch_row,
            )
            .optional()
            .context("query launch")?;
        match launch {
            Some(mut launch) => {
                launch.attributes = Self::load_attributes(conn, launch.id)?;
                Ok(Some(launch))
            }
            None => Ok(None),
        }
    }

    fn query_items(conn: &Connection, sql: &str, args: &[i64]) -> Result<Vec<TestItem>> {
        let mut stmt = conn.prepare(sql).context("prepare item query")?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), map_item_row)
            .context("query items")?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(decode_item)
            .collect::<Result<Vec<_>>>()
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn to_us(time: DateTime<Utc>) -> i64 {
    time.timestamp_micros()
}

fn map_launch_row(row: &Row<'_>) -> rusqlite::Result<Launch> {
    // Status/mode/time decoding that can fail is deferred to decode time via
    // stored TEXT; rusqlite's FromSql covers the rest.
    let status: String = row.get(6)?;
    let mode: String = row.get(7)?;
    let start_us: i64 = row.get(4)?;
    let end_us: Option<i64> = row.get(5)?;
    Ok(Launch {
        id: LaunchId(row.get(0)?),
        name: row.get(1)?,
        number: row.get(2)?,
        description: row.get(3)?,
        start_time: DateTime::from_timestamp_micros(start_us).unwrap_or_default(),
        end_time: end_us.and_then(DateTime::from_timestamp_micros),
        status: status.parse().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(err))
        })?,
        mode: mode.parse().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(err))
        })?,
        project_id: row.get(8)?,
        user_id: row.get(9)?,
        has_retries: row.get(10)?,
        attributes: Vec::new(),
    })
}

/// Raw item row before JSON columns are decoded.
struct RawItem {
    item: TestItem,
    tags_json: String,
    parameters_json: String,
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    let item_type: String = row.get(2)?;
    let status: String = row.get(9)?;
    let start_us: i64 = row.get(7)?;
    let modified_us: i64 = row.get(8)?;
    let end_us: Option<i64> = row.get(10)?;
    let issue_type: Option<String> = row.get(11)?;
    let issue_comment: Option<String> = row.get(12)?;
    Ok(RawItem {
        item: TestItem {
            id: TestItemId(row.get(0)?),
            name: row.get(1)?,
            item_type: item_type.parse().map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(err),
                )
            })?,
            parent_id: row.get::<_, Option<i64>>(3)?.map(TestItemId),
            launch_id: LaunchId(row.get(4)?),
            unique_id: row.get(5)?,
            description: row.get(6)?,
            start_time: DateTime::from_timestamp_micros(start_us).unwrap_or_default(),
            last_modified: DateTime::from_timestamp_micros(modified_us).unwrap_or_default(),
            tags: std::collections::BTreeSet::new(),
            parameters: Vec::new(),
            results: ItemResults {
                status: status.parse().map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(
                        9,
                        rusqlite::types::Type::Text,
                        Box::new(err),
                    )
                })?,
                end_time: end_us.and_then(DateTime::from_timestamp_micros),
                issue: issue_type.map(|issue_type| Issue {
                    issue_type,
                    comment: issue_comment,
                }),
            },
        },
        tags_json: row.get(13)?,
        parameters_json: row.get(14)?,
    })
}

fn decode_item(raw: RawItem) -> Result<TestItem> {
    let mut item = raw.item;
    item.tags = serde_json::from_str(&raw.tags_json).context("decode item tags")?;
    item.parameters =
        serde_json::from_str(&raw.parameters_json).context("decode item parameters")?;
    Ok(item)
}

impl LaunchRepository for SqliteStore {
    fn find_by_id(&self, id: LaunchId) -> Result<Option<Launch>> {
        Self::load_launch(&self.lock(), id)
    }

    fn find_all_by_ids(&self, ids: &[LaunchId]) -> Result<Vec<Launch>> {
        let conn = self.lock();
        let mut launches = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(launch) = Self::load_launch(&conn, *id)? {
                launches.push(launch);
            }
        }
        Ok(launches)
    }

    fn save(&self, launch: &mut Launch) -> Result<()> {
        let mut guard = self.lock();
        let tx = guard.transaction().context("begin launch save")?;
        if launch.id.is_persisted() {
            tx.execute(
                "UPDATE launches SET name = ?2, number = ?3, description = ?4, \
                 start_time_us = ?5, end_time_us = ?6, status = ?7, mode = ?8, \
                 project_id = ?9, user_id = ?10, has_retries = ?11 WHERE id = ?1",
                params![
                    launch.id.0,
                    launch.name,
                    launch.number,
                    launch.description,
                    to_us(launch.start_time),
                    launch.end_time.map(to_us),
                    launch.status.to_string(),
                    launch.mode.to_string(),
                    launch.project_id,
                    launch.user_id,
                    launch.has_retries
                ],
            )
            .context("update launch")?;
        } else {
            let number: u32 = tx
                .query_row(
                    "SELECT COALESCE(MAX(number), 0) + 1 FROM launches \
                     WHERE project_id = ?1 AND name = ?2",
                    params![launch.project_id, launch.name],
                    |row| row.get(0),
                )
                .context("next launch number")?;
            tx.execute(
                "INSERT INTO launches (name, number, description, start_time_us, end_time_us, \
                 status, mode, project_id, user_id, has_retries) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    launch.name,
                    number,
                    launch.description,
                    to_us(launch.start_time),
                    launch.end_time.map(to_us),
                    launch.status.to_string(),
                    launch.mode.to_string(),
                    launch.project_id,
                    launch.user_id,
                    launch.has_retries
                ],
            )
            .context("insert launch")?;
            launch.id = LaunchId(tx.last_insert_rowid());
            launch.number = number;
        }
        Self::write_attributes(&tx, launch)?;
        tx.commit().context("commit launch save")
    }

    fn refresh(&self, launch: &mut Launch) -> Result<()> {
        match Self::load_launch(&self.lock(), launch.id)? {
            Some(stored) => {
                *launch = stored;
                Ok(())
            }
            None => bail!("cannot refresh launch {}: not persisted", launch.id),
        }
    }

    fn delete(&self, id: LaunchId) -> Result<()> {
        self.lock()
            .execute("DELETE FROM launches WHERE id = ?1", params![id.0])
            .context("delete launch")?;
        Ok(())
    }
}

impl TestItemRepository for SqliteStore {
    fn find_by_id(&self, id: TestItemId) -> Result<Option<TestItem>> {
        let conn = self.lock();
        let sql = format!("SELECT {ITEM_COLUMNS} FROM test_items WHERE id = ?1");
        let items = Self::query_items(&conn, &sql, &[id.0])?;
        Ok(items.into_iter().next())
    }

    fn find_children(&self, id: TestItemId) -> Result<Vec<TestItem>> {
        let conn = self.lock();
        let sql = format!("SELECT {ITEM_COLUMNS} FROM test_items WHERE parent_id = ?1 ORDER BY id");
        Self::query_items(&conn, &sql, &[id.0])
    }

    fn find_subtree(&self, id: TestItemId) -> Result<Vec<TestItem>> {
        let conn = self.lock();
        let sql = format!(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT id FROM test_items WHERE parent_id = ?1 \
                 UNION ALL \
                 SELECT ti.id FROM test_items ti JOIN subtree s ON ti.parent_id = s.id \
             ) \
             SELECT {ITEM_COLUMNS} FROM test_items \
             WHERE id IN (SELECT id FROM subtree) ORDER BY id"
        );
        Self::query_items(&conn, &sql, &[id.0])
    }

    fn find_roots(&self, launch_id: LaunchId) -> Result<Vec<TestItem>> {
        let conn = self.lock();
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM test_items \
             WHERE launch_id = ?1 AND parent_id IS NULL ORDER BY id"
        );
        Self::query_items(&conn, &sql, &[launch_id.0])
    }

    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<TestItem>> {
        let conn = self.lock();
        let sql = format!("SELECT {ITEM_COLUMNS} FROM test_items WHERE launch_id = ?1 ORDER BY id");
        Self::query_items(&conn, &sql, &[launch_id.0])
    }

    fn save(&self, item: &mut TestItem) -> Result<()> {
        let conn = self.lock();
        let tags_json = serde_json::to_string(&item.tags).context("encode item tags")?;
        let parameters_json =
            serde_json::to_string(&item.parameters).context("encode item parameters")?;
        let issue_type = item.results.issue.as_ref().map(|issue| issue.issue_type.clone());
        let issue_comment = item
            .results
            .issue
            .as_ref()
            .and_then(|issue| issue.comment.clone());
        if item.id.is_persisted() {
            conn.execute(
                "UPDATE test_items SET name = ?2, item_type = ?3, parent_id = ?4, \
                 launch_id = ?5, unique_id = ?6, description = ?7, start_time_us = ?8, \
                 last_modified_us = ?9, status = ?10, end_time_us = ?11, issue_type = ?12, \
                 issue_comment = ?13, tags_json = ?14, parameters_json = ?15 WHERE id = ?1",
                params![
                    item.id.0,
                    item.name,
                    item.item_type.to_string(),
                    item.parent_id.map(|id| id.0),
                    item.launch_id.0,
                    item.unique_id,
                    item.description,
                    to_us(item.start_time),
                    to_us(item.last_modified),
                    item.results.status.to_string(),
                    item.results.end_time.map(to_us),
                    issue_type,
                    issue_comment,
                    tags_json,
                    parameters_json
                ],
            )
            .context("update test item")?;
        } else {
            conn.execute(
                "INSERT INTO test_items (name, item_type, parent_id, launch_id, unique_id, \
                 description, start_time_us, last_modified_us, status, end_time_us, issue_type, \
                 issue_comment, tags_json, parameters_json) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    item.name,
                    item.item_type.to_string(),
                    item.parent_id.map(|id| id.0),
                    item.launch_id.0,
                    item.unique_id,
                    item.description,
                    to_us(item.start_time),
                    to_us(item.last_modified),
                    item.results.status.to_string(),
                    item.results.end_time.map(to_us),
                    issue_type,
                    issue_comment,
                    tags_json,
                    parameters_json
                ],
            )
            .context("insert test item")?;
            item.id = TestItemId(conn.last_insert_rowid());
        }
        Ok(())
    }

    fn save_all(&self, items: &[TestItem]) -> Result<()> {
        for item in items {
            if !item.id.is_persisted() {
                bail!("save_all expects persisted items, got unsaved '{}'", item.name);
            }
            let mut clone = item.clone();
            TestItemRepository::save(self, &mut clone)?;
        }
        Ok(())
    }

    fn delete(&self, id: TestItemId) -> Result<()> {
        self.lock()
            .execute("DELETE FROM test_items WHERE id = ?1", params![id.0])
            .context("delete test item")?;
        Ok(())
    }
}

impl StatisticsRepository for SqliteStore {
    fn find_by_launch(&self, launch_id: LaunchId) -> Result<Vec<Statistics>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT launch_id, field, counter FROM statistics \
                 WHERE launch_id = ?1 ORDER BY field",
            )
            .context("prepare statistics query")?;
        let rows = stmt
            .query_map(params![launch_id.0], |row| {
                Ok(Statistics {
                    launch_id: LaunchId(row.get(0)?),
                    field: row.get(1)?,
                    counter: row.get::<_, i64>(2)?.unsigned_abs(),
                })
            })
            .context("query statistics")?
            .collect::<rusqlite::Result<Vec<_>>>()?;
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
        let mut guard = self.lock();
        let tx = guard.transaction().context("begin statistics replace")?;
        tx.execute(
            "DELETE FROM statistics WHERE launch_id = ?1",
            params![launch_id.0],
        )
        .context("clear statistics")?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO statistics (launch_id, field, counter) VALUES (?1, ?2, ?3)")
                .context("prepare statistics insert")?;
            for row in rows {
                let counter = i64::try_from(row.counter).context("statistics counter overflow")?;
                stmt.execute(params![row.launch_id.0, row.field, counter])
                    .context("insert statistics row")?;
            }
        }
        tx.commit().context("commit statistics replace")
    }
}

impl LogRepository for SqliteStore {
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize> {
        self.lock()
            .execute(
                "UPDATE logs SET launch_id = ?2 WHERE launch_id = ?1",
                params![from.0, to.0],
            )
            .context("reassign logs")
    }
}

impl AttachmentRepository for SqliteStore {
    fn reassign_launch(&self, from: LaunchId, to: LaunchId) -> Result<usize> {
        self.lock()
            .execute(
                "UPDATE attachments SET launch_id = ?2 WHERE launch_id = ?1",
                params![from.0, to.0],
            )
            .context("reassign attachments")
    }
}
