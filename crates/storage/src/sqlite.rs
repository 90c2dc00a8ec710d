#![forbid(unsafe_code)]

use crate::{StoreError, TaskStore, TaskTx};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use td_core::ids::{OwnerId, TaskId};
use td_core::model::{Partition, Task};

const SCHEMA_VERSION: i64 = 1;
const DB_FILE: &str = "tandem.db";

/// SQLite adapter. Writes run under `BEGIN IMMEDIATE` so two connections
/// racing on the same owner serialize at the store instead of interleaving a
/// check-then-write; a loser that cannot wait out the busy timeout surfaces
/// as [`StoreError::Busy`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: Option<PathBuf>,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE))?;
        configure(&conn)?;
        install_schema(&conn)?;

        Ok(Self {
            conn,
            storage_dir: Some(storage_dir),
        })
    }

    /// Private throwaway database, used by tests and the memory-equivalent
    /// dev profile.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        install_schema(&conn)?;
        Ok(Self {
            conn,
            storage_dir: None,
        })
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }
}

impl TaskStore for SqliteStore {
    fn with_tx<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TaskTx) -> Result<T, E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let out = {
            let mut view = SqliteTx { tx: &tx };
            f(&mut view)?
        };
        tx.commit().map_err(StoreError::from)?;
        Ok(out)
    }
}

fn configure(conn: &Connection) -> Result<(), StoreError> {
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        "#,
    )?;
    Ok(())
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_state (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
          owner TEXT NOT NULL,
          id TEXT NOT NULL,
          title TEXT NOT NULL,
          active INTEGER NOT NULL CHECK(active IN (0, 1)),
          completed INTEGER NOT NULL CHECK(completed IN (0, 1)),
          sort_key REAL NOT NULL,
          created_at_ms INTEGER NOT NULL,
          completed_at_ms INTEGER,
          activated_at_ms INTEGER,
          PRIMARY KEY(owner, id)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_owner_partition_key
          ON tasks(owner, active, sort_key);

        CREATE INDEX IF NOT EXISTS idx_tasks_owner_completed_at
          ON tasks(owner, completed_at_ms);
        "#,
    )?;

    let stored = conn
        .query_row(
            "SELECT schema_version FROM schema_state WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match stored {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => {
            conn.execute(
                "INSERT INTO schema_state(singleton, schema_version) VALUES (1, ?1)",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        }
    }
}

struct SqliteTx<'c> {
    tx: &'c Transaction<'c>,
}

impl TaskTx for SqliteTx<'_> {
    fn get(&mut self, owner: &OwnerId, task: &TaskId) -> Result<Option<Task>, StoreError> {
        let row = self
            .tx
            .query_row(
                "SELECT owner, id, title, active, completed, sort_key, created_at_ms, \
                        completed_at_ms, activated_at_ms \
                 FROM tasks WHERE owner=?1 AND id=?2",
                params![owner.as_str(), task.as_str()],
                read_row,
            )
            .optional()?;
        row.map(task_from_row).transpose()
    }

    fn insert(&mut self, task: &Task) -> Result<(), StoreError> {
        self.tx.execute(
            r#"
            INSERT INTO tasks(owner, id, title, active, completed, sort_key,
                              created_at_ms, completed_at_ms, activated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                task.owner_id.as_str(),
                task.id.as_str(),
                task.title,
                task.active as i64,
                task.completed as i64,
                task.sort_key,
                task.created_at_ms,
                task.completed_at_ms,
                task.activated_at_ms,
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, task: &Task) -> Result<(), StoreError> {
        let changed = self.tx.execute(
            r#"
            UPDATE tasks
               SET title=?3, active=?4, completed=?5, sort_key=?6,
                   completed_at_ms=?7, activated_at_ms=?8
             WHERE owner=?1 AND id=?2
            "#,
            params![
                task.owner_id.as_str(),
                task.id.as_str(),
                task.title,
                task.active as i64,
                task.completed as i64,
                task.sort_key,
                task.completed_at_ms,
                task.activated_at_ms,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete(&mut self, owner: &OwnerId, task: &TaskId) -> Result<bool, StoreError> {
        let deleted = self.tx.execute(
            "DELETE FROM tasks WHERE owner=?1 AND id=?2",
            params![owner.as_str(), task.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn delete_owner(&mut self, owner: &OwnerId) -> Result<usize, StoreError> {
        Ok(self
            .tx
            .execute("DELETE FROM tasks WHERE owner=?1", params![owner.as_str()])?)
    }

    fn scan_partition(
        &mut self,
        owner: &OwnerId,
        partition: Partition,
    ) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT owner, id, title, active, completed, sort_key, created_at_ms, \
                    completed_at_ms, activated_at_ms \
             FROM tasks WHERE owner=?1 AND active=?2 \
             ORDER BY sort_key ASC, id ASC",
        )?;
        let mut rows = stmt.query(params![owner.as_str(), partition.is_active() as i64])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(task_from_row(read_row(row)?)?);
        }
        Ok(out)
    }

    fn count_open_active(&mut self, owner: &OwnerId) -> Result<usize, StoreError> {
        let count = self.tx.query_row(
            "SELECT COUNT(1) FROM tasks WHERE owner=?1 AND active=1 AND completed=0",
            params![owner.as_str()],
            |row| row.get::<_, i64>(0),
        )?;
        to_count(count)
    }

    fn count_completed_in_window(
        &mut self,
        owner: &OwnerId,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<usize, StoreError> {
        let count = self.tx.query_row(
            "SELECT COUNT(1) FROM tasks \
             WHERE owner=?1 AND active=1 AND completed=1 \
               AND completed_at_ms >= ?2 AND completed_at_ms < ?3",
            params![owner.as_str(), start_ms, end_ms],
            |row| row.get::<_, i64>(0),
        )?;
        to_count(count)
    }

    fn rewrite_sort_keys(
        &mut self,
        owner: &OwnerId,
        keys: &[(TaskId, f64)],
    ) -> Result<(), StoreError> {
        let mut stmt = self
            .tx
            .prepare("UPDATE tasks SET sort_key=?3 WHERE owner=?1 AND id=?2")?;
        for (task, key) in keys {
            let changed = stmt.execute(params![owner.as_str(), task.as_str(), key])?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }
        }
        Ok(())
    }
}

type RawRow = (
    String,
    String,
    String,
    i64,
    i64,
    f64,
    i64,
    Option<i64>,
    Option<i64>,
);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn task_from_row(raw: RawRow) -> Result<Task, StoreError> {
    let (owner, id, title, active, completed, sort_key, created_at_ms, completed_at_ms, activated_at_ms) =
        raw;
    Ok(Task {
        owner_id: OwnerId::try_new(owner).map_err(|_| StoreError::InvalidInput("invalid task row"))?,
        id: TaskId::try_new(id).map_err(|_| StoreError::InvalidInput("invalid task row"))?,
        title,
        active: active != 0,
        completed: completed != 0,
        sort_key,
        created_at_ms,
        completed_at_ms,
        activated_at_ms,
    })
}

fn to_count(value: i64) -> Result<usize, StoreError> {
    usize::try_from(value).map_err(|_| StoreError::InvalidInput("negative count"))
}
