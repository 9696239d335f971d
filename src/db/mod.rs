//! SQLite persistence for stages and tasks.
//!
//! A [`Database`] is a cheaply cloneable handle over a single connection;
//! the mutex serializes access, so every write is atomic and a read after
//! a write within one request sees the persisted state.

mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Stage, Task};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

fn set_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

fn stage_from_row(row: &Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get(0)?,
        name: row.get(1)?,
        order: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        stage: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Database {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open database at {}", path.as_ref().display()))?;
        set_pragmas(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database at the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "stagehand")
            .context("could not determine a data directory")?;
        let dir = dirs.data_dir();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("stagehand.db");
        tracing::debug!("using database at {}", path.display());
        Self::open(path)
    }

    /// In-memory database for tests and throwaway runs.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        set_pragmas(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> Result<()> {
        self.conn().execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ---- stages ----

    pub fn list_stages(&self) -> Result<Vec<Stage>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, name, "order", created_at FROM stages ORDER BY "order", name"#,
        )?;
        let rows = stmt.query_map([], stage_from_row)?;
        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }
        Ok(stages)
    }

    pub fn get_stage(&self, id: i64) -> Result<Option<Stage>> {
        let conn = self.conn();
        let stage = conn
            .query_row(
                r#"SELECT id, name, "order", created_at FROM stages WHERE id = ?1"#,
                [id],
                stage_from_row,
            )
            .optional()?;
        Ok(stage)
    }

    pub fn create_stage(&self, name: &str, order: i64) -> Result<Stage> {
        let conn = self.conn();
        let now = Utc::now();
        conn.execute(
            r#"INSERT INTO stages (name, "order", created_at) VALUES (?1, ?2, ?3)"#,
            params![name, order, now],
        )
        .with_context(|| format!("failed to create stage '{name}'"))?;
        Ok(Stage {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            order,
            created_at: now,
        })
    }

    /// True if another stage already uses `name` (exact match). Pass the
    /// id being updated in `exclude` so a record can keep its own name.
    pub fn stage_name_exists(&self, name: &str, exclude: Option<i64>) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = match exclude {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM stages WHERE name = ?1 AND id != ?2",
                params![name, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM stages WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    /// Apply the provided fields and return the updated stage, or `None`
    /// if no stage has this id.
    pub fn update_stage(&self, id: i64, name: Option<&str>, order: Option<i64>) -> Result<Option<Stage>> {
        {
            let conn = self.conn();
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
            if let Some(name) = name {
                sets.push("name = ?");
                values.push(Box::new(name.to_string()));
            }
            if let Some(order) = order {
                sets.push("\"order\" = ?");
                values.push(Box::new(order));
            }
            if !sets.is_empty() {
                let mut numbered = Vec::new();
                for (i, set) in sets.iter().enumerate() {
                    numbered.push(set.replace('?', &format!("?{}", i + 1)));
                }
                let sql = format!(
                    "UPDATE stages SET {} WHERE id = ?{}",
                    numbered.join(", "),
                    values.len() + 1
                );
                values.push(Box::new(id));
                let refs: Vec<&dyn rusqlite::types::ToSql> =
                    values.iter().map(|v| v.as_ref()).collect();
                conn.execute(&sql, refs.as_slice())
                    .with_context(|| format!("failed to update stage {id}"))?;
            }
        }
        self.get_stage(id)
    }

    /// Delete a stage row. Returns false when the id does not exist.
    /// Callers enforce the no-tasks guard; at the store level deletion
    /// cascades to any remaining tasks.
    pub fn delete_stage(&self, id: i64) -> Result<bool> {
        let deleted = self.conn().execute("DELETE FROM stages WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Number of tasks referencing this stage.
    pub fn stage_task_count(&self, id: i64) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE stage_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ---- tasks ----

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, completed, stage_id, created_at FROM tasks ORDER BY id",
        )?;
        let rows = stmt.query_map([], task_from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn();
        let task = conn
            .query_row(
                "SELECT id, title, completed, stage_id, created_at FROM tasks WHERE id = ?1",
                [id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    pub fn create_task(&self, title: &str, stage: i64, completed: bool) -> Result<Task> {
        let conn = self.conn();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO tasks (title, completed, stage_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![title, completed, stage, now],
        )
        .with_context(|| format!("failed to create task '{title}'"))?;
        Ok(Task {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            completed,
            stage,
            created_at: now,
        })
    }

    /// Apply the provided fields and return the updated task, or `None`
    /// if no task has this id.
    pub fn update_task(
        &self,
        id: i64,
        title: Option<&str>,
        completed: Option<bool>,
        stage: Option<i64>,
    ) -> Result<Option<Task>> {
        {
            let conn = self.conn();
            let mut sets = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
            if let Some(title) = title {
                sets.push("title = ?");
                values.push(Box::new(title.to_string()));
            }
            if let Some(completed) = completed {
                sets.push("completed = ?");
                values.push(Box::new(completed));
            }
            if let Some(stage) = stage {
                sets.push("stage_id = ?");
                values.push(Box::new(stage));
            }
            if !sets.is_empty() {
                let mut numbered = Vec::new();
                for (i, set) in sets.iter().enumerate() {
                    numbered.push(set.replace('?', &format!("?{}", i + 1)));
                }
                let sql = format!(
                    "UPDATE tasks SET {} WHERE id = ?{}",
                    numbered.join(", "),
                    values.len() + 1
                );
                values.push(Box::new(id));
                let refs: Vec<&dyn rusqlite::types::ToSql> =
                    values.iter().map(|v| v.as_ref()).collect();
                conn.execute(&sql, refs.as_slice())
                    .with_context(|| format!("failed to update task {id}"))?;
            }
        }
        self.get_task(id)
    }

    /// Delete a task row. No guard, unlike stages.
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let deleted = self.conn().execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}
