use anyhow::{Context, Result, bail};
use rusqlite::{Row, params};

use super::Store;
use crate::model::{Task, TaskStatus};
use crate::util::now_utc_string;

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let status = status.parse::<TaskStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, err.into())
    })?;

    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        status,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Store {
    /// Tasks owned by `user_id`, newest first.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut statement = self.connection.prepare(
            "
            SELECT id, user_id, title, status, created_at, updated_at
            FROM tasks
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            ",
        )?;

        let tasks = statement
            .query_map(params![user_id], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to list tasks for {user_id}"))?;

        Ok(tasks)
    }

    pub fn add_task(&self, user_id: &str, title: &str, limit: usize) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            bail!("task title is required");
        }

        let existing: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if existing as usize >= limit {
            bail!("task limit ({limit}) reached");
        }

        let created_at = now_utc_string();
        self.connection
            .execute(
                "
                INSERT INTO tasks(user_id, title, status, created_at)
                VALUES(?1, ?2, ?3, ?4)
                ",
                params![user_id, title, TaskStatus::Pending.as_str(), created_at],
            )
            .context("failed to insert task")?;

        Ok(Task {
            id: self.connection.last_insert_rowid(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Pending,
            created_at,
            updated_at: None,
        })
    }

    /// Updates a task only when it belongs to `user_id`. Returns whether a
    /// task was changed.
    pub fn update_task_status(&self, user_id: &str, task_id: i64, status: TaskStatus) -> Result<bool> {
        let changed = self
            .connection
            .execute(
                "
                UPDATE tasks
                SET status = ?1, updated_at = ?2
                WHERE id = ?3 AND user_id = ?4
                ",
                params![status.as_str(), now_utc_string(), task_id, user_id],
            )
            .with_context(|| format!("failed to update task {task_id}"))?;

        Ok(changed > 0)
    }

    pub fn delete_completed_tasks(&self, user_id: &str) -> Result<usize> {
        let deleted = self
            .connection
            .execute(
                "DELETE FROM tasks WHERE user_id = ?1 AND status = ?2",
                params![user_id, TaskStatus::Completed.as_str()],
            )
            .with_context(|| format!("failed to delete completed tasks for {user_id}"))?;

        Ok(deleted)
    }
}
