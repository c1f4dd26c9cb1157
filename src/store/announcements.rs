use anyhow::{Context, Result, bail};
use rusqlite::params;

use super::Store;
use crate::model::Announcement;
use crate::util::now_utc_string;

impl Store {
    pub fn create_announcement(&self, author_id: &str, title: &str, message: &str) -> Result<Announcement> {
        let title = title.trim();
        let message = message.trim();
        if title.is_empty() || message.is_empty() {
            bail!("announcement title and message are required");
        }

        let Some(author) = self.find_profile(author_id)? else {
            bail!("no profile for announcement author {author_id}");
        };

        let created_at = now_utc_string();
        self.connection
            .execute(
                "
                INSERT INTO announcements(title, message, created_by, created_at)
                VALUES(?1, ?2, ?3, ?4)
                ",
                params![title, message, author.id, created_at],
            )
            .context("failed to insert announcement")?;

        Ok(Announcement {
            id: self.connection.last_insert_rowid(),
            title: title.to_string(),
            message: message.to_string(),
            created_by: author.id,
            author_name: Some(author.name),
            created_at,
        })
    }

    /// All announcements, newest first, with the author's current name.
    pub fn list_announcements(&self) -> Result<Vec<Announcement>> {
        let mut statement = self.connection.prepare(
            "
            SELECT a.id, a.title, a.message, a.created_by, p.name, a.created_at
            FROM announcements a
            LEFT JOIN profiles p ON p.id = a.created_by
            ORDER BY a.created_at DESC, a.id DESC
            ",
        )?;

        let announcements = statement
            .query_map([], |row| {
                Ok(Announcement {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    message: row.get(2)?,
                    created_by: row.get(3)?,
                    author_name: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list announcements")?;

        Ok(announcements)
    }

    pub fn delete_announcement(&self, id: i64) -> Result<bool> {
        let deleted = self
            .connection
            .execute("DELETE FROM announcements WHERE id = ?1", params![id])
            .with_context(|| format!("failed to delete announcement {id}"))?;

        Ok(deleted > 0)
    }
}
