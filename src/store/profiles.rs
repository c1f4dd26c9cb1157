use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use crate::model::Profile;
use crate::util::now_utc_string;

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Store {
    pub fn register_profile(&self, id: &str, name: &str, email: &str) -> Result<Profile> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() || name.is_empty() {
            bail!("profile id and name are required");
        }

        if self.find_profile(id)?.is_some() {
            bail!("profile already exists: {id}");
        }

        let profile = Profile {
            id: id.to_string(),
            name: name.to_string(),
            email: email.trim().to_string(),
            avatar_url: String::new(),
            created_at: now_utc_string(),
        };

        self.connection
            .execute(
                "
                INSERT INTO profiles(id, name, email, avatar_url, created_at)
                VALUES(?1, ?2, ?3, ?4, ?5)
                ",
                params![
                    profile.id,
                    profile.name,
                    profile.email,
                    profile.avatar_url,
                    profile.created_at,
                ],
            )
            .with_context(|| format!("failed to insert profile {id}"))?;

        Ok(profile)
    }

    pub fn find_profile(&self, id: &str) -> Result<Option<Profile>> {
        let profile = self
            .connection
            .query_row(
                "
                SELECT id, name, email, avatar_url, created_at
                FROM profiles
                WHERE id = ?1
                ",
                params![id],
                profile_from_row,
            )
            .optional()
            .with_context(|| format!("failed to load profile {id}"))?;

        Ok(profile)
    }

    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut statement = self.connection.prepare(
            "
            SELECT id, name, email, avatar_url, created_at
            FROM profiles
            ORDER BY name ASC, id ASC
            ",
        )?;

        let profiles = statement
            .query_map([], profile_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list profiles")?;

        Ok(profiles)
    }

    /// Lowercased profile name to profile id. When two profiles share a name
    /// the later one in name order wins.
    pub fn profile_ids_by_name(&self) -> Result<HashMap<String, String>> {
        Ok(self
            .list_profiles()?
            .into_iter()
            .map(|profile| (profile.name.to_lowercase(), profile.id))
            .collect())
    }
}
