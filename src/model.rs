use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
pub enum TaskStatus {
    Pending,
    #[value(name = "in-progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "Work in progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Work in progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            other => bail!("unknown task status: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub created_by: String,
    pub author_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub id: i64,
    pub user_id: String,
    pub month: String,
    pub summary: String,
    pub person_name: Option<String>,
    #[serde(skip)]
    pub report: Vec<u8>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMonthlyReport<'a> {
    pub user_id: &'a str,
    pub month: &'a str,
    pub summary: &'a str,
    pub person_name: &'a str,
    pub report: &'a [u8],
}

/// Source workbook a team lead submitted for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalReport {
    pub id: i64,
    pub user_id: String,
    pub month: String,
    pub file_path: String,
    pub file_url: String,
    pub file_sha256: String,
    #[serde(skip)]
    pub file: Vec<u8>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewOriginalReport<'a> {
    pub user_id: &'a str,
    pub month: &'a str,
    pub file_path: &'a str,
    pub file_url: &'a str,
    pub file: &'a [u8],
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitArtifactEntry {
    pub assignee: String,
    pub filename: String,
    pub sheet_count: usize,
    pub row_count: usize,
    pub sha256: String,
}

/// Written next to exported per-assignee workbooks.
#[derive(Debug, Clone, Serialize)]
pub struct SplitManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_file: String,
    pub source_sha256: String,
    pub source_sheet_count: usize,
    pub source_row_count: usize,
    pub artifacts: Vec<SplitArtifactEntry>,
}
