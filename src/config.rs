use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Column names, defaults and policy knobs shared by every command.
///
/// Loaded from an optional JSON file; every field falls back to its default
/// so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub time_fields: Vec<String>,
    pub time_format: String,
    pub assignee_column: String,
    pub unassigned_key: String,
    pub client_column: String,
    pub unknown_client: String,
    pub location_column: String,
    pub issue_column: String,
    pub unspecified_issue: String,
    pub admin_user_id: Option<String>,
    pub public_base_url: Option<String>,
    pub task_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            time_fields: vec!["TIME IN".to_string(), "RESPONSE TIME".to_string()],
            time_format: "hh:mm".to_string(),
            assignee_column: "SERVICE PERSON".to_string(),
            unassigned_key: "Unidentified Issues".to_string(),
            client_column: "CLIENT NAME".to_string(),
            unknown_client: "Unknown".to_string(),
            location_column: "POP".to_string(),
            issue_column: "NATURE OF COMPLAINT".to_string(),
            unspecified_issue: "Unspecified".to_string(),
            admin_user_id: None,
            public_base_url: None,
            task_limit: 20,
        }
    }
}

impl ReportConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_user_id.as_deref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = ReportConfig::load(None).unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.task_limit, 20);
    }

    #[test]
    fn partial_file_overrides_named_fields_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"assignee_column": "ENGINEER", "admin_user_id": "lead-1"}}"#
        )
        .unwrap();

        let config = ReportConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.assignee_column, "ENGINEER");
        assert!(config.is_admin("lead-1"));
        assert!(!config.is_admin("someone-else"));
        assert_eq!(config.location_column, "POP");
    }
}
