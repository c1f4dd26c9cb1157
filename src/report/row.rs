use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;

/// A single spreadsheet cell as seen by the report pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date/time as read from a date-formatted cell.
    DateTime(f64),
    Time(TimeOfDay),
}

impl CellValue {
    /// Display text of the value, following spreadsheet `toString` conventions:
    /// whole numbers print without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) | Self::DateTime(value) => format_number(*value),
            Self::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
            Self::Time(time) => time.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Time of day with the date component dropped and seconds fixed at zero.
///
/// Hour and minute are not range checked: `25:99` is kept as written and
/// rolls over when converted to a day fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn day_fraction(self) -> f64 {
        f64::from(self.hour * 60 + self.minute) / 1440.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Ordered column-name to value mapping for one parsed spreadsheet row.
///
/// Column order is the order in which values were inserted, which for parsed
/// rows is the header order of the source sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Sets `column`, replacing an existing value in place so the column keeps
    /// its original position.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value.into());
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Trimmed text of `column`; `None` when the column is absent or blank.
    pub fn trimmed_text(&self, column: &str) -> Option<String> {
        let text = self.get(column)?.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Rewrites `H:MM` / `HH:MM` strings in the configured time columns into
/// [`TimeOfDay`] values. Anything else passes through untouched.
pub struct RowNormalizer {
    time_fields: Vec<String>,
    pattern: Regex,
}

impl RowNormalizer {
    pub fn new(time_fields: &[String]) -> Result<Self> {
        // ASCII digits only, matching `\d` in the spreadsheet tooling this data comes from.
        let pattern =
            Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").context("failed to compile time pattern")?;

        Ok(Self {
            time_fields: time_fields.to_vec(),
            pattern,
        })
    }

    pub fn normalize(&self, mut row: Row) -> Row {
        for field in &self.time_fields {
            let Some(CellValue::Text(raw)) = row.get(field) else {
                continue;
            };

            if let Some(time) = self.parse_time(raw) {
                row.insert(field.as_str(), CellValue::Time(time));
            }
        }

        row
    }

    pub fn parse_time(&self, raw: &str) -> Option<TimeOfDay> {
        let captures = self.pattern.captures(raw.trim())?;
        let hour = captures.get(1)?.as_str().parse().ok()?;
        let minute = captures.get(2)?.as_str().parse().ok()?;
        Some(TimeOfDay { hour, minute })
    }
}
