use std::collections::BTreeMap;

use serde::Serialize;

use super::builder::{SheetData, WorkbookArtifact};
use super::row::{CellValue, Row};
use crate::config::ReportConfig;

pub const RECURRING_CLIENTS_SHEET: &str = "Recurring Clients";
pub const ISSUES_PER_POP_SHEET: &str = "Issues per POP";
pub const ISSUE_COUNT_PER_POP_SHEET: &str = "Issue Count per POP";
pub const SUMMARY_SHEET: &str = "Summary";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub total_issues: u64,
    pub no_location_count: u64,
}

/// Accumulated analytics over every row of a workbook.
///
/// Maps are keyed in sorted order so rendered tables are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsTables {
    /// Every client with its row count; the recurring filter is applied when rendering.
    pub client_counts: BTreeMap<String, u64>,
    pub issues_by_location: BTreeMap<String, BTreeMap<String, u64>>,
    pub totals_by_location: BTreeMap<String, u64>,
    pub summary: IssueSummary,
}

impl AnalyticsTables {
    pub fn recurring_entities(&self) -> impl Iterator<Item = (&str, u64)> {
        self.client_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(client, count)| (client.as_str(), *count))
    }
}

pub struct AnalyticsAggregator<'a> {
    config: &'a ReportConfig,
    tables: AnalyticsTables,
}

impl<'a> AnalyticsAggregator<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            tables: AnalyticsTables::default(),
        }
    }

    /// Folds one row into the accumulators. Missing columns fall back to the
    /// configured defaults; no row is ever rejected.
    pub fn observe(&mut self, row: &Row) {
        let client = row
            .trimmed_text(&self.config.client_column)
            .unwrap_or_else(|| self.config.unknown_client.clone());
        *self.tables.client_counts.entry(client).or_default() += 1;

        self.tables.summary.total_issues += 1;

        let Some(location) = row.trimmed_text(&self.config.location_column) else {
            self.tables.summary.no_location_count += 1;
            return;
        };

        let issue = row
            .trimmed_text(&self.config.issue_column)
            .unwrap_or_else(|| self.config.unspecified_issue.clone());

        *self
            .tables
            .totals_by_location
            .entry(location.clone())
            .or_default() += 1;
        *self
            .tables
            .issues_by_location
            .entry(location)
            .or_default()
            .entry(issue)
            .or_default() += 1;
    }

    pub fn finish(self) -> AnalyticsTables {
        self.tables
    }
}

pub fn aggregate<'r, I>(rows: I, config: &ReportConfig) -> AnalyticsTables
where
    I: IntoIterator<Item = &'r Row>,
{
    let mut aggregator = AnalyticsAggregator::new(config);
    for row in rows {
        aggregator.observe(row);
    }
    aggregator.finish()
}

/// Renders the four analytics tables as independent sheets.
pub fn build_analytics_workbook(
    name: impl Into<String>,
    tables: &AnalyticsTables,
    config: &ReportConfig,
) -> WorkbookArtifact {
    let mut workbook = WorkbookArtifact::new(name, config.time_format.clone());

    let mut recurring = SheetData::new(RECURRING_CLIENTS_SHEET, &["Client Name", "Occurrences"]);
    for (client, count) in tables.recurring_entities() {
        recurring.push_row(vec![CellValue::from(client), CellValue::from(count)]);
    }

    let mut issues = SheetData::new(ISSUES_PER_POP_SHEET, &["POP", "Issue", "Count"]);
    for (location, per_issue) in &tables.issues_by_location {
        for (issue, count) in per_issue {
            issues.push_row(vec![
                CellValue::from(location.as_str()),
                CellValue::from(issue.as_str()),
                CellValue::from(*count),
            ]);
        }
    }

    let mut totals = SheetData::new(ISSUE_COUNT_PER_POP_SHEET, &["POP", "Total Issues"]);
    for (location, count) in &tables.totals_by_location {
        totals.push_row(vec![CellValue::from(location.as_str()), CellValue::from(*count)]);
    }

    let mut summary = SheetData::new(SUMMARY_SHEET, &["Total Issues", "No POP Recorded"]);
    summary.push_row(vec![
        CellValue::from(tables.summary.total_issues),
        CellValue::from(tables.summary.no_location_count),
    ]);

    workbook.sheets = vec![recurring, issues, totals, summary];
    workbook
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(client: &str, pop: &str, issue: &str) -> Row {
        Row::new()
            .with("CLIENT NAME", client)
            .with("POP", pop)
            .with("NATURE OF COMPLAINT", issue)
    }

    #[test]
    fn rows_without_location_only_count_in_summary() {
        let config = ReportConfig::default();
        let rows = vec![
            row("Acme", "North", "Slow link"),
            row("Acme", "  ", "Slow link"),
            Row::new().with("CLIENT NAME", "Globex"),
        ];

        let tables = aggregate(&rows, &config);
        assert_eq!(tables.summary.total_issues, 3);
        assert_eq!(tables.summary.no_location_count, 2);
        assert_eq!(tables.totals_by_location.get("North"), Some(&1));
        assert_eq!(tables.issues_by_location.len(), 1);
        let totals: u64 = tables.totals_by_location.values().sum();
        assert_eq!(
            totals,
            tables.summary.total_issues - tables.summary.no_location_count
        );
    }

    #[test]
    fn missing_columns_fall_back_to_defaults() {
        let config = ReportConfig::default();
        let rows = vec![Row::new().with("POP", "South"), Row::new().with("POP", "South")];

        let tables = aggregate(&rows, &config);
        assert_eq!(tables.client_counts.get("Unknown"), Some(&2));
        assert_eq!(
            tables.issues_by_location["South"].get("Unspecified"),
            Some(&2)
        );
    }

    #[test]
    fn recurring_clients_require_more_than_one_row() {
        let config = ReportConfig::default();
        let rows = vec![
            row("Acme", "North", "Slow link"),
            row("Acme", "North", "No link"),
            row("Initech", "East", "Slow link"),
        ];

        let tables = aggregate(&rows, &config);
        let recurring: Vec<_> = tables.recurring_entities().collect();
        assert_eq!(recurring, vec![("Acme", 2)]);
        assert_eq!(tables.client_counts.get("Initech"), Some(&1));
    }

    #[test]
    fn workbook_renders_four_sorted_sheets() {
        let config = ReportConfig::default();
        let rows = vec![
            row("Zeta", "West", "Outage"),
            row("Zeta", "East", "Slow link"),
            row("Acme", "East", "Outage"),
            row("Acme", "East", "Outage"),
        ];

        let tables = aggregate(&rows, &config);
        let workbook = build_analytics_workbook("July", &tables, &config);
        let names: Vec<_> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                RECURRING_CLIENTS_SHEET,
                ISSUES_PER_POP_SHEET,
                ISSUE_COUNT_PER_POP_SHEET,
                SUMMARY_SHEET
            ]
        );

        let issues = workbook.sheet(ISSUES_PER_POP_SHEET).unwrap();
        assert_eq!(issues.columns, vec!["POP", "Issue", "Count"]);
        assert_eq!(
            issues.rows,
            vec![
                vec![
                    Some(CellValue::from("East")),
                    Some(CellValue::from("Outage")),
                    Some(CellValue::Number(2.0))
                ],
                vec![
                    Some(CellValue::from("East")),
                    Some(CellValue::from("Slow link")),
                    Some(CellValue::Number(1.0))
                ],
                vec![
                    Some(CellValue::from("West")),
                    Some(CellValue::from("Outage")),
                    Some(CellValue::Number(1.0))
                ],
            ]
        );

        let recurring = workbook.sheet(RECURRING_CLIENTS_SHEET).unwrap();
        assert_eq!(recurring.rows.len(), 2);
        assert_eq!(recurring.rows[0][0], Some(CellValue::from("Acme")));

        let summary = workbook.sheet(SUMMARY_SHEET).unwrap();
        assert_eq!(
            summary.rows,
            vec![vec![Some(CellValue::Number(4.0)), Some(CellValue::Number(0.0))]]
        );
    }
}
