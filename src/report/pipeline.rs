use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use super::analytics::{AnalyticsTables, aggregate, build_analytics_workbook};
use super::builder::build_assignee_workbook;
use super::codec::{parse_workbook, serialize_workbook};
use super::partition::Partitioner;
use super::row::RowNormalizer;
use crate::config::ReportConfig;

/// Encoded workbook for one assignee.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedArtifact {
    pub assignee: String,
    pub sheet_count: usize,
    pub row_count: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitOutcome {
    pub source_sheet_count: usize,
    pub source_row_count: usize,
    pub artifacts: Vec<EncodedArtifact>,
}

impl SplitOutcome {
    pub fn assignees(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|artifact| artifact.assignee.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AnalyticsOutcome {
    pub tables: AnalyticsTables,
    pub bytes: Vec<u8>,
}

/// Splits a source workbook into one workbook per assignee.
///
/// Time-like strings in the configured time columns are normalized first;
/// each output keeps the tab structure of the source.
pub fn split_workbook(bytes: &[u8], config: &ReportConfig) -> Result<SplitOutcome> {
    let sheets = parse_workbook(bytes)?;
    let source_sheet_count = sheets.len();
    let source_row_count = sheets.iter().map(|sheet| sheet.rows.len()).sum();

    let normalizer = RowNormalizer::new(&config.time_fields)?;
    let partitioner = Partitioner::new(&config.assignee_column, &config.unassigned_key);

    let rows = sheets.into_iter().flat_map(|sheet| {
        let name = sheet.name;
        sheet
            .rows
            .into_iter()
            .map(move |row| (name.clone(), row))
    });
    let partition = partitioner.partition(rows.map(|(name, row)| (name, normalizer.normalize(row))));

    debug!(
        assignees = partition.entries().len(),
        rows = partition.row_count(),
        "partitioned rows"
    );

    let mut artifacts = Vec::with_capacity(partition.entries().len());
    for entry in partition.entries() {
        let workbook = build_assignee_workbook(entry, &config.time_fields, &config.time_format);
        let bytes = serialize_workbook(&workbook)?;
        debug!(
            assignee = %entry.assignee,
            sheets = workbook.sheets.len(),
            rows = workbook.row_count(),
            bytes = bytes.len(),
            "built assignee workbook"
        );

        artifacts.push(EncodedArtifact {
            assignee: entry.assignee.clone(),
            sheet_count: workbook.sheets.len(),
            row_count: entry.row_count(),
            bytes,
        });
    }

    info!(
        sheets = source_sheet_count,
        rows = source_row_count,
        assignees = artifacts.len(),
        "split workbook"
    );

    Ok(SplitOutcome {
        source_sheet_count,
        source_row_count,
        artifacts,
    })
}

/// Computes the analytics tables over every row of every sheet and encodes
/// them as a four-sheet workbook.
pub fn analyze_workbook(bytes: &[u8], name: &str, config: &ReportConfig) -> Result<AnalyticsOutcome> {
    let sheets = parse_workbook(bytes)?;
    let tables = aggregate(sheets.iter().flat_map(|sheet| sheet.rows.iter()), config);

    let workbook = build_analytics_workbook(name, &tables, config);
    let bytes = serialize_workbook(&workbook)?;

    info!(
        total_issues = tables.summary.total_issues,
        no_location = tables.summary.no_location_count,
        locations = tables.totals_by_location.len(),
        "analyzed workbook"
    );

    Ok(AnalyticsOutcome { tables, bytes })
}
