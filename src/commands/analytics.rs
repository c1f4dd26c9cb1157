use anyhow::{Result, bail};
use tracing::info;

use crate::blob::{ANALYTICS_BUCKET, BlobStore, LocalBlobStore};
use crate::cli::AnalyticsArgs;
use crate::commands::{load_config, open_store, output};
use crate::config::ReportConfig;
use crate::report::analytics::AnalyticsTables;
use crate::report::analyze_workbook;
use crate::store::Store;
use crate::util::{name_segment, unix_millis, write_bytes};

pub fn run(args: AnalyticsArgs) -> Result<()> {
    let config = load_config(&args.data)?;
    let store = open_store(&args.data)?;

    if args.list_months {
        let months = store.list_original_report_months()?;
        info!(months = months.len(), "listed report months");
        return output::write_lines(months);
    }

    let month = args.month.as_deref().map(str::trim).unwrap_or_default();
    if month.is_empty() {
        bail!("missing month: select the month name");
    }

    let blobs = LocalBlobStore::new(args.data.storage_root(), config.public_base_url.clone());
    let generated = generate_for_month(&store, &blobs, month, &config)?;

    if let Some(out) = &args.out {
        write_bytes(out, &generated.bytes)?;
        info!(path = %out.display(), "wrote analytics workbook");
    }

    let summary = generated.tables.summary;
    output::write_lines([
        format!("original: {}", generated.original_url),
        format!("generated: {} ({})", generated.generated_url, generated.generated_name),
        format!(
            "issues: {} total, {} without POP, {} recurring clients",
            summary.total_issues,
            summary.no_location_count,
            generated.tables.recurring_entities().count()
        ),
    ])
}

#[derive(Debug)]
pub struct MonthAnalytics {
    pub original_url: String,
    pub generated_name: String,
    pub generated_url: String,
    pub tables: AnalyticsTables,
    pub bytes: Vec<u8>,
}

/// Analyzes the most recent original workbook submitted for `month` and
/// uploads the resulting analytics workbook.
pub fn generate_for_month(
    store: &Store,
    blobs: &dyn BlobStore,
    month: &str,
    config: &ReportConfig,
) -> Result<MonthAnalytics> {
    let Some(original) = store.latest_original_report(month)? else {
        bail!("no report found for \"{month}\"");
    };

    let outcome = analyze_workbook(&original.file, month, config)?;

    let generated_name = format!(
        "teamlead-report-{}-{}.xlsx",
        name_segment(month),
        unix_millis()
    );
    blobs.upload(ANALYTICS_BUCKET, &generated_name, &outcome.bytes, true)?;
    let generated_url = blobs.public_url(ANALYTICS_BUCKET, &generated_name);

    info!(
        month,
        original = %original.file_path,
        generated = %generated_name,
        total_issues = outcome.tables.summary.total_issues,
        "generated team-lead analytics"
    );

    Ok(MonthAnalytics {
        original_url: original.file_url,
        generated_name,
        generated_url,
        tables: outcome.tables,
        bytes: outcome.bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewOriginalReport;
    use crate::report::builder::{SheetData, WorkbookArtifact};
    use crate::report::codec::{parse_workbook, serialize_workbook};
    use crate::report::row::Row;

    fn original_workbook() -> Vec<u8> {
        let rows = vec![
            Row::new()
                .with("CLIENT NAME", "Acme")
                .with("POP", "North")
                .with("NATURE OF COMPLAINT", "Slow link"),
            Row::new()
                .with("CLIENT NAME", "Acme")
                .with("NATURE OF COMPLAINT", "Outage"),
        ];
        let mut artifact = WorkbookArtifact::new("July", "hh:mm");
        artifact
            .sheets
            .push(SheetData::from_rows("Week 1", &rows, &[]));
        serialize_workbook(&artifact).unwrap()
    }

    #[test]
    fn generates_and_uploads_for_latest_original() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory().unwrap();
        let blobs = LocalBlobStore::new(dir.path(), None);
        let config = ReportConfig::default();

        let file = original_workbook();
        store
            .insert_original_report(&NewOriginalReport {
                user_id: "lead",
                month: "July",
                file_path: "original_reports/July_1.xlsx",
                file_url: "file:///original.xlsx",
                file: &file,
            })
            .unwrap();

        let generated = generate_for_month(&store, &blobs, "July", &config).unwrap();
        assert_eq!(generated.original_url, "file:///original.xlsx");
        assert!(generated.generated_name.starts_with("teamlead-report-July-"));
        assert_eq!(generated.tables.summary.total_issues, 2);
        assert_eq!(generated.tables.summary.no_location_count, 1);

        let uploaded = std::fs::read(
            dir.path()
                .join(ANALYTICS_BUCKET)
                .join(&generated.generated_name),
        )
        .unwrap();
        let sheets = parse_workbook(&uploaded).unwrap();
        assert_eq!(sheets.len(), 4);
    }

    #[test]
    fn unknown_month_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory().unwrap();
        let blobs = LocalBlobStore::new(dir.path(), None);

        let err = generate_for_month(&store, &blobs, "August", &ReportConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "no report found for \"August\"");
    }
}
