use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::blob::{BlobStore, LocalBlobStore, ORIGINAL_REPORTS_BUCKET};
use crate::cli::SplitArgs;
use crate::commands::{load_config, open_store, output};
use crate::model::{NewMonthlyReport, NewOriginalReport, SplitArtifactEntry, SplitManifest};
use crate::report::{SplitOutcome, split_workbook};
use crate::store::Store;
use crate::util::{
    export_file_name, name_segment, now_utc_string, sha256_bytes, unix_millis, write_bytes,
    write_json_pretty,
};

pub fn run(args: SplitArgs) -> Result<()> {
    let Some(path) = args.file.as_deref() else {
        bail!("no file selected");
    };
    if !path.is_file() {
        bail!("no file selected: {} is not a file", path.display());
    }

    let config = load_config(&args.data)?;
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "splitting workbook");

    let outcome = split_workbook(&bytes, &config)?;
    output::write_lines(outcome.assignees())?;

    if args.dry_run {
        info!(
            assignees = outcome.artifacts.len(),
            rows = outcome.source_row_count,
            "split dry-run complete"
        );
        return Ok(());
    }

    if args.submit {
        let user_id = args
            .user_id
            .as_deref()
            .context("--user-id is required to submit reports")?;
        let store = open_store(&args.data)?;
        let blobs = LocalBlobStore::new(args.data.storage_root(), config.public_base_url.clone());

        let request = SubmitRequest {
            user_id,
            month: &args.month,
            summary: &args.summary,
        };
        let receipt = submit_reports(&store, &blobs, &request, &outcome, &bytes)?;
        info!(
            reports = receipt.report_ids.len(),
            original = %receipt.original_path,
            url = %receipt.original_url,
            "monthly reports generated"
        );
        return Ok(());
    }

    let out_dir = match args.out_dir {
        Some(out_dir) => out_dir,
        None => {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("workbook");
            args.data.data_root.join("exports").join(name_segment(stem))
        }
    };

    let manifest = export_artifacts(&out_dir, path, &bytes, &outcome)?;
    info!(
        out_dir = %out_dir.display(),
        files = manifest.artifacts.len(),
        "exported assignee workbooks"
    );

    Ok(())
}

pub struct SubmitRequest<'a> {
    pub user_id: &'a str,
    pub month: &'a str,
    pub summary: &'a str,
}

#[derive(Debug)]
pub struct SubmitReceipt {
    pub report_ids: Vec<i64>,
    pub original_path: String,
    pub original_url: String,
}

/// Stores one monthly report per assignee and then the original workbook.
///
/// A report is owned by the profile whose name matches the assignee
/// case-insensitively, or by the submitting user when none does. The reports
/// are inserted together; they stay in place if the original upload fails.
pub fn submit_reports(
    store: &Store,
    blobs: &dyn BlobStore,
    request: &SubmitRequest<'_>,
    outcome: &SplitOutcome,
    original: &[u8],
) -> Result<SubmitReceipt> {
    let month = request.month.trim();
    if month.is_empty() {
        bail!("month is required to submit reports");
    }

    let ids_by_name = store.profile_ids_by_name()?;

    let mut reports = Vec::with_capacity(outcome.artifacts.len());
    for artifact in &outcome.artifacts {
        let owner = match ids_by_name.get(&artifact.assignee.to_lowercase()) {
            Some(id) => id.as_str(),
            None => {
                warn!(assignee = %artifact.assignee, "no matching profile; assigning to submitter");
                request.user_id
            }
        };

        reports.push(NewMonthlyReport {
            user_id: owner,
            month,
            summary: request.summary,
            person_name: &artifact.assignee,
            report: &artifact.bytes,
        });
    }
    let report_ids = store.insert_monthly_reports(&reports)?;

    let original_path = format!(
        "original_reports/{}_{}.xlsx",
        name_segment(month),
        unix_millis()
    );
    blobs.upload(ORIGINAL_REPORTS_BUCKET, &original_path, original, true)?;
    let original_url = blobs.public_url(ORIGINAL_REPORTS_BUCKET, &original_path);

    store.insert_original_report(&NewOriginalReport {
        user_id: request.user_id,
        month,
        file_path: &original_path,
        file_url: &original_url,
        file: original,
    })?;

    Ok(SubmitReceipt {
        report_ids,
        original_path,
        original_url,
    })
}

/// Writes each assignee workbook into `out_dir` along with a manifest.
pub fn export_artifacts(
    out_dir: &Path,
    source: &Path,
    source_bytes: &[u8],
    outcome: &SplitOutcome,
) -> Result<SplitManifest> {
    let mut taken = HashSet::new();
    let mut entries = Vec::with_capacity(outcome.artifacts.len());
    for artifact in &outcome.artifacts {
        let filename = claim_export_name(&mut taken, &artifact.assignee);
        write_bytes(&out_dir.join(&filename), &artifact.bytes)?;

        entries.push(SplitArtifactEntry {
            assignee: artifact.assignee.clone(),
            filename,
            sheet_count: artifact.sheet_count,
            row_count: artifact.row_count,
            sha256: sha256_bytes(&artifact.bytes),
        });
    }

    let manifest = SplitManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_file: source.display().to_string(),
        source_sha256: sha256_bytes(source_bytes),
        source_sheet_count: outcome.source_sheet_count,
        source_row_count: outcome.source_row_count,
        artifacts: entries,
    };
    write_json_pretty(&out_dir.join("split_manifest.json"), &manifest)?;

    Ok(manifest)
}

/// File name for `assignee` that no earlier artifact in this export uses.
/// Names that sanitize to the same file get ` (2)`, ` (3)`, ... appended.
fn claim_export_name(taken: &mut HashSet<String>, assignee: &str) -> String {
    let filename = export_file_name(assignee);
    let stem = filename.strip_suffix(".xlsx").unwrap_or(&filename).to_string();

    let mut candidate = filename;
    let mut counter = 2;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = format!("{stem} ({counter}).xlsx");
        counter += 1;
    }
    candidate
}
