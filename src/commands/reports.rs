use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::DateTime;
use serde::Serialize;
use tracing::info;

use crate::cli::{ReportsAction, ReportsArgs};
use crate::commands::{load_config, open_store, output};
use crate::config::ReportConfig;
use crate::model::MonthlyReport;
use crate::store::Store;
use crate::util::{export_file_name, write_bytes};

#[derive(Debug, Serialize)]
pub struct MonthGroup {
    pub month: String,
    pub reports: Vec<MonthlyReport>,
}

pub fn run(args: ReportsArgs) -> Result<()> {
    let config = load_config(&args.data)?;
    let store = open_store(&args.data)?;

    match args.action {
        ReportsAction::List { user_id, json } => {
            let groups = group_visible_reports(store.list_monthly_reports()?, &user_id, &config);
            if json {
                return output::write_json(&groups);
            }

            let mut lines = Vec::new();
            for group in &groups {
                lines.push(group.month.clone());
                for report in &group.reports {
                    lines.push(format!(
                        "  {}\t{} - {}\t{}",
                        report.id,
                        display_person(report, &config),
                        report.summary,
                        display_date(&report.created_at)
                    ));
                }
            }
            output::write_lines(lines)
        }
        ReportsAction::Download {
            user_id,
            id,
            out_dir,
        } => {
            let path = download_report(&store, &config, &user_id, id, &out_dir)?;
            info!(id, path = %path.display(), "downloaded report");
            output::write_lines([path.display().to_string()])
        }
        ReportsAction::Delete { user_id, id } => {
            if !config.is_admin(&user_id) {
                bail!("only the admin can delete reports");
            }
            if !store.delete_monthly_report(id)? {
                bail!("report {id} not found");
            }
            info!(id, "report deleted");
            Ok(())
        }
    }
}

fn can_view(report: &MonthlyReport, viewer: &str, config: &ReportConfig) -> bool {
    config.is_admin(viewer) || report.user_id == viewer
}

/// Groups the reports `viewer` may see by month, keeping the incoming order
/// for both months and reports. Blank months group under `Unknown`.
pub fn group_visible_reports(
    reports: Vec<MonthlyReport>,
    viewer: &str,
    config: &ReportConfig,
) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();

    for report in reports {
        if !can_view(&report, viewer, config) {
            continue;
        }

        let month = match report.month.trim() {
            "" => "Unknown".to_string(),
            month => month.to_string(),
        };

        match groups.iter_mut().find(|group| group.month == month) {
            Some(group) => group.reports.push(report),
            None => groups.push(MonthGroup {
                month,
                reports: vec![report],
            }),
        }
    }

    groups
}

pub fn download_report(
    store: &Store,
    config: &ReportConfig,
    viewer: &str,
    id: i64,
    out_dir: &Path,
) -> Result<PathBuf> {
    let report = match store.find_monthly_report(id)? {
        Some(report) if can_view(&report, viewer, config) => report,
        _ => bail!("report {id} not found"),
    };

    let path = out_dir.join(export_file_name(report.person_name.as_deref().unwrap_or("report")));
    write_bytes(&path, &report.report)?;
    Ok(path)
}

fn display_person<'a>(report: &'a MonthlyReport, config: &'a ReportConfig) -> &'a str {
    match report.person_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => &config.unassigned_key,
    }
}

fn display_date(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|ts| ts.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}
