use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use crate::model::{MonthlyReport, NewMonthlyReport, NewOriginalReport, OriginalReport};
use crate::util::{now_utc_string, sha256_bytes};

fn monthly_report_from_row(row: &Row<'_>) -> rusqlite::Result<MonthlyReport> {
    Ok(MonthlyReport {
        id: row.get(0)?,
        user_id: row.get(1)?,
        month: row.get(2)?,
        summary: row.get(3)?,
        person_name: row.get(4)?,
        report: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn original_report_from_row(row: &Row<'_>) -> rusqlite::Result<OriginalReport> {
    Ok(OriginalReport {
        id: row.get(0)?,
        user_id: row.get(1)?,
        month: row.get(2)?,
        file_path: row.get(3)?,
        file_url: row.get(4)?,
        file_sha256: row.get(5)?,
        file: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn insert_monthly_report(connection: &Connection, report: &NewMonthlyReport<'_>) -> Result<i64> {
    connection
        .execute(
            "
            INSERT INTO monthly_reports(user_id, month, summary, person_name, report, created_at)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                report.user_id,
                report.month,
                report.summary,
                report.person_name,
                report.report,
                now_utc_string(),
            ],
        )
        .with_context(|| format!("failed to insert monthly report for {}", report.person_name))?;

    Ok(connection.last_insert_rowid())
}

impl Store {
    /// Inserts all `reports` in one transaction: either every row is stored
    /// or none is.
    pub fn insert_monthly_reports(&self, reports: &[NewMonthlyReport<'_>]) -> Result<Vec<i64>> {
        let tx = self
            .connection
            .unchecked_transaction()
            .context("failed to begin monthly report transaction")?;

        let mut ids = Vec::with_capacity(reports.len());
        for report in reports {
            ids.push(insert_monthly_report(&tx, report)?);
        }

        tx.commit().context("failed to commit monthly reports")?;
        Ok(ids)
    }

    /// Every monthly report, newest first.
    pub fn list_monthly_reports(&self) -> Result<Vec<MonthlyReport>> {
        let mut statement = self.connection.prepare(
            "
            SELECT id, user_id, month, summary, person_name, report, created_at
            FROM monthly_reports
            ORDER BY created_at DESC, id DESC
            ",
        )?;

        let reports = statement
            .query_map([], monthly_report_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list monthly reports")?;

        Ok(reports)
    }

    pub fn find_monthly_report(&self, id: i64) -> Result<Option<MonthlyReport>> {
        let report = self
            .connection
            .query_row(
                "
                SELECT id, user_id, month, summary, person_name, report, created_at
                FROM monthly_reports
                WHERE id = ?1
                ",
                params![id],
                monthly_report_from_row,
            )
            .optional()
            .with_context(|| format!("failed to load monthly report {id}"))?;

        Ok(report)
    }

    pub fn delete_monthly_report(&self, id: i64) -> Result<bool> {
        let deleted = self
            .connection
            .execute("DELETE FROM monthly_reports WHERE id = ?1", params![id])
            .with_context(|| format!("failed to delete monthly report {id}"))?;

        Ok(deleted > 0)
    }

    pub fn insert_original_report(&self, report: &NewOriginalReport<'_>) -> Result<i64> {
        self.connection
            .execute(
                "
                INSERT INTO teamlead_original_reports(
                  user_id, month, file_path, file_url, file_sha256, file, created_at
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
                params![
                    report.user_id,
                    report.month,
                    report.file_path,
                    report.file_url,
                    sha256_bytes(report.file),
                    report.file,
                    now_utc_string(),
                ],
            )
            .with_context(|| format!("failed to insert original report {}", report.file_path))?;

        Ok(self.connection.last_insert_rowid())
    }

    /// Distinct months with a stored original, most recently submitted first.
    pub fn list_original_report_months(&self) -> Result<Vec<String>> {
        let mut statement = self.connection.prepare(
            "
            SELECT month
            FROM teamlead_original_reports
            GROUP BY month
            ORDER BY MAX(created_at) DESC, MAX(id) DESC
            ",
        )?;

        let months = statement
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("failed to list report months")?;

        Ok(months)
    }

    pub fn latest_original_report(&self, month: &str) -> Result<Option<OriginalReport>> {
        let report = self
            .connection
            .query_row(
                "
                SELECT id, user_id, month, file_path, file_url, file_sha256, file, created_at
                FROM teamlead_original_reports
                WHERE month = ?1
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                ",
                params![month],
                original_report_from_row,
            )
            .optional()
            .with_context(|| format!("failed to load original report for {month}"))?;

        Ok(report)
    }
}
