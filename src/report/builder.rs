use super::partition::AssigneeRows;
use super::row::{CellValue, Row};

/// One worksheet ready for serialization: a header plus positional rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<CellValue>>>,
    /// Column indexes that carry a time-of-day display format.
    pub time_columns: Vec<usize>,
}

impl SheetData {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
            time_columns: Vec::new(),
        }
    }

    pub fn push_row(&mut self, values: Vec<CellValue>) {
        self.rows.push(values.into_iter().map(Some).collect());
    }

    /// Lays out `rows` using the key order of the first row as the schema.
    ///
    /// Later rows are not re-inspected: keys they add are dropped and keys they
    /// lack are left blank.
    pub fn from_rows(name: impl Into<String>, rows: &[Row], time_fields: &[String]) -> Self {
        let columns: Vec<String> = rows
            .first()
            .map(|first| first.columns().map(ToOwned::to_owned).collect())
            .unwrap_or_default();

        let time_columns = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| time_fields.contains(column))
            .map(|(index, _)| index)
            .collect();

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(column).cloned())
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
            time_columns,
        }
    }
}

/// A named spreadsheet document, one sheet per entry, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookArtifact {
    pub name: String,
    pub sheets: Vec<SheetData>,
    pub time_format: String,
}

impl WorkbookArtifact {
    pub fn new(name: impl Into<String>, time_format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
            time_format: time_format.into(),
        }
    }

    #[cfg(test)]
    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows.len()).sum()
    }
}

/// Builds the workbook for one assignee, keeping the source tab structure.
pub fn build_assignee_workbook(
    entry: &AssigneeRows,
    time_fields: &[String],
    time_format: &str,
) -> WorkbookArtifact {
    let mut workbook = WorkbookArtifact::new(entry.assignee.clone(), time_format);

    for sheet in &entry.sheets {
        workbook.sheets.push(SheetData::from_rows(
            sheet.sheet_name.clone(),
            &sheet.rows,
            time_fields,
        ));
    }

    workbook
}
