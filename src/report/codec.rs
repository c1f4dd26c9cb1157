use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use super::builder::{SheetData, WorkbookArtifact};
use super::row::{CellValue, Row};

const DATE_FORMAT: &str = "m/d/yyyy";
const DATE_TIME_FORMAT: &str = "m/d/yyyy h:mm:ss";
const CLOCK_FORMAT: &str = "h:mm:ss";

/// Parsed contents of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Decodes workbook bytes into header-keyed rows, one entry per sheet in
/// workbook order.
///
/// The first row of each sheet is the header. Empty cells are left out of a
/// row and rows with no values at all are skipped.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<ParsedSheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .context("failed to open workbook")?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("failed to read worksheet {sheet_name}"))?;

        let mut rows_iter = range.rows();
        let headers = rows_iter.next().map(header_names).unwrap_or_default();

        let mut rows = Vec::new();
        for cells in rows_iter {
            let mut row = Row::new();
            for (header, cell) in headers.iter().zip(cells) {
                if let Some(value) = cell_value(cell) {
                    row.insert(header.as_str(), value);
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        sheets.push(ParsedSheet {
            name: sheet_name,
            rows,
        });
    }

    Ok(sheets)
}

/// Header text per column. Blank headers become `__EMPTY`, `__EMPTY_1`, ...
/// and repeated headers get the next numeric suffix not already taken, so
/// every key stays unique even when a literal header looks like a suffix.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(cells.len());

    for cell in cells {
        let base = match cell_value(cell) {
            Some(value) => value.as_text(),
            None => "__EMPTY".to_string(),
        };

        let mut name = base.clone();
        if taken.contains(&name) {
            let suffix = next_suffix.entry(base.clone()).or_insert(1);
            loop {
                name = format!("{base}_{suffix}");
                *suffix += 1;
                if !taken.contains(&name) {
                    break;
                }
            }
        }

        taken.insert(name.clone());
        names.push(name);
    }

    names
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(value) if value.is_empty() => None,
        Data::String(value) => Some(CellValue::Text(value.clone())),
        Data::Float(value) => Some(CellValue::Number(*value)),
        Data::Int(value) => Some(CellValue::Number(*value as f64)),
        Data::Bool(value) => Some(CellValue::Bool(*value)),
        Data::DateTime(value) => Some(CellValue::DateTime(value.as_f64())),
        Data::DateTimeIso(value) | Data::DurationIso(value) => Some(CellValue::Text(value.clone())),
        Data::Error(error) => Some(CellValue::Text(error.to_string())),
    }
}

/// Encodes an artifact as xlsx bytes: a header row followed by the data rows
/// of every sheet, with time columns carrying the artifact's time format.
pub fn serialize_workbook(artifact: &WorkbookArtifact) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let time_format = Format::new().set_num_format(&artifact.time_format);

    for sheet in &artifact.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .with_context(|| format!("invalid sheet name: {}", sheet.name))?;
        write_sheet(worksheet, sheet, &time_format)
            .with_context(|| format!("failed to write sheet {}", sheet.name))?;
    }

    workbook
        .save_to_buffer()
        .with_context(|| format!("failed to encode workbook {}", artifact.name))
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetData, time_format: &Format) -> Result<()> {
    for &index in &sheet.time_columns {
        worksheet.set_column_format(column_number(index)?, time_format)?;
    }

    for (index, header) in sheet.columns.iter().enumerate() {
        worksheet.write_string(0, column_number(index)?, header)?;
    }

    for (row_index, values) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(row_index + 1).context("too many rows for a worksheet")?;
        for (index, value) in values.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            write_cell(worksheet, row, column_number(index)?, value, time_format)?;
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    time_format: &Format,
) -> Result<()> {
    match value {
        CellValue::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        CellValue::Number(number) => {
            worksheet.write_number(row, col, *number)?;
        }
        CellValue::Bool(flag) => {
            worksheet.write_boolean(row, col, *flag)?;
        }
        CellValue::Time(time) => {
            worksheet.write_number_with_format(row, col, time.day_fraction(), time_format)?;
        }
        CellValue::DateTime(serial) => {
            let format = Format::new().set_num_format(serial_format(*serial));
            worksheet.write_number_with_format(row, col, *serial, &format)?;
        }
    }

    Ok(())
}

fn serial_format(serial: f64) -> &'static str {
    let has_date = serial.floor() > 0.0;
    let has_time = serial.fract().abs() > 0.0001;
    match (has_date, has_time) {
        (true, true) => DATE_TIME_FORMAT,
        (true, false) => DATE_FORMAT,
        _ => CLOCK_FORMAT,
    }
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).context("too many columns for a worksheet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_unique() {
        let cells = vec![
            Data::String("POP".to_string()),
            Data::Empty,
            Data::String("POP".to_string()),
            Data::Empty,
            Data::String("POP".to_string()),
        ];
        assert_eq!(
            header_names(&cells),
            vec!["POP", "__EMPTY", "POP_1", "__EMPTY_1", "POP_2"]
        );
    }

    #[test]
    fn suffixed_headers_skip_names_already_in_use() {
        let cells = vec![
            Data::String("POP_1".to_string()),
            Data::String("POP".to_string()),
            Data::String("POP".to_string()),
            Data::String("POP".to_string()),
        ];
        let names = header_names(&cells);
        assert_eq!(names, vec!["POP_1", "POP", "POP_2", "POP_3"]);

        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn serial_formats_follow_date_and_time_parts() {
        assert_eq!(serial_format(45123.0), DATE_FORMAT);
        assert_eq!(serial_format(45123.5), DATE_TIME_FORMAT);
        assert_eq!(serial_format(0.25), CLOCK_FORMAT);
    }

    #[test]
    fn blank_strings_are_treated_as_empty_cells() {
        assert_eq!(cell_value(&Data::String(String::new())), None);
        assert_eq!(cell_value(&Data::Int(3)), Some(CellValue::Number(3.0)));
    }
}
