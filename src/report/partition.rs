use std::collections::HashMap;

use super::row::Row;

/// Rows of one source sheet, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub sheet_name: String,
    pub rows: Vec<Row>,
}

/// All rows that share one assignee key, grouped by their source sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeRows {
    pub assignee: String,
    pub sheets: Vec<SheetRows>,
}

impl AssigneeRows {
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.rows.len()).sum()
    }

    fn push(&mut self, sheet_name: &str, row: Row) {
        match self
            .sheets
            .iter_mut()
            .find(|sheet| sheet.sheet_name == sheet_name)
        {
            Some(sheet) => sheet.rows.push(row),
            None => self.sheets.push(SheetRows {
                sheet_name: sheet_name.to_string(),
                rows: vec![row],
            }),
        }
    }
}

/// Assignee key -> sheet name -> rows. Assignees and sheets keep the order in
/// which they were first seen.
#[derive(Debug, Default)]
pub struct Partition {
    entries: Vec<AssigneeRows>,
    index: HashMap<String, usize>,
}

impl Partition {
    pub fn entries(&self) -> &[AssigneeRows] {
        &self.entries
    }

    pub fn row_count(&self) -> usize {
        self.entries.iter().map(AssigneeRows::row_count).sum()
    }

    fn push(&mut self, assignee: String, sheet_name: &str, row: Row) {
        let position = match self.index.get(&assignee) {
            Some(&position) => position,
            None => {
                self.entries.push(AssigneeRows {
                    assignee: assignee.clone(),
                    sheets: Vec::new(),
                });
                self.index.insert(assignee, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        self.entries[position].push(sheet_name, row);
    }
}

pub struct Partitioner<'a> {
    assignee_column: &'a str,
    unassigned_key: &'a str,
}

impl<'a> Partitioner<'a> {
    pub fn new(assignee_column: &'a str, unassigned_key: &'a str) -> Self {
        Self {
            assignee_column,
            unassigned_key,
        }
    }

    pub fn assignee_key(&self, row: &Row) -> String {
        row.trimmed_text(self.assignee_column)
            .unwrap_or_else(|| self.unassigned_key.to_string())
    }

    pub fn partition<I>(&self, rows: I) -> Partition
    where
        I: IntoIterator<Item = (String, Row)>,
    {
        let mut partition = Partition::default();

        for (sheet_name, row) in rows {
            let assignee = self.assignee_key(&row);
            partition.push(assignee, &sheet_name, row);
        }

        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::row::CellValue;

    fn row(person: &str, ticket: f64) -> Row {
        Row::new()
            .with("SERVICE PERSON", person)
            .with("TICKET", ticket)
    }

    fn partitioner() -> Partitioner<'static> {
        Partitioner::new("SERVICE PERSON", "Unidentified Issues")
    }

    #[test]
    fn blank_and_missing_assignees_use_sentinel() {
        let partitioner = partitioner();
        assert_eq!(partitioner.assignee_key(&row("   ", 1.0)), "Unidentified Issues");
        assert_eq!(partitioner.assignee_key(&row("", 1.0)), "Unidentified Issues");
        assert_eq!(
            partitioner.assignee_key(&Row::new().with("POP", "North")),
            "Unidentified Issues"
        );
        assert_eq!(partitioner.assignee_key(&row("  Ade ", 1.0)), "Ade");
    }

    #[test]
    fn numeric_assignee_values_become_text_keys() {
        let row = Row::new().with("SERVICE PERSON", 7.0);
        assert_eq!(partitioner().assignee_key(&row), "7");
    }

    #[test]
    fn partition_preserves_row_count_and_source_order() {
        let input = vec![
            ("January".to_string(), row("Ade", 1.0)),
            ("January".to_string(), row("Bola", 2.0)),
            ("February".to_string(), row("Ade", 3.0)),
            ("January".to_string(), row("Ade", 4.0)),
            ("February".to_string(), row("", 5.0)),
        ];

        let partition = partitioner().partition(input);
        assert_eq!(partition.row_count(), 5);

        let assignees: Vec<_> = partition
            .entries()
            .iter()
            .map(|entry| entry.assignee.as_str())
            .collect();
        assert_eq!(assignees, vec!["Ade", "Bola", "Unidentified Issues"]);

        let ade = &partition.entries()[0];
        let sheet_names: Vec<_> = ade.sheets.iter().map(|s| s.sheet_name.as_str()).collect();
        assert_eq!(sheet_names, vec!["January", "February"]);

        let january_tickets: Vec<_> = ade.sheets[0]
            .rows
            .iter()
            .map(|row| row.get("TICKET").cloned())
            .collect();
        assert_eq!(
            january_tickets,
            vec![Some(CellValue::Number(1.0)), Some(CellValue::Number(4.0))]
        );
    }

    #[test]
    fn empty_input_produces_empty_partition() {
        let partition = partitioner().partition(Vec::new());
        assert!(partition.entries().is_empty());
        assert_eq!(partition.row_count(), 0);
    }
}
