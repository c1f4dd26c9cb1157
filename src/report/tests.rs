use super::analytics::{
    ISSUE_COUNT_PER_POP_SHEET, ISSUES_PER_POP_SHEET, RECURRING_CLIENTS_SHEET, SUMMARY_SHEET,
};
use super::builder::{SheetData, WorkbookArtifact};
use super::codec::{parse_workbook, serialize_workbook};
use super::row::{CellValue, Row, TimeOfDay};
use super::*;
use crate::config::ReportConfig;

fn source_workbook(sheets: Vec<(&str, Vec<Row>)>) -> Vec<u8> {
    let mut artifact = WorkbookArtifact::new("source", "hh:mm");
    for (name, rows) in sheets {
        artifact
            .sheets
            .push(SheetData::from_rows(name, &rows, &[]));
    }
    serialize_workbook(&artifact).unwrap()
}

fn ticket(person: &str, pop: &str, client: &str, complaint: &str) -> Row {
    Row::new()
        .with("SERVICE PERSON", person)
        .with("POP", pop)
        .with("CLIENT NAME", client)
        .with("NATURE OF COMPLAINT", complaint)
}

fn scenario_rows() -> Vec<Row> {
    vec![
        ticket("Ade", "North", "Acme", "Slow link").with("TIME IN", "9:15"),
        ticket("", "North", "Acme", "Slow link").with("TIME IN", "10:40"),
    ]
}

#[test]
fn builder_output_round_trips_through_codec() {
    let rows = vec![
        Row::new()
            .with("TICKET", 1.0)
            .with("CLIENT NAME", "Acme")
            .with("RESOLVED", CellValue::Bool(true)),
        Row::new()
            .with("TICKET", 2.5)
            .with("CLIENT NAME", "Globex")
            .with("RESOLVED", CellValue::Bool(false)),
        Row::new().with("TICKET", 3.0).with("CLIENT NAME", "Initech"),
    ];

    let bytes = source_workbook(vec![("January", rows.clone()), ("February", Vec::new())]);
    let parsed = parse_workbook(&bytes).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "January");
    assert_eq!(parsed[0].rows, rows);
    assert_eq!(parsed[1].name, "February");
    assert!(parsed[1].rows.is_empty());
}

#[test]
fn time_values_come_back_as_formatted_serials() {
    let mut artifact = WorkbookArtifact::new("Ade", "hh:mm");
    artifact.sheets.push(SheetData::from_rows(
        "January",
        &[Row::new()
            .with("CLIENT NAME", "Acme")
            .with("TIME IN", CellValue::Time(TimeOfDay { hour: 9, minute: 15 }))],
        &ReportConfig::default().time_fields,
    ));

    let parsed = parse_workbook(&serialize_workbook(&artifact).unwrap()).unwrap();
    let value = parsed[0].rows[0].get("TIME IN").cloned();
    match value {
        Some(CellValue::DateTime(serial)) => {
            let minutes = (serial * 1440.0).round() as u32;
            assert_eq!(minutes, 9 * 60 + 15);
        }
        other => panic!("expected a time serial, got {other:?}"),
    }
}

#[test]
fn split_matches_documented_scenario() {
    let config = ReportConfig::default();
    let bytes = source_workbook(vec![("January", scenario_rows())]);

    let outcome = split_workbook(&bytes, &config).unwrap();
    assert_eq!(outcome.source_row_count, 2);
    let assignees: Vec<_> = outcome.assignees().collect();
    assert_eq!(assignees, vec!["Ade", "Unidentified Issues"]);

    let ade = parse_workbook(&outcome.artifacts[0].bytes).unwrap();
    assert_eq!(ade.len(), 1);
    assert_eq!(ade[0].name, "January");
    assert_eq!(ade[0].rows.len(), 1);
    assert_eq!(
        ade[0].rows[0].get("SERVICE PERSON"),
        Some(&CellValue::from("Ade"))
    );
    assert!(matches!(
        ade[0].rows[0].get("TIME IN"),
        Some(CellValue::DateTime(_))
    ));

    let unidentified = parse_workbook(&outcome.artifacts[1].bytes).unwrap();
    assert_eq!(unidentified[0].rows.len(), 1);
    assert_eq!(unidentified[0].rows[0].get("SERVICE PERSON"), None);
}

#[test]
fn split_preserves_row_count_across_sheets() {
    let config = ReportConfig::default();
    let january = vec![
        ticket("Ade", "North", "Acme", "Slow link"),
        ticket("Bola", "South", "Globex", "Outage"),
        ticket("  ", "", "Initech", "Outage"),
    ];
    let february = vec![
        ticket("Bola", "South", "Globex", "Outage"),
        ticket("Ade", "East", "Acme", "No link"),
    ];
    let bytes = source_workbook(vec![("January", january), ("February", february)]);

    let outcome = split_workbook(&bytes, &config).unwrap();
    let total: usize = outcome.artifacts.iter().map(|a| a.row_count).sum();
    assert_eq!(total, outcome.source_row_count);
    assert_eq!(total, 5);

    let bola = outcome
        .artifacts
        .iter()
        .find(|artifact| artifact.assignee == "Bola")
        .unwrap();
    assert_eq!(bola.sheet_count, 2);
    let parsed = parse_workbook(&bola.bytes).unwrap();
    let names: Vec<_> = parsed.iter().map(|sheet| sheet.name.as_str()).collect();
    assert_eq!(names, vec!["January", "February"]);
}

#[test]
fn analytics_matches_documented_scenario() {
    let config = ReportConfig::default();
    let bytes = source_workbook(vec![("January", scenario_rows())]);

    let outcome = analyze_workbook(&bytes, "January", &config).unwrap();
    let recurring: Vec<_> = outcome.tables.recurring_entities().collect();
    assert_eq!(recurring, vec![("Acme", 2)]);
    assert_eq!(outcome.tables.totals_by_location.get("North"), Some(&2));
    assert_eq!(outcome.tables.summary.total_issues, 2);
    assert_eq!(outcome.tables.summary.no_location_count, 0);

    let parsed = parse_workbook(&outcome.bytes).unwrap();
    let names: Vec<_> = parsed.iter().map(|sheet| sheet.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            RECURRING_CLIENTS_SHEET,
            ISSUES_PER_POP_SHEET,
            ISSUE_COUNT_PER_POP_SHEET,
            SUMMARY_SHEET
        ]
    );

    let summary = &parsed[3].rows[0];
    assert_eq!(summary.get("Total Issues"), Some(&CellValue::Number(2.0)));
    assert_eq!(summary.get("No POP Recorded"), Some(&CellValue::Number(0.0)));

    let issues = &parsed[1].rows;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].get("Issue"), Some(&CellValue::from("Slow link")));
    assert_eq!(issues[0].get("Count"), Some(&CellValue::Number(2.0)));
}

#[test]
fn analytics_counts_rows_across_every_sheet() {
    let config = ReportConfig::default();
    let bytes = source_workbook(vec![
        (
            "January",
            vec![
                ticket("Ade", "North", "Acme", "Slow link"),
                ticket("Ade", "", "Acme", "Slow link"),
            ],
        ),
        (
            "February",
            vec![
                ticket("Bola", "South", "Globex", ""),
                Row::new().with("SERVICE PERSON", "Bola"),
            ],
        ),
    ]);

    let outcome = analyze_workbook(&bytes, "Q1", &config).unwrap();
    let summary = outcome.tables.summary;
    assert_eq!(summary.total_issues, 4);
    assert_eq!(summary.no_location_count, 2);
    let located: u64 = outcome.tables.totals_by_location.values().sum();
    assert_eq!(located, summary.total_issues - summary.no_location_count);
    assert_eq!(
        outcome.tables.issues_by_location["South"].get("Unspecified"),
        Some(&1)
    );
    assert_eq!(outcome.tables.client_counts.get("Unknown"), Some(&1));
}

#[test]
fn garbage_bytes_are_reported_as_failures() {
    let config = ReportConfig::default();
    assert!(split_workbook(b"not a spreadsheet", &config).is_err());
    assert!(analyze_workbook(b"not a spreadsheet", "July", &config).is_err());
}
