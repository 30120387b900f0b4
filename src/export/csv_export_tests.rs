#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::{EntryKind, LabelRef};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn label(id: i64, name: &str) -> LabelRef {
    LabelRef {
        id,
        name: name.into(),
        color: "#808080".into(),
        icon: "label".into(),
    }
}

fn entry(id: i64, kind: EntryKind, from: Option<i64>, to: i64) -> Entry {
    Entry {
        id,
        from_account_id: from,
        to_account_id: to,
        date: NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap(),
        amount: dec!(12.50),
        kind,
        description: String::new(),
        location: String::new(),
        category: label(1, "System"),
        tags: Vec::new(),
        created_at: "2024-03-09T08:15:00Z".into(),
        updated_at: "2024-03-09T08:15:00Z".into(),
    }
}

fn names() -> HashMap<i64, String> {
    HashMap::from([(1, "Checking".to_string()), (2, "Savings".to_string())])
}

fn export(entries: &[Entry]) -> String {
    let mut out = Vec::new();
    let count = CsvExporter::new(names()).write(&mut out, entries).unwrap();
    assert_eq!(count, entries.len());
    String::from_utf8(out).unwrap()
}

#[test]
fn test_header_only_when_empty() {
    let csv = export(&[]);
    assert_eq!(
        csv,
        "id,date,kind,amount,from_account,to_account,category,tags,description,location\n"
    );
}

#[test]
fn test_rows_resolve_names_and_tags() {
    let mut e = entry(7, EntryKind::Transfer, Some(1), 2);
    e.tags = vec![label(3, "trip"), label(4, "work")];
    let csv = export(&[e]);
    let row = csv.lines().nth(1).unwrap();
    assert_eq!(
        row,
        "7,2024-03-09 08:15:00,TRANSFER,12.50,Checking,Savings,System,trip;work,,"
    );
}

#[test]
fn test_unknown_account_falls_back_to_id() {
    let csv = export(&[entry(1, EntryKind::Income, None, 99)]);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with("1,2024-03-09 08:15:00,INCOME,12.50,,99,"));
}

#[test]
fn test_fields_with_commas_are_quoted() {
    let mut e = entry(2, EntryKind::Expense, None, 1);
    e.description = "Coffee, large".into();
    let csv = export(&[e]);
    assert!(csv.contains("\"Coffee, large\""));

    let mut rdr = csv::Reader::from_reader(csv.as_bytes());
    let record = rdr.records().next().unwrap().unwrap();
    assert_eq!(&record[8], "Coffee, large");
}

#[test]
fn test_export_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = CsvExporter::new(names())
        .export_to_path(&path, &[entry(1, EntryKind::Expense, None, 1)])
        .unwrap();
    assert_eq!(count, 1);
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 2);
}
