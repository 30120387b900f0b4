use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::db::ENTRY_DATE_FORMAT;
use crate::models::Entry;

pub const HEADER: [&str; 10] = [
    "id",
    "date",
    "kind",
    "amount",
    "from_account",
    "to_account",
    "category",
    "tags",
    "description",
    "location",
];

/// Writes entries as CSV, resolving account ids to names.
pub struct CsvExporter {
    account_names: HashMap<i64, String>,
}

impl CsvExporter {
    pub fn new(account_names: HashMap<i64, String>) -> Self {
        Self { account_names }
    }

    /// Write to `path`, replacing any existing file. Returns the row count.
    pub fn export_to_path(&self, path: &Path, entries: &[Entry]) -> Result<usize> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write(file, entries)
    }

    pub fn write<W: io::Write>(&self, writer: W, entries: &[Entry]) -> Result<usize> {
        write_entries(writer, entries, &self.account_names)
    }
}

pub fn write_entries<W: io::Write>(
    writer: W,
    entries: &[Entry],
    account_names: &HashMap<i64, String>,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).context("Failed to write CSV header")?;

    let name_of = |id: i64| {
        account_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };

    for entry in entries {
        let tags = entry
            .tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(";");
        wtr.write_record([
            entry.id.to_string(),
            entry.date.format(ENTRY_DATE_FORMAT).to_string(),
            entry.kind.as_str().to_string(),
            entry.amount.to_string(),
            entry.from_account_id.map(&name_of).unwrap_or_default(),
            name_of(entry.to_account_id),
            entry.category.name.clone(),
            tags,
            entry.description.clone(),
            entry.location.clone(),
        ])
        .with_context(|| format!("Failed to write entry {}", entry.id))?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(entries.len())
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
