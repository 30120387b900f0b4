mod csv_export;

pub use csv_export::{write_entries, CsvExporter, HEADER};
