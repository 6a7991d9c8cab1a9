use std::fs::File;
use std::io;
use std::path::Path;
use serde::Serialize;

use crate::errors::WriteError;

pub const REPORT_HEADERS: [&str; 6] = [
    "biennium",
    "year",
    "bill_number",
    "title",
    "bill_text_url",
    "bill_summary_url",
];

/// One line of the CSV report. Field order matches `REPORT_HEADERS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub biennium: String,
    pub year: u32,
    /// Prefixed, e.g. `HB 1181`.
    pub bill_number: String,
    pub title: String,
    pub bill_text_url: String,
    pub bill_summary_url: String,
    /// Raw bill number, used for ordering. Not written to the report.
    #[serde(skip)]
    pub number: u32,
}

/// Writes the header and then `rows` in order.
pub fn write_rows<W: io::Write>(rows: &[ReportRow], writer: W) -> Result<W, csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(REPORT_HEADERS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Creates (or truncates) `path` and writes the report to it.
pub fn write_report(rows: &[ReportRow], path: &Path) -> Result<(), WriteError> {
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let file = write_rows(rows, file).map_err(|source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    file.sync_all().map_err(|source| WriteError::Flush {
        path: path.to_path_buf(),
        source,
    })
}
