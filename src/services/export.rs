//! CSV export of the return history
//!
//! Commas and line breaks inside free text are replaced rather than quoted;
//! only the two notes columns are wrapped in double quotes.

use chrono::NaiveDate;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{error::AppResult, models::report::ReturnRecord};

pub const CSV_HEADER: &str = "Date,Client,Item,Quantity,Condition,Type,Notes,Damage Notes";

/// A rendered CSV document ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub rows: usize,
}

impl CsvExport {
    /// Save the export into `dir` under its generated file name
    pub fn write_to(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, self.content.as_bytes())?;
        tracing::info!("Exported {} rows to {}", self.rows, path.display());
        Ok(path)
    }
}

/// `return-history-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("return-history-{}.csv", date.format("%Y-%m-%d"))
}

/// Make free text safe for an unquoted CSV cell
fn flatten(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace(',', ";")
}

/// Quoted cell; quotes inside are doubled so the cell stays well formed
fn quoted(text: &str) -> String {
    format!("\"{}\"", flatten(text).replace('"', "\"\""))
}

/// Build the CSV document for `records`, dates rendered with `date_format`
pub fn build_csv<'a>(records: impl IntoIterator<Item = &'a ReturnRecord>, date_format: &str) -> (String, usize) {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    let mut rows = 0;
    for record in records {
        let line = [
            record.created_at.format(date_format).to_string(),
            flatten(record.renter_name().unwrap_or("Unknown")),
            flatten(record.item_name().unwrap_or("Unknown")),
            record.quantity.unwrap_or(0).to_string(),
            record.condition_label().to_string(),
            record.report_type.to_string(),
            quoted(record.notes.as_deref().unwrap_or("")),
            quoted(record.damage_notes.as_deref().unwrap_or("")),
        ]
        .join(",");

        csv.push_str(&line);
        csv.push('\n');
        rows += 1;
    }

    (csv, rows)
}

/// Full export of `records` named after `today`
pub fn export<'a>(records: impl IntoIterator<Item = &'a ReturnRecord>, date_format: &str, today: NaiveDate) -> CsvExport {
    let (content, rows) = build_csv(records, date_format);
    CsvExport {
        filename: export_filename(today),
        content,
        rows,
    }
}
