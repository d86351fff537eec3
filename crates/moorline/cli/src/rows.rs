//! Invoice rows file ingestion

use crate::error::CliResult;
use moorline_types::InvoiceRecord;
use std::path::Path;

/// Read a comma-separated rows file into invoice records.
///
/// Plain splitting, no quoting rules; blank lines are skipped and
/// `has_header` drops the first non-blank line.
pub fn read_rows(path: &Path, has_header: bool) -> CliResult<Vec<InvoiceRecord>> {
    let contents = std::fs::read_to_string(path)?;

    let mut records = Vec::new();
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    if has_header {
        lines.next();
    }

    for line in lines {
        let row: Vec<&str> = line.split(',').map(str::trim).collect();
        records.push(InvoiceRecord::from_row(&row)?);
    }

    Ok(records)
}
