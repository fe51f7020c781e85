//! CSV persistence for finished tables.
//!
//! The whole file is rendered in memory and written with one call, so a
//! serialization failure never leaves a half-written CSV behind.

use std::path::Path;

use tracing::info;

use crate::error::{SnapResult, WriteError};
use crate::table::transform;
use crate::table::MarketTable;

/// Trailing column holding the mover label, present for every labelled table,
/// empty ones included.
pub const LABEL_COLUMN: &str = "type";

pub fn render_csv(table: &MarketTable) -> Result<Vec<u8>, WriteError> {
    let labelled = table.is_labelled();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = table.schema().names().collect();
    if labelled {
        header.push(LABEL_COLUMN);
    }
    writer.write_record(&header)?;

    for record in table.records() {
        let mut row: Vec<String> = record.cells.iter().map(|c| c.to_string()).collect();
        if labelled {
            row.push(record.label.as_ref().map(|l| l.to_string()).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| WriteError::Csv(csv::Error::from(e.into_error())))
}

/// Overwrites `path` with the table as CSV.
pub fn write_csv(path: &Path, table: &MarketTable) -> Result<(), WriteError> {
    let bytes = render_csv(table)?;
    std::fs::write(path, &bytes).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = table.len(), bytes = bytes.len(), "csv written");
    Ok(())
}

/// Concatenates labelled subsets (in the given order) and writes them as one CSV.
pub fn write_tables(path: &Path, tables: &[MarketTable]) -> SnapResult<MarketTable> {
    let combined = transform::concat(tables)?;
    write_csv(path, &combined)?;
    Ok(combined)
}
