//! Pure table -> table transforms. Every function borrows its input and
//! returns a fresh table; nothing here touches the network or the filesystem.

use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::error::TableError;
use crate::table::schema::{ColumnKind, ColumnSpec, Fallback};
use crate::table::types::{Cell, MarketRecord, MarketTable, MoverLabel, SortDirection, TableLabel};

/// First `n` records after a stable sort on `column`. Ties keep input order.
pub fn top_n(
    table: &MarketTable,
    column: &str,
    direction: SortDirection,
    n: usize,
) -> Result<MarketTable, TableError> {
    let idx = table.column_index(column)?;
    let records: Vec<MarketRecord> = table
        .records()
        .iter()
        .sorted_by(|a, b| {
            let ord = a.cells[idx].compare(&b.cells[idx]);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        })
        .take(n)
        .cloned()
        .collect();

    debug!(column, ?direction, n, kept = records.len(), "ranked table");
    let label = table.table_label().clone();
    Ok(MarketTable::new(table.shared_schema(), records).with_table_label(label))
}

/// `top_n` with the result and every copied record tagged by `label`. The
/// table stays labelled even when no record survives.
pub fn rank(
    table: &MarketTable,
    column: &str,
    direction: SortDirection,
    n: usize,
    label: &MoverLabel,
) -> Result<MarketTable, TableError> {
    Ok(top_n(table, column, direction, n)?.with_label(label.clone()))
}

/// Top gainers and losers on `column` for one timeframe.
pub fn movers(
    table: &MarketTable,
    timeframe: &str,
    column: &str,
    n: usize,
) -> Result<(MarketTable, MarketTable), TableError> {
    let gainers = rank(
        table,
        column,
        SortDirection::Descending,
        n,
        &MoverLabel::new(timeframe, SortDirection::Descending),
    )?;
    let losers = rank(
        table,
        column,
        SortDirection::Ascending,
        n,
        &MoverLabel::new(timeframe, SortDirection::Ascending),
    )?;
    Ok((gainers, losers))
}

/// Rewrite a numeric column through `f` and rename it. Defaults are mapped too
/// so later normalisation against the new schema stays consistent.
pub fn derive_numeric<F>(
    table: &MarketTable,
    column: &str,
    new_name: &str,
    f: F,
) -> Result<MarketTable, TableError>
where
    F: Fn(f64) -> f64,
{
    let idx = table.column_index(column)?;
    let old = &table.schema().columns()[idx];
    if old.kind == ColumnKind::Text {
        return Err(TableError::NotNumeric(column.to_string()));
    }

    let fallback = match &old.fallback {
        Fallback::Exclude => Fallback::Exclude,
        Fallback::Default(cell) => match cell.as_f64() {
            Some(v) => Fallback::Default(Cell::Number(f(v))),
            None => Fallback::Default(cell.clone()),
        },
    };
    let spec = ColumnSpec {
        name: new_name.to_string(),
        source: old.source.clone(),
        kind: ColumnKind::Number,
        fallback,
    };
    let schema = Arc::new(table.schema().with_column(idx, spec));

    let records = table
        .records()
        .iter()
        .map(|r| {
            let mut record = r.clone();
            if let Some(v) = record.cells[idx].as_f64() {
                record.cells[idx] = Cell::Number(f(v));
            }
            record
        })
        .collect();
    Ok(MarketTable::new(schema, records).with_table_label(table.table_label().clone()))
}

/// Concatenate tables sharing one schema, preserving per-table order. The result
/// is labelled when any input is.
pub fn concat(tables: &[MarketTable]) -> Result<MarketTable, TableError> {
    let first = tables.first().ok_or(TableError::NothingToConcat)?;
    if let Some(other) = tables.iter().find(|t| t.schema() != first.schema()) {
        return Err(TableError::SchemaMismatch(other.schema().names().join(",")));
    }
    let records = tables
        .iter()
        .flat_map(|t| t.records().iter().cloned())
        .collect();
    let label = if tables.iter().any(MarketTable::is_labelled) {
        TableLabel::Combined
    } else {
        TableLabel::Unlabelled
    };
    Ok(MarketTable::new(first.shared_schema(), records).with_table_label(label))
}
