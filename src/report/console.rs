// Human-readable summaries. Not a stable format.

use itertools::Itertools;

use crate::error::TableError;
use crate::table::{MarketTable, SortDirection};

/// Right-aligned text table of the first `rows` records, limited to `columns`.
pub fn format_rows(
    table: &MarketTable,
    columns: &[&str],
    rows: usize,
) -> Result<String, TableError> {
    let indices: Vec<usize> = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<_, _>>()?;

    let body: Vec<Vec<String>> = table
        .records()
        .iter()
        .take(rows)
        .map(|r| indices.iter().map(|&i| r.cells[i].to_string()).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            body.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = aligned(columns.iter().copied(), &widths);
    for row in &body {
        out.push('\n');
        out.push_str(&aligned(row.iter().map(String::as_str), &widths));
    }
    Ok(out)
}

fn aligned<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, w)| format!("{:>width$}", cell, width = *w))
        .join(" ")
}

/// Heading plus the first `rows` records of a labelled subset.
pub fn format_summary(
    table: &MarketTable,
    columns: &[&str],
    rows: usize,
) -> Result<String, TableError> {
    let shown = rows.min(table.len());
    let heading = match table.label() {
        Some(label) => {
            let icon = match label.direction {
                SortDirection::Descending => "📈",
                SortDirection::Ascending => "📉",
            };
            format!("{} {}:", icon, label.title(shown))
        }
        None => format!("Top {} rows:", shown),
    };
    Ok(format!("{}\n{}", heading, format_rows(table, columns, rows)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::transform;
    use crate::table::{Cell, ColumnSpec, MarketRecord, Schema};
    use std::sync::Arc;

    fn coins() -> MarketTable {
        let schema = Arc::new(Schema::new(vec![
            ColumnSpec::text("name"),
            ColumnSpec::number("7d_change_%"),
        ]));
        let rows = [("Bitcoin", 3.5), ("Ether", -12.25), ("Doge", 40.0), ("Solana", 1.0)];
        let records = rows
            .iter()
            .map(|(n, v)| MarketRecord {
                id: n.to_lowercase(),
                cells: vec![Cell::from(*n), Cell::Number(*v)],
                label: None,
            })
            .collect();
        MarketTable::new(schema, records)
    }

    #[test]
    fn rows_are_aligned_and_bounded() {
        let out = format_rows(&coins(), &["name", "7d_change_%"], 2).unwrap();
        assert_eq!(out, "   name 7d_change_%\nBitcoin         3.5\n  Ether      -12.25");
    }

    #[test]
    fn summary_heading_comes_from_label() {
        let (gainers, losers) = transform::movers(&coins(), "7d", "7d_change_%", 10).unwrap();
        let g = format_summary(&gainers, &["name", "7d_change_%"], 3).unwrap();
        assert!(g.starts_with("📈 Top 3 Gainers (7d):\n"));
        assert!(g.lines().nth(2).unwrap().contains("Doge"));

        let l = format_summary(&losers, &["name"], 3).unwrap();
        assert!(l.starts_with("📉 Top 3 Losers (7d):\n"));
        assert_eq!(l.lines().count(), 5);
    }

    #[test]
    fn empty_subset_keeps_its_heading() {
        let none = MarketTable::new(coins().shared_schema(), Vec::new());
        let (gainers, _) = transform::movers(&none, "24h", "7d_change_%", 10).unwrap();
        let out = format_summary(&gainers, &["name"], 3).unwrap();
        assert_eq!(out, "📈 Top 0 Gainers (24h):\nname");
    }

    #[test]
    fn unknown_column_fails() {
        assert!(format_rows(&coins(), &["price"], 3).is_err());
    }
}
