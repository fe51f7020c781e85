use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde_json::{Map, Value};

use crate::error::TableError;
use crate::table::schema::Schema;

/// One typed value of a normalised record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Integer(v) => Some(*v as f64),
            Cell::Text(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(v) => Value::from(*v),
            Cell::Integer(v) => Value::from(*v),
        }
    }

    /// Total order used for ranking: numbers (as floats) first, then text.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => OrderedFloat(a).cmp(&OrderedFloat(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Integer(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Movers vocabulary: a descending ranking lists gainers, ascending lists losers.
    pub fn mover_kind(&self) -> &'static str {
        match self {
            SortDirection::Descending => "gainer",
            SortDirection::Ascending => "loser",
        }
    }
}

/// Tag attached to a record copy that belongs to a ranked subset, e.g. `gainer_24h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoverLabel {
    pub timeframe: String,
    pub direction: SortDirection,
}

impl MoverLabel {
    pub fn new(timeframe: &str, direction: SortDirection) -> Self {
        Self { timeframe: timeframe.to_string(), direction }
    }

    /// Console heading such as `Top 3 Gainers (24h)`.
    pub fn title(&self, rows: usize) -> String {
        let kind = match self.direction {
            SortDirection::Descending => "Gainers",
            SortDirection::Ascending => "Losers",
        };
        format!("Top {} {} ({})", rows, kind, self.timeframe)
    }
}

impl fmt::Display for MoverLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.direction.mover_kind(), self.timeframe)
    }
}

// One row; `cells` line up with the owning table's schema columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecord {
    pub id: String,
    pub cells: Vec<Cell>,
    pub label: Option<MoverLabel>,
}

/// Labelling of a table as a whole. Decides whether the CSV carries the
/// label column, independent of how many records survived ranking.
#[derive(Debug, Clone, PartialEq)]
pub enum TableLabel {
    Unlabelled,
    /// One ranked subset; every record carries this label.
    Subset(MoverLabel),
    /// Concatenation of subsets; records carry their own labels.
    Combined,
}

/// Ordered rows produced by one fetch. Transforms never mutate a table; they
/// build a new one sharing the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketTable {
    schema: Arc<Schema>,
    records: Vec<MarketRecord>,
    label: TableLabel,
}

impl MarketTable {
    pub fn new(schema: Arc<Schema>, records: Vec<MarketRecord>) -> Self {
        Self { schema, records, label: TableLabel::Unlabelled }
    }

    /// Tags the table and each of its records with `label`.
    pub fn with_label(mut self, label: MoverLabel) -> Self {
        for record in &mut self.records {
            record.label = Some(label.clone());
        }
        self.label = TableLabel::Subset(label);
        self
    }

    pub(crate) fn with_table_label(mut self, label: TableLabel) -> Self {
        self.label = label;
        self
    }

    pub fn table_label(&self) -> &TableLabel {
        &self.label
    }

    /// The subset label, if this table is a single ranked subset.
    pub fn label(&self) -> Option<&MoverLabel> {
        match &self.label {
            TableLabel::Subset(label) => Some(label),
            _ => None,
        }
    }

    pub fn is_labelled(&self) -> bool {
        self.label != TableLabel::Unlabelled
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn records(&self) -> &[MarketRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Result<impl Iterator<Item = &'a Cell> + 'a, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.records.iter().map(move |r| &r.cells[idx]))
    }

    /// Re-serialise rows as JSON objects keyed by column name. The record id
    /// goes in last under the id key, so it wins over a column of that name.
    pub fn to_json_records(&self) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| {
                let mut obj = Map::new();
                for (spec, cell) in self.schema.columns().iter().zip(&record.cells) {
                    obj.insert(spec.name.clone(), cell.to_json());
                }
                obj.insert(self.schema.id_key().to_string(), Value::String(record.id.clone()));
                Value::Object(obj)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_order_before_text() {
        assert_eq!(Cell::Number(1.0).compare(&Cell::Text("a".into())), Ordering::Less);
        assert_eq!(Cell::Integer(3).compare(&Cell::Number(2.5)), Ordering::Greater);
        assert_eq!(Cell::Text("b".into()).compare(&Cell::Text("a".into())), Ordering::Greater);
    }

    #[test]
    fn label_rendering() {
        let gainer = MoverLabel::new("24h", SortDirection::Descending);
        let loser = MoverLabel::new("7d", SortDirection::Ascending);
        assert_eq!(gainer.to_string(), "gainer_24h");
        assert_eq!(loser.to_string(), "loser_7d");
        assert_eq!(loser.title(3), "Top 3 Losers (7d)");
    }

    #[test]
    fn cell_display_is_plain() {
        assert_eq!(Cell::Number(30.5).to_string(), "30.5");
        assert_eq!(Cell::Number(50.0).to_string(), "50");
        assert_eq!(Cell::Integer(2019).to_string(), "2019");
    }

    #[test]
    fn with_label_tags_table_and_records() {
        let schema = Arc::new(Schema::new(vec![crate::table::ColumnSpec::text("name")]));
        let label = MoverLabel::new("24h", SortDirection::Ascending);

        let empty = MarketTable::new(Arc::clone(&schema), Vec::new()).with_label(label.clone());
        assert!(empty.is_labelled());
        assert_eq!(empty.label(), Some(&label));

        let record = MarketRecord { id: "a".into(), cells: vec![Cell::from("A")], label: None };
        let one = MarketTable::new(schema, vec![record]).with_label(label.clone());
        assert_eq!(one.records()[0].label.as_ref(), Some(&label));
    }
}
