// Convert loosely-typed JSON records into schema-shaped table rows.
// Never fails: absent or malformed fields fall back to the column default.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::table::schema::{ColumnKind, ColumnSpec, Fallback, Schema};
use crate::table::types::{Cell, MarketRecord, MarketTable};

pub struct RecordNormaliser {
    schema: Arc<Schema>,
}

impl RecordNormaliser {
    pub fn new(schema: Schema) -> Self {
        Self { schema: Arc::new(schema) }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn normalise(&self, raw: &[Value]) -> MarketTable {
        let records: Vec<MarketRecord> = raw
            .iter()
            .enumerate()
            .filter_map(|(pos, value)| self.normalise_record(pos, value))
            .collect();

        let dropped = raw.len() - records.len();
        if dropped > 0 {
            info!(dropped, kept = records.len(), "dropped records missing required fields");
        }
        MarketTable::new(Arc::clone(&self.schema), records)
    }

    /// Normalise a table that has already been through a normaliser, e.g. after
    /// a transform. The result equals the input when the schemas match.
    pub fn renormalise(&self, table: &MarketTable) -> MarketTable {
        self.normalise(&table.to_json_records())
    }

    /// `None` when the value is not an object or a required column is missing.
    pub fn normalise_record(&self, position: usize, raw: &Value) -> Option<MarketRecord> {
        let Some(obj) = raw.as_object() else {
            debug!(position, "skipping non-object record");
            return None;
        };

        let id = record_id(obj, self.schema.id_key(), position);
        let mut cells = Vec::with_capacity(self.schema.len());
        for spec in self.schema.columns() {
            match lookup(obj, spec).and_then(|v| coerce(spec.kind, v)) {
                Some(cell) => cells.push(cell),
                // the identifier column mirrors the record id, synthesised or not
                None if self.is_id_column(spec) => cells.push(Cell::Text(id.clone())),
                None => match &spec.fallback {
                    Fallback::Default(cell) => cells.push(cell.clone()),
                    Fallback::Exclude => {
                        debug!(
                            position,
                            column = %spec.name,
                            "dropping record without required field"
                        );
                        return None;
                    }
                },
            }
        }

        Some(MarketRecord { id, cells, label: None })
    }

    fn is_id_column(&self, spec: &ColumnSpec) -> bool {
        spec.kind == ColumnKind::Text && spec.source == self.schema.id_key()
    }
}

// Source key first, then the column name itself (normalised rows use names).
fn lookup<'a>(obj: &'a Map<String, Value>, spec: &ColumnSpec) -> Option<&'a Value> {
    obj.get(&spec.source)
        .filter(|v| !v.is_null())
        .or_else(|| obj.get(&spec.name).filter(|v| !v.is_null()))
}

fn coerce(kind: ColumnKind, value: &Value) -> Option<Cell> {
    match kind {
        ColumnKind::Number => {
            let v = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            v.is_finite().then_some(Cell::Number(v))
        }
        ColumnKind::Integer => match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .map(Cell::Integer),
        ColumnKind::Text => match value {
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Number(n) => Some(Cell::Text(n.to_string())),
            Value::Bool(b) => Some(Cell::Text(b.to_string())),
            _ => None,
        },
    }
}

fn record_id(obj: &Map<String, Value>, key: &str, position: usize) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("row-{}", position),
    }
}
