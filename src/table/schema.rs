// Column schema consulted by the normaliser: ordered (name, source field, kind, fallback).

use crate::table::types::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Integer,
}

impl ColumnKind {
    /// Default used when a column declares no explicit fallback.
    pub fn zero(&self) -> Cell {
        match self {
            ColumnKind::Text => Cell::Text(String::new()),
            ColumnKind::Number => Cell::Number(0.0),
            ColumnKind::Integer => Cell::Integer(0),
        }
    }
}

/// What to do when a source field is absent or malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    Default(Cell),
    /// Drop the whole record (used for ranking keys).
    Exclude,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub source: String,
    pub kind: ColumnKind,
    pub fallback: Fallback,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            source: name.to_string(),
            kind,
            fallback: Fallback::Default(kind.zero()),
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ColumnKind::Number)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    /// Read the value from a differently named payload field.
    pub fn from_field(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn or(mut self, default: impl Into<Cell>) -> Self {
        self.fallback = Fallback::Default(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.fallback = Fallback::Exclude;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    id_key: String,
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { id_key: "id".to_string(), columns }
    }

    pub fn with_id_key(mut self, key: &str) -> Self {
        self.id_key = key.to_string();
        self
    }

    pub fn id_key(&self) -> &str {
        &self.id_key
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Copy of this schema with the column at `idx` swapped for `spec`.
    pub fn with_column(&self, idx: usize, spec: ColumnSpec) -> Schema {
        let mut columns = self.columns.clone();
        columns[idx] = spec;
        Schema { id_key: self.id_key.clone(), columns }
    }
}
