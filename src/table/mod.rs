// Tabular model shared by both jobs
pub mod schema;     // ordered column specs with defaults
pub mod types;      // cells, records, tables, mover labels
pub mod transform;  // ranking, labelling, derived columns

pub use schema::{ColumnKind, ColumnSpec, Fallback, Schema};
pub use types::{Cell, MarketRecord, MarketTable, MoverLabel, SortDirection, TableLabel};
