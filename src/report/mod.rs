// Output side of the pipeline
pub mod chart;    // dark-styled bar chart rendered to text
pub mod console;  // bounded human-readable summaries
pub mod writer;   // CSV persistence

pub use writer::{render_csv, write_csv, write_tables, LABEL_COLUMN};
