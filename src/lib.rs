pub mod error;
pub mod jobs;
pub mod market_data;
pub mod report;
pub mod settings;
pub mod table;
pub mod telemetry;

pub use error::{FetchError, SnapError, SnapResult, TableError, WriteError};
