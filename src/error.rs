use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single fetch. No partial output is produced for the fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network failure calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate-limited-exhausted: still HTTP 429 after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("expected a JSON array of records, got {0}")]
    UnexpectedShape(String),
}

impl FetchError {
    /// Short machine-friendly tag for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network",
            FetchError::Status { .. } => "http-status",
            FetchError::RateLimitExhausted { .. } => "rate-limited-exhausted",
            FetchError::Decode(_) => "decode",
            FetchError::UnexpectedShape(_) => "unexpected-shape",
        }
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("column `{0}` is not numeric")]
    NotNumeric(String),

    #[error("no tables to concatenate")]
    NothingToConcat,

    #[error("table schema differs from the first table: [{0}]")]
    SchemaMismatch(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Crate-level error returned by the jobs.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type SnapResult<T> = Result<T, SnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_reason_tag() {
        let err = FetchError::RateLimitExhausted { attempts: 3 };
        assert_eq!(err.reason(), "rate-limited-exhausted");
        assert!(err.to_string().starts_with("rate-limited-exhausted"));
    }

    #[test]
    fn status_error_carries_body() {
        let err = FetchError::Status { status: 404, body: "not found".into() };
        assert_eq!(err.to_string(), "request failed with HTTP 404: not found");
    }
}
