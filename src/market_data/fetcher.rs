// Fetch-and-normalise: executor call, courtesy pause, JSON array -> table.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::FetchError;
use crate::market_data::adapters::{FetchRequest, Transport};
use crate::market_data::executor::RequestExecutor;
use crate::market_data::normaliser::RecordNormaliser;
use crate::table::MarketTable;

pub struct SnapshotFetcher<T> {
    executor: RequestExecutor<T>,
}

impl<T: Transport> SnapshotFetcher<T> {
    pub fn new(executor: RequestExecutor<T>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    /// Raw records of one call. Sleeps the courtesy delay after a success so
    /// back-to-back fetches stay under the API's rate limit.
    pub async fn fetch_records(&self, request: &FetchRequest) -> Result<Vec<Value>, FetchError> {
        let body = self.executor.execute(request).await?;

        let courtesy = self.executor.config().courtesy_delay();
        if !courtesy.is_zero() {
            debug!(delay_ms = courtesy.as_millis() as u64, "courtesy pause");
            tokio::time::sleep(courtesy).await;
        }

        match body {
            Value::Array(items) => Ok(items),
            other => Err(FetchError::UnexpectedShape(json_kind(&other).to_string())),
        }
    }

    #[instrument(skip_all, fields(endpoint = %request.endpoint))]
    pub async fn fetch_table(
        &self,
        request: &FetchRequest,
        normaliser: &RecordNormaliser,
    ) -> Result<MarketTable, FetchError> {
        let raw = self.fetch_records(request).await?;
        let table = normaliser.normalise(&raw);
        info!(fetched = raw.len(), kept = table.len(), "snapshot normalised");
        Ok(table)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::adapters::RawResponse;
    use crate::market_data::executor::ExecutorConfig;
    use crate::table::{ColumnSpec, Schema};
    use std::time::Duration;
    use tokio::time::Instant;

    struct Fixed(u16, &'static str);

    #[async_trait::async_trait]
    impl Transport for Fixed {
        async fn get(
            &self,
            _endpoint: &str,
            _query: &[(String, String)],
        ) -> Result<RawResponse, FetchError> {
            Ok(RawResponse { status: self.0, body: self.1.to_string() })
        }
    }

    fn fetcher(status: u16, body: &'static str) -> SnapshotFetcher<Fixed> {
        let config = ExecutorConfig { courtesy_delay_ms: 1_250, ..ExecutorConfig::default() };
        SnapshotFetcher::new(RequestExecutor::new(Fixed(status, body), config))
    }

    #[tokio::test(start_paused = true)]
    async fn waits_courtesy_delay_after_success() {
        let start = Instant::now();
        let records = fetcher(200, r#"[{"id":"a"},{"id":"b"}]"#)
            .fetch_records(&FetchRequest::new("https://example.test"))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(start.elapsed(), Duration::from_millis(1_250));
    }

    #[tokio::test(start_paused = true)]
    async fn object_body_is_rejected() {
        let err = fetcher(200, r#"{"error":"oops"}"#)
            .fetch_records(&FetchRequest::new("https://example.test"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON array of records, got an object");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_table_normalises() {
        let norm = RecordNormaliser::new(Schema::new(vec![ColumnSpec::text("name").or("Unknown")]));
        let table = fetcher(200, r#"[{"id":"a","name":"Alpha"},{"id":"b"}]"#)
            .fetch_table(&FetchRequest::new("https://example.test"), &norm)
            .await
            .unwrap();
        let names: Vec<String> = table.column("name").unwrap().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["Alpha", "Unknown"]);
    }
}
