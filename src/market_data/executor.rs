//! Bounded-retry GET executor.
//!
//! HTTP 200 returns the decoded body, HTTP 429 backs off and retries until
//! `max_attempts` is spent, and any other status fails at once.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::error::FetchError;
use crate::market_data::adapters::{FetchRequest, Transport};

/// Wait before retrying after the `attempt`-th (1-based) rate-limited response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// `step * attempt`
    Linear { step_ms: u64 },
    /// `initial * 2^(attempt-1)`, capped.
    Exponential { initial_ms: u64, cap_ms: u64 },
}

impl BackoffPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let ms = match *self {
            BackoffPolicy::Linear { step_ms } => step_ms.saturating_mul(u64::from(attempt)),
            BackoffPolicy::Exponential { initial_ms, cap_ms } => {
                let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
                initial_ms.saturating_mul(factor).min(cap_ms)
            }
        };
        Duration::from_millis(ms)
    }

    /// Rejects policies whose first retries would not wait progressively longer.
    pub fn check(&self) -> Result<(), &'static str> {
        match *self {
            BackoffPolicy::Linear { step_ms: 0 } => {
                Err("executor.backoff.step_ms must be positive")
            }
            BackoffPolicy::Exponential { initial_ms: 0, .. } => {
                Err("executor.backoff.initial_ms must be positive")
            }
            BackoffPolicy::Exponential { initial_ms, cap_ms } if cap_ms <= initial_ms => {
                Err("executor.backoff.cap_ms must exceed initial_ms")
            }
            _ => Ok(()),
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Linear { step_ms: 10_000 }
    }
}

/// Passed explicitly to the executor and transport; there is no global session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
    pub timeout_ms: u64,
    /// Pause after every successful call, applied by `SnapshotFetcher`.
    pub courtesy_delay_ms: u64,
    pub user_agent: String,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn courtesy_delay(&self) -> Duration {
        Duration::from_millis(self.courtesy_delay_ms)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
            timeout_ms: 10_000,
            courtesy_delay_ms: 1_250,
            user_agent: concat!("snapx/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

pub struct RequestExecutor<T> {
    transport: T,
    config: ExecutorConfig,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[instrument(skip(self, request), fields(endpoint = %request.endpoint))]
    pub async fn execute(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "sending request");
            let response = self.transport.get(&request.endpoint, &request.query).await?;

            match response.status {
                200 => {
                    return serde_json::from_str(&response.body)
                        .map_err(|e| FetchError::Decode(e.to_string()));
                }
                429 => {
                    if attempt == max_attempts {
                        break;
                    }
                    let wait = self.config.backoff.delay_for(attempt);
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "rate limited (429), backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                status => {
                    error!(status, "request failed, not retrying");
                    return Err(FetchError::Status { status, body: response.body });
                }
            }
        }

        error!(attempts = max_attempts, "still rate limited, giving up");
        Err(FetchError::RateLimitExhausted { attempts: max_attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::adapters::RawResponse;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct ScriptedTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(script: &[(u16, &str)]) -> Self {
            let responses = script
                .iter()
                .map(|(status, body)| RawResponse { status: *status, body: body.to_string() })
                .collect();
            Self { responses: Mutex::new(responses), calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn get(
            &self,
            _endpoint: &str,
            _query: &[(String, String)],
        ) -> Result<RawResponse, FetchError> {
            self.calls.lock().unwrap().push(Instant::now());
            let next = self.responses.lock().unwrap().pop_front();
            Ok(next.expect("transport called more often than scripted"))
        }
    }

    fn executor(script: &[(u16, &str)], max_attempts: u32) -> RequestExecutor<ScriptedTransport> {
        let config = ExecutorConfig {
            max_attempts,
            backoff: BackoffPolicy::Linear { step_ms: 10_000 },
            ..ExecutorConfig::default()
        };
        RequestExecutor::new(ScriptedTransport::new(script), config)
    }

    fn request() -> FetchRequest {
        FetchRequest::new("https://example.test/coins/markets").param("per_page", 5)
    }

    #[tokio::test(start_paused = true)]
    async fn retries_through_rate_limits_with_growing_backoff() {
        let exec = executor(&[(429, ""), (429, ""), (429, ""), (200, r#"[{"id":"btc"}]"#)], 5);

        let body = exec.execute(&request()).await.unwrap();
        assert_eq!(body, serde_json::json!([{"id": "btc"}]));

        let calls = exec.transport().calls();
        assert_eq!(calls.len(), 4);
        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.windows(2).all(|g| g[1] > g[0]), "backoff not increasing: {:?}", gaps);
        assert_eq!(gaps[0], Duration::from_secs(10));
        assert_eq!(gaps[2], Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_stops_requesting() {
        let exec = executor(&[(429, ""), (429, ""), (429, "")], 3);

        let err = exec.execute(&request()).await.unwrap_err();
        assert!(matches!(err, FetchError::RateLimitExhausted { attempts: 3 }));
        assert_eq!(err.reason(), "rate-limited-exhausted");
        assert_eq!(exec.transport().calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn other_statuses_fail_without_retry() {
        let exec = executor(&[(404, "not found"), (200, "[]")], 3);

        let err = exec.execute(&request()).await.unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(exec.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_are_not_retried() {
        let exec = executor(&[(503, "busy")], 3);
        let err = exec.execute(&request()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(exec.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let exec = executor(&[(200, "<html>")], 3);
        let err = exec.execute(&request()).await.unwrap_err();
        assert_eq!(err.reason(), "decode");
    }

    #[test]
    fn backoff_schedules() {
        let linear = BackoffPolicy::Linear { step_ms: 500 };
        assert_eq!(linear.delay_for(1), Duration::from_millis(500));
        assert_eq!(linear.delay_for(3), Duration::from_millis(1_500));

        let expo = BackoffPolicy::Exponential { initial_ms: 1_000, cap_ms: 16_000 };
        assert_eq!(expo.delay_for(1), Duration::from_secs(1));
        assert_eq!(expo.delay_for(4), Duration::from_secs(8));
        assert_eq!(expo.delay_for(10), Duration::from_secs(16));
        assert_eq!(expo.delay_for(200), Duration::from_secs(16));
    }

    #[test]
    fn flat_backoff_policies_fail_the_check() {
        assert!(BackoffPolicy::default().check().is_ok());
        assert!(BackoffPolicy::Linear { step_ms: 0 }.check().is_err());
        assert!(BackoffPolicy::Exponential { initial_ms: 0, cap_ms: 10 }.check().is_err());
        assert!(BackoffPolicy::Exponential { initial_ms: 10, cap_ms: 5 }.check().is_err());

        let ok = BackoffPolicy::Exponential { initial_ms: 10, cap_ms: 40 };
        assert!(ok.check().is_ok());
        assert!(ok.delay_for(2) > ok.delay_for(1));
    }
}
