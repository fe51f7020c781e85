// reqwest-backed transport with a bounded per-request timeout.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::trace;

use super::{RawResponse, Transport};
use crate::error::FetchError;
use crate::market_data::executor::ExecutorConfig;

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ExecutorConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network {
                endpoint: String::from("<client setup>"),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

fn network_error(endpoint: &str, err: reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else {
        err.to_string()
    };
    FetchError::Network { endpoint: endpoint.to_string(), message }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(endpoint)
            .query(query)
            .send()
            .await
            .map_err(|e| network_error(endpoint, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| network_error(endpoint, e))?;
        trace!(status, bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_config() {
        assert!(ReqwestTransport::new(&ExecutorConfig::default()).is_ok());
    }
}
