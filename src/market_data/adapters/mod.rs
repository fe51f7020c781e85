// Shared transport trait + request type for market data adapters

use crate::error::FetchError;

/// One GET call: absolute endpoint URL plus query parameters, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), query: Vec::new() }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Status and raw body of a completed HTTP exchange. Status interpretation
/// (success, rate limit, failure) belongs to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    // Only connection-level problems are errors here; any HTTP status is Ok.
    async fn get(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, FetchError>;
}

pub mod coingecko;
pub mod coingecko_types;
pub mod http;
