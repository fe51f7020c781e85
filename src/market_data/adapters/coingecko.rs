// CoinGecko public API: builds the GET requests used by the jobs.

use super::coingecko_types::{DexQuery, MarketsQuery};
use super::FetchRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGecko {
    pub base_url: String, // "https://api.coingecko.com/api/v3"
}

impl CoinGecko {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn decentralized_exchanges(&self, query: &DexQuery) -> FetchRequest {
        FetchRequest::new(self.url("exchanges/decentralized")).param("per_page", query.per_page)
    }

    pub fn coin_markets(&self, query: &MarketsQuery) -> FetchRequest {
        FetchRequest::new(self.url("coins/markets"))
            .param("vs_currency", &query.vs_currency)
            .param("order", &query.order)
            .param("per_page", query.per_page)
            .param("page", query.page)
            .param("sparkline", query.sparkline)
            .param("price_change_percentage", query.price_change_percentage.join(","))
    }
}

impl Default for CoinGecko {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dex_request() {
        let req = CoinGecko::new("https://example.test/api/v3/")
            .decentralized_exchanges(&DexQuery { per_page: 100 });
        assert_eq!(req.endpoint, "https://example.test/api/v3/exchanges/decentralized");
        assert_eq!(req.query, vec![("per_page".to_string(), "100".to_string())]);
    }

    #[test]
    fn markets_request_params_in_order() {
        let req = CoinGecko::default().coin_markets(&MarketsQuery::new("usd"));
        assert_eq!(req.endpoint, "https://api.coingecko.com/api/v3/coins/markets");
        let keys: Vec<&str> = req.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["vs_currency", "order", "per_page", "page", "sparkline", "price_change_percentage"]
        );
        assert_eq!(req.query[4].1, "false");
        assert_eq!(req.query[5].1, "24h,7d");
    }
}
