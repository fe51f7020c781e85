// Source: https://api.coingecko.com/api/v3 (Exchanges -> /exchanges/decentralized, Coins -> /coins/markets)

/// Payload field names read by the jobs' schemas.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const SYMBOL: &str = "symbol";
    pub const CURRENT_PRICE: &str = "current_price";
    pub const TRADE_VOLUME_24H_BTC: &str = "trade_volume_24h_btc";
    pub const TRUST_SCORE: &str = "trust_score";
    pub const YEAR_ESTABLISHED: &str = "year_established";
    pub const COUNTRY: &str = "country";

    /// e.g. `price_change_percentage_24h_in_currency`
    pub fn price_change_in_currency(timeframe: &str) -> String {
        format!("price_change_percentage_{}_in_currency", timeframe)
    }
}

// Query for GET /exchanges/decentralized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexQuery {
    pub per_page: u32,
}

// Query for GET /coins/markets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketsQuery {
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
    pub price_change_percentage: Vec<String>, // e.g. ["24h", "7d"]
}

impl MarketsQuery {
    pub fn new(vs_currency: &str) -> Self {
        Self {
            vs_currency: vs_currency.to_string(),
            order: "market_cap_desc".into(),
            per_page: 50,
            page: 1,
            sparkline: false,
            price_change_percentage: vec!["24h".into(), "7d".into()],
        }
    }
}
