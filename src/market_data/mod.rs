// Market data module entrypoint
pub mod adapters;    // transport trait, CoinGecko requests, reqwest transport
pub mod executor;    // bounded-retry GET with rate-limit backoff
pub mod normaliser;  // converts JSON records -> schema-shaped rows
pub mod fetcher;     // executor + courtesy delay + normaliser
