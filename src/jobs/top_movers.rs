// Top gainers and losers per timeframe -> TopGainersAndLosers.csv + console summary.

use std::path::PathBuf;

use tracing::info;

use crate::error::SnapResult;
use crate::market_data::adapters::coingecko::CoinGecko;
use crate::market_data::adapters::coingecko_types::{fields, MarketsQuery};
use crate::market_data::adapters::Transport;
use crate::market_data::fetcher::SnapshotFetcher;
use crate::market_data::normaliser::RecordNormaliser;
use crate::report::{self, console};
use crate::settings::AppConfig;
use crate::table::{transform, ColumnSpec, MarketTable, Schema};

pub const OUTPUT_FILE: &str = "TopGainersAndLosers.csv";

/// e.g. `24h_change_%`
pub fn change_column(timeframe: &str) -> String {
    format!("{}_change_%", timeframe)
}

/// Change columns are required: coins without them are dropped before ranking.
pub fn schema(timeframes: &[String]) -> Schema {
    let mut columns = vec![
        ColumnSpec::text(fields::ID),
        ColumnSpec::text(fields::SYMBOL),
        ColumnSpec::text(fields::NAME).or("Unknown"),
        ColumnSpec::number(fields::CURRENT_PRICE),
    ];
    for tf in timeframes {
        columns.push(
            ColumnSpec::number(&change_column(tf))
                .from_field(&fields::price_change_in_currency(tf))
                .required(),
        );
    }
    Schema::new(columns).with_id_key(fields::ID)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoversSettings {
    pub vs_currency: String,
    pub per_page: u32,
    pub page: u32,
    pub top_n: usize,
    pub summary_rows: usize,
    pub timeframes: Vec<String>,
    pub output_path: PathBuf,
}

impl MoversSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let m = &cfg.movers;
        Self {
            vs_currency: m.vs_currency.clone(),
            per_page: m.per_page,
            page: m.page,
            top_n: m.top_n,
            summary_rows: m.summary_rows,
            timeframes: m.timeframes.clone(),
            output_path: cfg.output.dir.join(OUTPUT_FILE),
        }
    }
}

/// Returns the labelled subsets in output order: for each timeframe, gainers then losers.
pub async fn run<T: Transport>(
    fetcher: &SnapshotFetcher<T>,
    api: &CoinGecko,
    settings: &MoversSettings,
) -> SnapResult<Vec<MarketTable>> {
    let timeframes = settings.timeframes.join(" & ");
    println!("📡 Fetching CoinGecko market data ({} performance)...", timeframes);

    let query = MarketsQuery {
        per_page: settings.per_page,
        page: settings.page,
        price_change_percentage: settings.timeframes.clone(),
        ..MarketsQuery::new(&settings.vs_currency)
    };
    let normaliser = RecordNormaliser::new(schema(&settings.timeframes));
    let table = fetcher.fetch_table(&api.coin_markets(&query), &normaliser).await?;
    println!("📦 Fetched {} coins. Processing movers...", table.len());

    let mut subsets = Vec::with_capacity(settings.timeframes.len() * 2);
    for tf in &settings.timeframes {
        let (gainers, losers) =
            transform::movers(&table, tf, &change_column(tf), settings.top_n)?;
        subsets.push(gainers);
        subsets.push(losers);
    }

    let combined = report::write_tables(&settings.output_path, &subsets)?;
    println!(
        "✅ Combined movers ({}) saved to {}",
        timeframes,
        settings.output_path.display()
    );
    info!(rows = combined.len(), subsets = subsets.len(), "movers snapshot complete");

    if settings.summary_rows > 0 {
        println!("\n--- Performance summary ---");
        for (tf, pair) in settings.timeframes.iter().zip(subsets.chunks(2)) {
            let column = change_column(tf);
            let columns = [fields::NAME, column.as_str()];
            for subset in pair {
                let summary = console::format_summary(subset, &columns, settings.summary_rows)?;
                println!("{}", summary);
            }
            println!("\n---");
        }
    }

    Ok(subsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_columns_follow_timeframes() {
        let s = schema(&["24h".to_string(), "7d".to_string()]);
        assert_eq!(
            s.names().collect::<Vec<_>>(),
            vec!["id", "symbol", "name", "current_price", "24h_change_%", "7d_change_%"]
        );
        assert_eq!(s.columns()[4].source, "price_change_percentage_24h_in_currency");
    }

    #[test]
    fn settings_from_defaults() {
        let s = MoversSettings::from_config(&AppConfig::default());
        assert_eq!(s.top_n, 10);
        assert_eq!(s.output_path, PathBuf::from(".").join(OUTPUT_FILE));
    }
}
