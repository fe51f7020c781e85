// DEX volume snapshot: top decentralized exchanges -> DEX_Volume.csv (+ chart).

use std::path::PathBuf;

use tracing::info;

use crate::error::SnapResult;
use crate::market_data::adapters::coingecko::CoinGecko;
use crate::market_data::adapters::coingecko_types::{fields, DexQuery};
use crate::market_data::adapters::Transport;
use crate::market_data::fetcher::SnapshotFetcher;
use crate::market_data::normaliser::RecordNormaliser;
use crate::report::{self, chart};
use crate::settings::AppConfig;
use crate::table::{transform, ColumnSpec, MarketTable, Schema, SortDirection};

pub const OUTPUT_FILE: &str = "DEX_Volume.csv";

pub const EXCHANGE: &str = "Exchange";
pub const VOLUME_BTC: &str = "24h Volume (BTC)";
pub const VOLUME_USD_BN: &str = "24h Volume (B USD)";

pub fn schema() -> Schema {
    // "Founded Year" / "Country" keep the payload's year_established / country,
    // which the DEX endpoint rarely fills.
    Schema::new(vec![
        ColumnSpec::text(EXCHANGE).from_field(fields::NAME).or("Unknown"),
        ColumnSpec::number(VOLUME_BTC).from_field(fields::TRADE_VOLUME_24H_BTC),
        ColumnSpec::integer("Trust Score").from_field(fields::TRUST_SCORE),
        ColumnSpec::integer("Founded Year").from_field(fields::YEAR_ESTABLISHED),
        ColumnSpec::text("Country").from_field(fields::COUNTRY).or("Unknown"),
    ])
    .with_id_key(fields::ID)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub top: usize,
    pub width: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DexVolumeSettings {
    pub per_page: u32,
    pub btc_price_usd: f64,
    pub chart: Option<ChartSettings>,
    pub output_path: PathBuf,
}

impl DexVolumeSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            per_page: cfg.dex.per_page,
            btc_price_usd: cfg.dex.btc_price_usd,
            chart: cfg.dex.chart.then(|| ChartSettings {
                top: cfg.dex.chart_top,
                width: cfg.dex.chart_width,
            }),
            output_path: cfg.output.dir.join(OUTPUT_FILE),
        }
    }
}

/// Returns the table as written to disk.
pub async fn run<T: Transport>(
    fetcher: &SnapshotFetcher<T>,
    api: &CoinGecko,
    settings: &DexVolumeSettings,
) -> SnapResult<MarketTable> {
    println!("⏳ Fetching top {} decentralized exchanges...", settings.per_page);
    let request = api.decentralized_exchanges(&DexQuery { per_page: settings.per_page });
    let table = fetcher.fetch_table(&request, &RecordNormaliser::new(schema())).await?;
    println!("✅ Successfully fetched data for {} decentralized exchanges.", table.len());

    let btc_price = settings.btc_price_usd;
    let table = transform::derive_numeric(&table, VOLUME_BTC, VOLUME_USD_BN, |btc| {
        btc * btc_price / 1e9
    })?;

    report::write_csv(&settings.output_path, &table)?;
    println!("✅ Data saved to '{}'.", settings.output_path.display());
    info!(rows = table.len(), btc_price, "dex volume snapshot complete");

    if let Some(chart_settings) = &settings.chart {
        if !table.is_empty() {
            let top = transform::top_n(
                &table,
                VOLUME_USD_BN,
                SortDirection::Descending,
                chart_settings.top,
            )?;
            let title = format!(" Top {} DEX by 24h Volume (B USD) ", top.len());
            let rendered = chart::render_bar_chart(
                &top,
                EXCHANGE,
                VOLUME_USD_BN,
                &title,
                chart_settings.width,
            )?;
            println!("\n{}", rendered);
        }
    }

    Ok(table)
}
