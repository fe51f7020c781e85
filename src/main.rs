use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::error;

use snapx_rs::jobs::dex_volume::{self, DexVolumeSettings};
use snapx_rs::jobs::top_movers::{self, MoversSettings};
use snapx_rs::market_data::adapters::coingecko::CoinGecko;
use snapx_rs::market_data::adapters::http::ReqwestTransport;
use snapx_rs::market_data::executor::RequestExecutor;
use snapx_rs::market_data::fetcher::SnapshotFetcher;
use snapx_rs::settings::AppConfig;
use snapx_rs::telemetry;

#[derive(Parser, Debug)]
#[command(name = "snapx", version, about = "Snapshot CoinGecko market data into CSV")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the CSV file is written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "snapx_rs=info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decentralized exchanges by 24h volume -> DEX_Volume.csv
    DexVolume(DexArgs),
    /// Top gainers and losers per timeframe -> TopGainersAndLosers.csv
    TopMovers(MoversArgs),
}

#[derive(Args, Debug)]
struct DexArgs {
    #[arg(long)]
    per_page: Option<u32>,
    /// BTC price in USD used for the volume conversion
    #[arg(long)]
    btc_price: Option<f64>,
    /// Bars shown in the chart
    #[arg(long)]
    chart_top: Option<usize>,
    #[arg(long)]
    no_chart: bool,
}

#[derive(Args, Debug)]
struct MoversArgs {
    #[arg(long)]
    vs_currency: Option<String>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    page: Option<u32>,
    /// Gainers and losers kept per timeframe
    #[arg(long)]
    top_n: Option<usize>,
    /// Rows printed per subset in the console summary
    #[arg(long)]
    summary_rows: Option<usize>,
}

// CLI flags take precedence over file/env configuration.
fn apply_overrides(cfg: &mut AppConfig, cli: &Cli) {
    if let Some(dir) = &cli.output_dir {
        cfg.output.dir = dir.clone();
    }
    match &cli.command {
        Command::DexVolume(args) => {
            if let Some(v) = args.per_page {
                cfg.dex.per_page = v;
            }
            if let Some(v) = args.btc_price {
                cfg.dex.btc_price_usd = v;
            }
            if let Some(v) = args.chart_top {
                cfg.dex.chart_top = v;
            }
            if args.no_chart {
                cfg.dex.chart = false;
            }
        }
        Command::TopMovers(args) => {
            if let Some(v) = &args.vs_currency {
                cfg.movers.vs_currency = v.clone();
            }
            if let Some(v) = args.per_page {
                cfg.movers.per_page = v;
            }
            if let Some(v) = args.page {
                cfg.movers.page = v;
            }
            if let Some(v) = args.top_n {
                cfg.movers.top_n = v;
            }
            if let Some(v) = args.summary_rows {
                cfg.movers.summary_rows = v;
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    apply_overrides(&mut cfg, &cli);
    cfg.validate().context("validating command line options")?;

    let transport = ReqwestTransport::new(&cfg.executor)?;
    let fetcher = SnapshotFetcher::new(RequestExecutor::new(transport, cfg.executor.clone()));
    let api = CoinGecko::new(&cfg.api.base_url);

    match cli.command {
        Command::DexVolume(_) => {
            let settings = DexVolumeSettings::from_config(&cfg);
            dex_volume::run(&fetcher, &api, &settings).await?;
        }
        Command::TopMovers(_) => {
            let settings = MoversSettings::from_config(&cfg);
            top_movers::run(&fetcher, &api, &settings).await?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "snapx",
            "--output-dir",
            "/tmp/out",
            "top-movers",
            "--top-n",
            "5",
            "--vs-currency",
            "eur",
        ]);
        let mut cfg = AppConfig::default();
        apply_overrides(&mut cfg, &cli);
        assert_eq!(cfg.movers.top_n, 5);
        assert_eq!(cfg.movers.vs_currency, "eur");
        assert_eq!(cfg.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.dex, snapx_rs::settings::DexConfig::default());
    }

    #[test]
    fn no_chart_flag() {
        let cli = Cli::parse_from(["snapx", "dex-volume", "--no-chart", "--btc-price", "95000"]);
        let mut cfg = AppConfig::default();
        apply_overrides(&mut cfg, &cli);
        assert!(!cfg.dex.chart);
        assert_eq!(cfg.dex.btc_price_usd, 95_000.0);
    }
}
