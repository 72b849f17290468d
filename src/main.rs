mod analysis;
mod catalog;
mod config;
mod error;
mod indicator;
mod market_data;
mod model;
mod notifier;
mod request;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis::engine::Analyzer;
use catalog::Catalog;
use config::{AppConfig, WatchConfig};
use market_data::MarketData;
use market_data::yahoo::YahooFinance;
use model::{AnalysisRequest, Interval};
use notifier::Notifier;
use notifier::json::JsonNotifier;
use notifier::terminal::TerminalNotifier;
use request::process_request;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("invalid command line: {reason}")]
    Usage { reason: String },
    #[display("market data provider error")]
    Provider,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(
    name = "forex-analyst",
    about = "Technical analysis of currency pairs (SMA, RSI, MACD)"
)]
struct Cli {
    /// Path to a TOML configuration file; built-in defaults apply without one
    #[arg(short, long)]
    config: Option<String>,

    /// Print reports as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available currency pairs
    Pairs,
    /// List the available intervals and the history fetched for each
    Intervals,
    /// Analyze one pair on one interval
    Analyze {
        /// Symbol code, e.g. EURUSD=X
        #[arg(short, long)]
        symbol: String,
        /// Interval code, e.g. 1h or 1d
        #[arg(short, long, default_value = "1d")]
        interval: String,
    },
    /// Re-run the configured watch requests periodically until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let catalog = Catalog::from_config(&config.pairs);

    match cli.command {
        Command::Pairs => {
            for pair in catalog.pairs() {
                println!("{:<12} {}", pair.code, pair.name);
            }
            Ok(())
        }
        Command::Intervals => {
            for &interval in catalog.intervals() {
                println!(
                    "{:<5} {:<32} history: {}",
                    interval.as_str(),
                    interval.display_name(),
                    interval.lookback()
                );
            }
            Ok(())
        }
        Command::Analyze { symbol, interval } => {
            let interval = Interval::from_str(&interval).ok_or_else(|| {
                Report::new(AppError::Usage {
                    reason: format!("unknown interval \"{interval}\""),
                })
            })?;
            let analyzer = Analyzer::new(config.analysis).change_context(AppError::Config)?;
            let market = YahooFinance::new(&config.provider).change_context(AppError::Provider)?;
            let notifier = build_notifier(cli.json);

            let request = AnalysisRequest { symbol, interval };
            let report = process_request(&market, &analyzer, &catalog, &request).await;
            notifier.notify(&report);
            Ok(())
        }
        Command::Watch => {
            let requests = config.watch.analysis_requests();
            if requests.is_empty() {
                tracing::warn!("no watch requests configured; nothing to do");
                return Ok(());
            }
            let analyzer = Analyzer::new(config.analysis).change_context(AppError::Config)?;
            let market: Arc<dyn MarketData> = Arc::new(
                YahooFinance::new(&config.provider).change_context(AppError::Provider)?,
            );
            watch(
                &config.watch,
                requests,
                market,
                Arc::new(analyzer),
                Arc::new(catalog),
                build_notifier(cli.json),
            )
            .await
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    // Reports go to stdout; keep logs on stderr.
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn build_notifier(json: bool) -> Arc<dyn Notifier> {
    if json {
        Arc::new(JsonNotifier)
    } else {
        Arc::new(TerminalNotifier)
    }
}

async fn watch(
    settings: &WatchConfig,
    requests: Vec<AnalysisRequest>,
    market: Arc<dyn MarketData>,
    analyzer: Arc<Analyzer>,
    catalog: Arc<Catalog>,
    notifier: Arc<dyn Notifier>,
) -> Result<(), Report<AppError>> {
    let cancel = CancellationToken::new();
    let mut ticker = round_ticker(settings.every_secs);

    let shutdown = cancel.clone();
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl+c received, shutting down");
        }
        shutdown.cancel();
    });

    info!(
        requests = requests.len(),
        every_secs = settings.every_secs,
        windows = ?analyzer.config(),
        "watch started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                run_round(&requests, &market, &analyzer, &catalog, &notifier, &cancel).await?;
            }
        }
    }

    signal_handle.abort();
    info!("shutdown complete");
    Ok(())
}

/// A slow round pushes the next one back instead of triggering catch-up rounds.
fn round_ticker(every_secs: u64) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(Duration::from_secs(every_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Run every request concurrently; each task only touches its own bars.
async fn run_round(
    requests: &[AnalysisRequest],
    market: &Arc<dyn MarketData>,
    analyzer: &Arc<Analyzer>,
    catalog: &Arc<Catalog>,
    notifier: &Arc<dyn Notifier>,
    cancel: &CancellationToken,
) -> Result<(), Report<AppError>> {
    let mut handles = Vec::with_capacity(requests.len());
    for request in requests {
        let request = request.clone();
        let market = Arc::clone(market);
        let analyzer = Arc::clone(analyzer);
        let catalog = Arc::clone(catalog);
        let notifier = Arc::clone(notifier);
        let cancel = cancel.clone();

        handles.push(tokio::spawn(async move {
            // A cancelled request's result is simply discarded.
            let report = tokio::select! {
                _ = cancel.cancelled() => return,
                report = process_request(market.as_ref(), &analyzer, &catalog, &request) => report,
            };
            notifier.notify(&report);
        }));
    }

    for handle in handles {
        handle.await.change_context(AppError::Runtime)?;
    }
    Ok(())
}
