//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{AnalysisReport, analyze};
use crate::domain::config::{DataProvider, TrackerConfig};
use crate::domain::error::TrackerError;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "stocktracker", about = "Stock portfolio tracker and crossover simulator")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub verbosity: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run one analysis pass and print the report
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(config.as_deref()),
        Command::Analyze { config } => run_analyze(config.as_deref()),
    }
}

/// Loads the INI file at `path`, or the built-in defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig, TrackerError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            let adapter = FileConfigAdapter::from_file(path)?;
            TrackerConfig::from_config(&adapter)
        }
        None => {
            info!("no config file given, using defaults");
            Ok(TrackerConfig::default())
        }
    }
}

pub fn build_market_data(
    config: &TrackerConfig,
) -> Result<Arc<dyn MarketDataPort + Send + Sync>, TrackerError> {
    match &config.provider {
        DataProvider::Csv { dir } => Ok(Arc::new(CsvAdapter::new(dir.clone()))),
        #[cfg(feature = "yahoo")]
        DataProvider::Yahoo { timeout_secs } => {
            use crate::adapters::yahoo_adapter::YahooAdapter;
            let adapter = YahooAdapter::new(std::time::Duration::from_secs(*timeout_secs))?;
            Ok(Arc::new(adapter))
        }
        #[cfg(not(feature = "yahoo"))]
        DataProvider::Yahoo { .. } => Err(TrackerError::config_invalid(
            "data",
            "provider",
            "yahoo feature is not enabled in this build",
        )),
    }
}

fn fail(err: &TrackerError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn run_analyze(config_path: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let market_data = match build_market_data(&config) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    match analyze(&*market_data, &config) {
        Ok(report) => {
            print!("{}", format_report(&report, &config));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn figure<T: std::fmt::Display>(value: &Result<T, TrackerError>) -> String {
    match value {
        Ok(v) => format!("{v:.2}"),
        Err(e) => format!("unavailable ({e})"),
    }
}

/// Plain-text rendering of a report for the terminal.
pub fn format_report(report: &AnalysisReport, config: &TrackerConfig) -> String {
    let mut out = String::new();

    out.push_str("=== Portfolio ===\n");
    out.push_str(&format!("Portfolio Value:  {}\n", figure(&report.portfolio_value)));
    match &report.performance {
        Ok(p) => {
            out.push_str(&format!("Start Value:      {:.2}\n", p.start_value));
            out.push_str(&format!("End Value:        {:.2}\n", p.end_value));
            out.push_str(&format!("Percent Change:   {:+.2}%\n", p.percent_change));
        }
        Err(e) => out.push_str(&format!("Performance:      unavailable ({e})\n")),
    }
    out.push_str(&format!("Policy:           {}\n", config.performance_policy));

    out.push_str("\n=== Real-Time Data ===\n");
    for quote in report.real_time_data.values() {
        out.push_str(&format!("  {:<6} {:>10.2}\n", quote.symbol, quote.price));
    }

    out.push_str("\n=== Signals ===\n");
    for (symbol, events) in &report.buy_sell_signals {
        for event in events {
            out.push_str(&format!(
                "  {} {:<6} {:<4} @ {:.2}\n",
                event.date, symbol, event.action, event.price
            ));
        }
    }

    out.push_str("\n=== Simulation ===\n");
    out.push_str(&format!("Initial Capital:  {:.2}\n", config.initial_capital));
    out.push_str(&format!("Trades:           {}\n", report.trade_history.len()));
    out.push_str(&format!("Skipped:          {}\n", report.skipped_trades.len()));
    out.push_str(&format!("Cash:             {:.2}\n", report.cash));
    out.push_str(&format!("Final Value:      {}\n", figure(&report.final_value)));
    out
}

fn run_serve(config_path: Option<&Path>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::net::SocketAddr;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return fail(&e),
        };
        // The blocking HTTP client must be built outside the async runtime.
        let market_data = match build_market_data(&config) {
            Ok(m) => m,
            Err(e) => return fail(&e),
        };
        let addr: SocketAddr = match config.listen.parse() {
            Ok(a) => a,
            Err(e) => {
                return fail(&TrackerError::config_invalid(
                    "web",
                    "listen",
                    format!("{}: {e}", config.listen),
                ));
            }
        };

        let router = build_router(AppState {
            market_data,
            config: Arc::new(config),
        });

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(r) => r,
            Err(e) => return fail(&TrackerError::Io(e)),
        };
        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "web server listening");
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&TrackerError::Io(e)),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
