//! Validated tracker configuration.
//!
//! Built once from a [`ConfigPort`] and passed into the pipeline; nothing
//! here is process-wide state.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::error::TrackerError;
use crate::domain::ohlcv::LookbackWindow;
use crate::domain::performance::PerformancePolicy;
use crate::domain::signal::CrossoverParams;
use crate::domain::simulator::DEFAULT_INITIAL_CAPITAL;
use crate::domain::symbols::{parse_holdings, parse_symbols};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "TSLA", "AMZN", "MSFT", "GOOGL", "NFLX", "NVDA", "META", "SPY", "BABA",
];
pub const DEFAULT_HOLDINGS: &[(&str, u64)] = &[("AAPL", 10), ("TSLA", 5), ("AMZN", 3), ("MSFT", 7)];
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataProvider {
    Yahoo { timeout_secs: u64 },
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub symbols: Vec<String>,
    pub holdings: BTreeMap<String, u64>,
    pub initial_capital: Decimal,
    pub trade_quantity: u64,
    pub crossover: CrossoverParams,
    pub performance_policy: PerformancePolicy,
    pub lookback: LookbackWindow,
    pub provider: DataProvider,
    pub listen: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            holdings: DEFAULT_HOLDINGS
                .iter()
                .map(|(s, n)| (s.to_string(), *n))
                .collect(),
            initial_capital: Decimal::from(DEFAULT_INITIAL_CAPITAL),
            trade_quantity: 1,
            crossover: CrossoverParams::default(),
            performance_policy: PerformancePolicy::default(),
            lookback: LookbackWindow::default(),
            provider: DataProvider::Yahoo {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Reads every section, falling back to defaults for absent keys, and
    /// rejects values that would make the pipeline meaningless.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TrackerError> {
        let defaults = TrackerConfig::default();

        let symbols = match config.get_string("portfolio", "symbols") {
            Some(raw) => parse_symbols(&raw)
                .map_err(|e| TrackerError::config_invalid("portfolio", "symbols", e.to_string()))?,
            None => defaults.symbols,
        };

        let holdings = match config.get_string("portfolio", "holdings") {
            Some(raw) => parse_holdings(&raw)
                .map_err(|e| TrackerError::config_invalid("portfolio", "holdings", e.to_string()))?,
            None => defaults.holdings,
        };

        let capital = config.get_double(
            "simulation",
            "initial_capital",
            DEFAULT_INITIAL_CAPITAL as f64,
        )?;
        let initial_capital = Decimal::from_f64(capital)
            .filter(|c| *c > Decimal::ZERO)
            .ok_or_else(|| {
                TrackerError::config_invalid(
                    "simulation",
                    "initial_capital",
                    "initial_capital must be positive",
                )
            })?;

        let quantity = config.get_int("simulation", "trade_quantity", 1)?;
        if quantity < 1 {
            return Err(TrackerError::config_invalid(
                "simulation",
                "trade_quantity",
                "trade_quantity must be at least 1",
            ));
        }

        let short_window = read_window(config, "short_window", defaults.crossover.short_window)?;
        let long_window = read_window(config, "long_window", defaults.crossover.long_window)?;
        let crossover = CrossoverParams::new(short_window, long_window)?;

        let performance_policy = match config.get_string("performance", "policy") {
            Some(raw) => raw
                .parse::<PerformancePolicy>()
                .map_err(|e| TrackerError::config_invalid("performance", "policy", e))?,
            None => defaults.performance_policy,
        };

        let lookback = match config.get_string("data", "lookback") {
            Some(raw) => raw
                .parse::<LookbackWindow>()
                .map_err(|e| TrackerError::config_invalid("data", "lookback", e))?,
            None => defaults.lookback,
        };

        let provider = read_provider(config)?;

        let listen = config
            .get_string("web", "listen")
            .unwrap_or(defaults.listen);

        let tracker = TrackerConfig {
            symbols,
            holdings,
            initial_capital,
            trade_quantity: quantity as u64,
            crossover,
            performance_policy,
            lookback,
            provider,
            listen,
        };
        tracker.validate()?;
        Ok(tracker)
    }

    /// Cross-field checks: every holding and any policy symbol must be tracked.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if let Some(symbol) = self
            .holdings
            .keys()
            .find(|s| !self.symbols.contains(s))
        {
            return Err(TrackerError::config_invalid(
                "portfolio",
                "holdings",
                format!("holding {symbol} is not in the tracked symbol list"),
            ));
        }
        if let PerformancePolicy::Symbol(symbol) = &self.performance_policy {
            if !self.symbols.contains(symbol) {
                return Err(TrackerError::config_invalid(
                    "performance",
                    "policy",
                    format!("{symbol} is not in the tracked symbol list"),
                ));
            }
        }
        Ok(())
    }
}

fn read_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, TrackerError> {
    let value = config.get_int("simulation", key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| TrackerError::config_invalid("simulation", key, format!("{key} must be non-negative")))
}

fn read_provider(config: &dyn ConfigPort) -> Result<DataProvider, TrackerError> {
    let kind = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "yahoo".to_string());

    match kind.trim().to_lowercase().as_str() {
        "yahoo" => {
            let timeout = config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?;
            if timeout < 1 {
                return Err(TrackerError::config_invalid(
                    "data",
                    "timeout_secs",
                    "timeout_secs must be at least 1",
                ));
            }
            Ok(DataProvider::Yahoo {
                timeout_secs: timeout as u64,
            })
        }
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| TrackerError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(DataProvider::Csv {
                dir: PathBuf::from(dir),
            })
        }
        other => Err(TrackerError::config_invalid(
            "data",
            "provider",
            format!("unknown provider '{other}' (expected yahoo or csv)"),
        )),
    }
}
