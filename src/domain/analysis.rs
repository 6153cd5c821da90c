//! One fetch-compute pass from market data to a renderable report.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::domain::config::TrackerConfig;
use crate::domain::error::TrackerError;
use crate::domain::performance::{Performance, per_symbol_performance, performance_for};
use crate::domain::portfolio::Portfolio;
use crate::domain::quote::QuoteMap;
use crate::domain::signal::{SignalEvent, merge_chronological, signals_by_symbol};
use crate::domain::simulator::{SkippedTrade, TradeRecord, TradeSimulator};
use crate::ports::market_data_port::MarketDataPort;

/// Everything the presentation layer renders.
///
/// Each computed figure is an independent `Result`: one failing never hides
/// the others.
#[derive(Debug)]
pub struct AnalysisReport {
    pub portfolio_value: Result<f64, TrackerError>,
    pub performance: Result<Performance, TrackerError>,
    pub per_symbol_performance: BTreeMap<String, Result<Performance, TrackerError>>,
    pub final_value: Result<Decimal, TrackerError>,
    pub buy_sell_signals: BTreeMap<String, Vec<SignalEvent>>,
    pub trade_history: Vec<TradeRecord>,
    pub skipped_trades: Vec<SkippedTrade>,
    pub real_time_data: QuoteMap,
    pub cash: Decimal,
}

impl AnalysisReport {
    pub fn start_value(&self) -> Option<f64> {
        self.performance.as_ref().ok().map(|p| p.start_value)
    }

    pub fn end_value(&self) -> Option<f64> {
        self.performance.as_ref().ok().map(|p| p.end_value)
    }

    pub fn percent_change(&self) -> Option<f64> {
        self.performance.as_ref().ok().map(|p| p.percent_change)
    }

    pub fn signal_count(&self) -> usize {
        self.buy_sell_signals.values().map(Vec::len).sum()
    }
}

/// Runs the full pipeline. Only a failed fetch aborts; everything after it
/// degrades per field.
pub fn analyze(
    port: &dyn MarketDataPort,
    config: &TrackerConfig,
) -> Result<AnalysisReport, TrackerError> {
    info!(symbols = config.symbols.len(), lookback = %config.lookback, "fetching market data");
    let real_time_data = port.fetch_quotes(&config.symbols)?;
    let history = port.fetch_history(&config.symbols, config.lookback)?;

    let portfolio = Portfolio::new(config.holdings.clone());
    let portfolio_value = portfolio.current_value(&real_time_data);
    if let Err(e) = &portfolio_value {
        warn!("portfolio valuation failed: {e}");
    }

    let performance = performance_for(&config.performance_policy, &portfolio, &history);
    if let Err(e) = &performance {
        warn!(policy = %config.performance_policy, "performance unavailable: {e}");
    }

    let buy_sell_signals = signals_by_symbol(history.values(), config.crossover);

    let mut simulator = TradeSimulator::new(config.initial_capital);
    simulator.apply_signals(config.trade_quantity, merge_chronological(&buy_sell_signals));
    let final_value = simulator.final_value(&real_time_data);

    info!(
        signals = buy_sell_signals.values().map(Vec::len).sum::<usize>(),
        trades = simulator.trade_history().len(),
        skipped = simulator.skipped_count(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        portfolio_value,
        performance,
        per_symbol_performance: per_symbol_performance(&history),
        final_value,
        buy_sell_signals,
        trade_history: simulator.trade_history().to_vec(),
        skipped_trades: simulator.skipped_trades().to_vec(),
        real_time_data,
        cash: simulator.cash(),
    })
}
