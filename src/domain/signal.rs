//! Moving-average crossover signal generation.
//!
//! A BUY fires on the bar where the short SMA moves from at-or-below the long
//! SMA to strictly above it; a SELL fires on the mirror move. Both averages
//! must be defined on the current and the previous bar, so the first bar that
//! can carry a signal is index `long_window`.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::TrackerError;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::ohlcv::{HistoricalSeries, OhlcvBar};

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub action: TradeAction,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

impl CrossoverParams {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, TrackerError> {
        if short_window == 0 {
            return Err(TrackerError::config_invalid(
                "simulation",
                "short_window",
                "short_window must be at least 1",
            ));
        }
        if long_window <= short_window {
            return Err(TrackerError::config_invalid(
                "simulation",
                "long_window",
                format!("long_window ({long_window}) must exceed short_window ({short_window})"),
            ));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }
}

/// Lazy iterator over the crossover events of one series.
///
/// Holds no state beyond its cursor, so calling [`crossover_signals`] again on
/// the same series replays the same events.
pub struct CrossoverSignals<'a> {
    bars: &'a [OhlcvBar],
    short: IndicatorSeries,
    long: IndicatorSeries,
    index: usize,
}

pub fn crossover_signals(series: &HistoricalSeries, params: CrossoverParams) -> CrossoverSignals<'_> {
    let bars = series.bars();
    CrossoverSignals {
        bars,
        short: calculate_sma(bars, params.short_window),
        long: calculate_sma(bars, params.long_window),
        index: params.long_window.max(1),
    }
}

impl CrossoverSignals<'_> {
    fn signal_at(&self, i: usize) -> Option<TradeAction> {
        let short_now = self.short.value_at(i)?;
        let long_now = self.long.value_at(i)?;
        let short_prev = self.short.value_at(i - 1)?;
        let long_prev = self.long.value_at(i - 1)?;

        if short_now > long_now && short_prev <= long_prev {
            Some(TradeAction::Buy)
        } else if short_now < long_now && short_prev >= long_prev {
            Some(TradeAction::Sell)
        } else {
            None
        }
    }
}

impl Iterator for CrossoverSignals<'_> {
    type Item = SignalEvent;

    fn next(&mut self) -> Option<SignalEvent> {
        while self.index < self.bars.len() {
            let i = self.index;
            self.index += 1;
            if let Some(action) = self.signal_at(i) {
                let bar = &self.bars[i];
                return Some(SignalEvent {
                    action,
                    date: bar.date,
                    price: bar.close,
                });
            }
        }
        None
    }
}

/// Signals for every series in `history`, keyed by symbol.
pub fn signals_by_symbol<'a, I>(history: I, params: CrossoverParams) -> BTreeMap<String, Vec<SignalEvent>>
where
    I: IntoIterator<Item = &'a HistoricalSeries>,
{
    history
        .into_iter()
        .map(|series| {
            (
                series.symbol.clone(),
                crossover_signals(series, params).collect(),
            )
        })
        .collect()
}

/// Flattens per-symbol signals into one chronological sequence.
///
/// Events on the same date keep symbol order, then per-symbol order.
pub fn merge_chronological(
    signals: &BTreeMap<String, Vec<SignalEvent>>,
) -> Vec<(&str, &SignalEvent)> {
    let mut merged: Vec<(&str, &SignalEvent)> = signals
        .iter()
        .flat_map(|(symbol, events)| events.iter().map(move |e| (symbol.as_str(), e)))
        .collect();
    merged.sort_by_key(|(_, e)| e.date);
    merged
}
