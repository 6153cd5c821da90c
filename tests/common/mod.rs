#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::BTreeMap;
use stocktracker::domain::config::TrackerConfig;
use stocktracker::domain::error::TrackerError;
pub use stocktracker::domain::ohlcv::{HistoricalSeries, HistoryMap, LookbackWindow, OhlcvBar};
use stocktracker::domain::quote::{Quote, QuoteMap};
use stocktracker::domain::signal::CrossoverParams;
use stocktracker::ports::market_data_port::MarketDataPort;

pub struct MockMarketDataPort {
    pub quotes: BTreeMap<String, f64>,
    pub history: BTreeMap<String, Vec<OhlcvBar>>,
    pub error: Option<(String, String)>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            quotes: BTreeMap::new(),
            history: BTreeMap::new(),
            error: None,
        }
    }

    pub fn with_quote(mut self, symbol: &str, price: f64) -> Self {
        self.quotes.insert(symbol.to_string(), price);
        self
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.history.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.error = Some((symbol.to_string(), reason.to_string()));
        self
    }

    fn check(&self) -> Result<(), TrackerError> {
        match &self.error {
            Some((symbol, reason)) => Err(TrackerError::DataUnavailable {
                symbol: symbol.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteMap, TrackerError> {
        self.check()?;
        Ok(symbols
            .iter()
            .filter_map(|s| {
                self.quotes
                    .get(s)
                    .map(|&price| (s.clone(), Quote::now(s.as_str(), price)))
            })
            .collect())
    }

    fn fetch_history(
        &self,
        symbols: &[String],
        _window: LookbackWindow,
    ) -> Result<HistoryMap, TrackerError> {
        self.check()?;
        Ok(symbols
            .iter()
            .map(|s| {
                let bars = self.history.get(s).cloned().unwrap_or_default();
                (s.clone(), HistoricalSeries::new(s.as_str(), bars))
            })
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Daily bars starting 2024-01-01, one per close.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(symbol, start + chrono::Duration::days(i as i64), close))
        .collect()
}

/// BUY on 2024-01-04 at 12, SELL on 2024-01-06 at 8 with a (1, 2) crossover.
pub const UPDOWN_CLOSES: &[f64] = &[10.0, 10.0, 10.0, 12.0, 12.0, 8.0, 8.0];
/// SELL on 2024-01-05 at 8 (never holdable), BUY on 2024-01-07 at 9.
pub const DOWN_CLOSES: &[f64] = &[10.0, 10.0, 10.0, 10.0, 8.0, 8.0, 9.0];

/// Two-symbol market: UPDOWN quoted at 9.0, DOWN at 7.5.
pub fn two_symbol_market() -> MockMarketDataPort {
    MockMarketDataPort::new()
        .with_quote("UPDOWN", 9.0)
        .with_quote("DOWN", 7.5)
        .with_bars("UPDOWN", bars_from_closes("UPDOWN", UPDOWN_CLOSES))
        .with_bars("DOWN", bars_from_closes("DOWN", DOWN_CLOSES))
}

/// Holds 10 UPDOWN and 5 DOWN, trades one share per signal.
pub fn two_symbol_config() -> TrackerConfig {
    TrackerConfig {
        symbols: vec!["UPDOWN".to_string(), "DOWN".to_string()],
        holdings: [("UPDOWN".to_string(), 10), ("DOWN".to_string(), 5)]
            .into_iter()
            .collect(),
        crossover: CrossoverParams::new(1, 2).unwrap(),
        ..TrackerConfig::default()
    }
}
