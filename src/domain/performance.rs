//! Start/end performance over a lookback window.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::TrackerError;
use crate::domain::ohlcv::{HistoricalSeries, HistoryMap};
use crate::domain::portfolio::Portfolio;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    pub start_value: f64,
    pub end_value: f64,
    pub percent_change: f64,
}

impl Performance {
    fn from_values(symbol: &str, start_value: f64, end_value: f64) -> Result<Self, TrackerError> {
        if !start_value.is_finite() || start_value <= 0.0 {
            return Err(TrackerError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: format!("start value {start_value} is not positive"),
            });
        }
        Ok(Performance {
            start_value,
            end_value,
            percent_change: (end_value - start_value) / start_value * 100.0,
        })
    }
}

/// How the headline performance figure is derived from the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PerformancePolicy {
    /// Share-weighted: Σ shares × first close against Σ shares × last close.
    #[default]
    Portfolio,
    /// A single named symbol's series.
    Symbol(String),
}

impl fmt::Display for PerformancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformancePolicy::Portfolio => write!(f, "portfolio"),
            PerformancePolicy::Symbol(symbol) => write!(f, "symbol:{symbol}"),
        }
    }
}

impl std::str::FromStr for PerformancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("portfolio") {
            return Ok(PerformancePolicy::Portfolio);
        }
        match trimmed.split_once(':') {
            Some((kind, symbol)) if kind.eq_ignore_ascii_case("symbol") && !symbol.trim().is_empty() => {
                Ok(PerformancePolicy::Symbol(symbol.trim().to_uppercase()))
            }
            _ => Err(format!(
                "unknown performance policy '{trimmed}' (expected 'portfolio' or 'symbol:<SYMBOL>')"
            )),
        }
    }
}

pub fn calculate_performance(series: &HistoricalSeries) -> Result<Performance, TrackerError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (first, last),
        _ => {
            return Err(TrackerError::EmptySeries {
                symbol: series.symbol.clone(),
                bars: series.len(),
            });
        }
    };
    Performance::from_values(&series.symbol, first.close, last.close)
}

pub fn portfolio_performance(
    portfolio: &Portfolio,
    history: &HistoryMap,
) -> Result<Performance, TrackerError> {
    let mut start_value = 0.0;
    let mut end_value = 0.0;

    for (symbol, &shares) in portfolio.holdings() {
        let series = history.get(symbol).ok_or_else(|| TrackerError::EmptySeries {
            symbol: symbol.clone(),
            bars: 0,
        })?;
        let perf = calculate_performance(series)?;
        start_value += shares as f64 * perf.start_value;
        end_value += shares as f64 * perf.end_value;
    }

    Performance::from_values("portfolio", start_value, end_value)
}

/// Headline performance under `policy`.
pub fn performance_for(
    policy: &PerformancePolicy,
    portfolio: &Portfolio,
    history: &HistoryMap,
) -> Result<Performance, TrackerError> {
    match policy {
        PerformancePolicy::Portfolio => portfolio_performance(portfolio, history),
        PerformancePolicy::Symbol(symbol) => match history.get(symbol) {
            Some(series) => calculate_performance(series),
            None => Err(TrackerError::EmptySeries {
                symbol: symbol.clone(),
                bars: 0,
            }),
        },
    }
}

pub fn per_symbol_performance(
    history: &HistoryMap,
) -> BTreeMap<String, Result<Performance, TrackerError>> {
    history
        .iter()
        .map(|(symbol, series)| (symbol.clone(), calculate_performance(series)))
        .collect()
}
