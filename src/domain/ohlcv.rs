//! OHLCV bars and per-symbol historical series.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for one symbol, ordered by date with no repeated dates.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    pub symbol: String,
    bars: Vec<OhlcvBar>,
}

pub type HistoryMap = BTreeMap<String, HistoricalSeries>;

impl HistoricalSeries {
    /// Sorts `bars` by date and keeps the first bar seen for any repeated date.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&OhlcvBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bars dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start)
                .cloned()
                .collect(),
        }
    }
}

/// Length of the history requested from a market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookbackWindow {
    OneMonth,
    #[default]
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl LookbackWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackWindow::OneMonth => "1mo",
            LookbackWindow::ThreeMonths => "3mo",
            LookbackWindow::SixMonths => "6mo",
            LookbackWindow::OneYear => "1y",
            LookbackWindow::TwoYears => "2y",
        }
    }

    /// Calendar days covered by the window.
    pub fn days(&self) -> i64 {
        match self {
            LookbackWindow::OneMonth => 31,
            LookbackWindow::ThreeMonths => 92,
            LookbackWindow::SixMonths => 183,
            LookbackWindow::OneYear => 365,
            LookbackWindow::TwoYears => 730,
        }
    }

    /// First date inside a window that ends on `end`.
    pub fn start_date(&self, end: NaiveDate) -> NaiveDate {
        end - chrono::Duration::days(self.days() - 1)
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(LookbackWindow::OneMonth),
            "3mo" => Ok(LookbackWindow::ThreeMonths),
            "6mo" => Ok(LookbackWindow::SixMonths),
            "1y" => Ok(LookbackWindow::OneYear),
            "2y" => Ok(LookbackWindow::TwoYears),
            other => Err(format!(
                "unknown lookback '{other}' (expected 1mo, 3mo, 6mo, 1y or 2y)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar {
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10_000,
        }
    }

    #[test]
    fn new_sorts_by_date() {
        let series = HistoricalSeries::new("AAPL", vec![bar(3, 103.0), bar(1, 101.0), bar(2, 102.0)]);
        assert_eq!(series.closes(), vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn new_drops_repeated_dates() {
        let series = HistoricalSeries::new("AAPL", vec![bar(1, 101.0), bar(1, 999.0), bar(2, 102.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().close, 101.0);
        assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn first_and_last_on_empty() {
        let series = HistoricalSeries::new("AAPL", vec![]);
        assert!(series.is_empty());
        assert!(series.first().is_none());
        assert!(series.last().is_none());
    }

    #[test]
    fn since_filters_older_bars() {
        let series = HistoricalSeries::new("AAPL", vec![bar(1, 1.0), bar(2, 2.0), bar(3, 3.0)]);
        let tail = series.since(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(tail.closes(), vec![2.0, 3.0]);
        assert_eq!(tail.symbol, "AAPL");
    }

    #[test]
    fn lookback_parse_and_display() {
        for window in [
            LookbackWindow::OneMonth,
            LookbackWindow::ThreeMonths,
            LookbackWindow::SixMonths,
            LookbackWindow::OneYear,
            LookbackWindow::TwoYears,
        ] {
            assert_eq!(window.as_str().parse::<LookbackWindow>(), Ok(window));
        }
        assert!("5d".parse::<LookbackWindow>().is_err());
        assert_eq!(LookbackWindow::default(), LookbackWindow::ThreeMonths);
    }

    #[test]
    fn lookback_start_date_is_inclusive() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            LookbackWindow::OneMonth.start_date(end),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
