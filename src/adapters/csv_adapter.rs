//! Offline market data from per-symbol CSV files.
//!
//! Each symbol lives in `<dir>/<SYMBOL>.csv` with the header
//! `date,open,high,low,close,volume`. The latest close doubles as the quote.

use crate::domain::error::TrackerError;
use crate::domain::ohlcv::{HistoricalSeries, HistoryMap, LookbackWindow, OhlcvBar};
use crate::domain::quote::{Quote, QuoteMap};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn load_series(&self, symbol: &str) -> Result<HistoricalSeries, TrackerError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            TrackerError::data_unavailable(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| TrackerError::data_unavailable(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = column(&record, 0, "date", symbol)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                TrackerError::data_unavailable(symbol, format!("invalid date '{}': {}", date_str, e))
            })?;

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: parse_column(&record, 1, "open", symbol)?,
                high: parse_column(&record, 2, "high", symbol)?,
                low: parse_column(&record, 3, "low", symbol)?,
                close: parse_column(&record, 4, "close", symbol)?,
                volume: parse_column(&record, 5, "volume", symbol)?,
            });
        }

        debug!(%symbol, bars = bars.len(), path = %path.display(), "loaded csv history");
        Ok(HistoricalSeries::new(symbol, bars))
    }
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<&'r str, TrackerError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| TrackerError::data_unavailable(symbol, format!("missing {} column", name)))
}

fn parse_column<T>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<T, TrackerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = column(record, index, name, symbol)?;
    raw.parse().map_err(|e| {
        TrackerError::data_unavailable(symbol, format!("invalid {} value '{}': {}", name, raw, e))
    })
}

impl MarketDataPort for CsvAdapter {
    fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteMap, TrackerError> {
        let mut quotes = QuoteMap::new();
        for symbol in symbols {
            let series = self.load_series(symbol)?;
            let last = series
                .last()
                .ok_or_else(|| TrackerError::data_unavailable(symbol, "no rows in csv file"))?;
            quotes.insert(symbol.clone(), Quote::now(symbol.as_str(), last.close));
        }
        Ok(quotes)
    }

    fn fetch_history(
        &self,
        symbols: &[String],
        window: LookbackWindow,
    ) -> Result<HistoryMap, TrackerError> {
        let mut history = HistoryMap::new();
        for symbol in symbols {
            let series = self.load_series(symbol)?;
            let windowed = match series.last() {
                Some(last) => series.since(window.start_date(last.date)),
                None => series,
            };
            history.insert(symbol.clone(), windowed);
        }
        Ok(history)
    }
}
