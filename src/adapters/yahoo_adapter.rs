//! Yahoo Finance chart API adapter.
//!
//! One chart request per symbol: `range=1d` for the quote
//! (`meta.regularMarketPrice`, falling back to the last close) and the
//! configured lookback range for daily history.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::error::TrackerError;
use crate::domain::ohlcv::{HistoricalSeries, HistoryMap, LookbackWindow, OhlcvBar};
use crate::domain::quote::{Quote, QuoteMap};
use crate::ports::market_data_port::MarketDataPort;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn parse_chart(symbol: &str, json: &str) -> Result<ChartData, TrackerError> {
    let response: ChartResponse = serde_json::from_str(json)
        .map_err(|e| TrackerError::data_unavailable(symbol, format!("parse error: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(TrackerError::data_unavailable(
            symbol,
            format!("API error [{}]: {}", error.code, error.description),
        ));
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| TrackerError::data_unavailable(symbol, "no data returned"))
}

/// Daily bars from a chart payload; rows with any null field are skipped.
fn parse_bars(symbol: &str, data: &ChartData) -> Vec<OhlcvBar> {
    let Some(quote) = data.indicators.quote.first() else {
        return Vec::new();
    };
    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    data.timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: field(&quote.open, i)?,
                high: field(&quote.high, i)?,
                low: field(&quote.low, i)?,
                close: field(&quote.close, i)?,
                volume: quote.volume.get(i).copied().flatten()?,
            })
        })
        .collect()
}

fn parse_quote(symbol: &str, data: &ChartData) -> Result<Quote, TrackerError> {
    let meta = data.meta.as_ref();
    let price = meta
        .and_then(|m| m.regular_market_price)
        .or_else(|| parse_bars(symbol, data).last().map(|b| b.close))
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| TrackerError::data_unavailable(symbol, "no current price in response"))?;
    let timestamp = meta
        .and_then(|m| m.regular_market_time)
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        timestamp,
    })
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(timeout: Duration) -> Result<Self, TrackerError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, TrackerError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::data_unavailable("*", format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, symbol: &str, range: &str) -> String {
        format!("{}/{}?range={}&interval=1d", self.base_url, symbol, range)
    }

    fn fetch_chart(&self, symbol: &str, range: &str) -> Result<ChartData, TrackerError> {
        let url = self.build_url(symbol, range);
        debug!(%url, "requesting chart");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| TrackerError::data_unavailable(symbol, format!("request failed: {e}")))?;

        parse_chart(symbol, &body)
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteMap, TrackerError> {
        let mut quotes = QuoteMap::new();
        for symbol in symbols {
            let chart = self.fetch_chart(symbol, "1d")?;
            quotes.insert(symbol.clone(), parse_quote(symbol, &chart)?);
        }
        info!(count = quotes.len(), "fetched quotes");
        Ok(quotes)
    }

    fn fetch_history(
        &self,
        symbols: &[String],
        window: LookbackWindow,
    ) -> Result<HistoryMap, TrackerError> {
        let mut history = HistoryMap::new();
        for symbol in symbols {
            let chart = self.fetch_chart(symbol, window.as_str())?;
            let bars = parse_bars(symbol, &chart);
            debug!(%symbol, bars = bars.len(), "fetched history");
            history.insert(symbol.clone(), HistoricalSeries::new(symbol.as_str(), bars));
        }
        info!(count = history.len(), %window, "fetched history");
        Ok(history)
    }
}
