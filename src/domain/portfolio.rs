//! Tracked portfolio holdings and valuation.

use std::collections::BTreeMap;

use super::error::TrackerError;
use super::quote::QuoteMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    holdings: BTreeMap<String, u64>,
}

impl Portfolio {
    pub fn new(holdings: BTreeMap<String, u64>) -> Self {
        Portfolio { holdings }
    }

    pub fn holdings(&self) -> &BTreeMap<String, u64> {
        &self.holdings
    }

    pub fn shares(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.holdings.keys().map(String::as_str)
    }

    /// Sum of shares × current price over every holding.
    ///
    /// Fails on the first held symbol without a quote; never values it at zero.
    pub fn current_value(&self, quotes: &QuoteMap) -> Result<f64, TrackerError> {
        self.holdings
            .iter()
            .map(|(symbol, &shares)| {
                quotes
                    .get(symbol)
                    .map(|q| shares as f64 * q.price)
                    .ok_or_else(|| TrackerError::MissingQuote {
                        symbol: symbol.clone(),
                    })
            })
            .sum()
    }
}
