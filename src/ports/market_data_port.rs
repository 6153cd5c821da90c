//! Market data port trait.

use crate::domain::error::TrackerError;
use crate::domain::ohlcv::{HistoryMap, LookbackWindow};
use crate::domain::quote::QuoteMap;

/// Source of current quotes and daily history.
///
/// Implementations return data for every requested symbol or fail the whole
/// call with `TrackerError::DataUnavailable`; partial results are never
/// returned.
pub trait MarketDataPort {
    fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteMap, TrackerError>;

    fn fetch_history(
        &self,
        symbols: &[String],
        window: LookbackWindow,
    ) -> Result<HistoryMap, TrackerError>;
}
