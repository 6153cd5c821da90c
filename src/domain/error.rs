//! Domain error types.

use rust_decimal::Decimal;

/// Top-level error type for stocktracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("no current quote for {symbol}")]
    MissingQuote { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need at least 2")]
    EmptySeries { symbol: String, bars: usize },

    #[error("invalid price series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("insufficient capital to buy {symbol}: need {required}, have {available}")]
    InsufficientCapital {
        symbol: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares to sell {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },

    #[error("invalid trade for {symbol}: {reason}")]
    InvalidTrade { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TrackerError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data_unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        TrackerError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrackerError> for std::process::ExitCode {
    fn from(err: &TrackerError) -> Self {
        let code: u8 = match err {
            TrackerError::Io(_) => 1,
            TrackerError::ConfigParse { .. }
            | TrackerError::ConfigMissing { .. }
            | TrackerError::ConfigInvalid { .. } => 2,
            TrackerError::DataUnavailable { .. } => 3,
            TrackerError::MissingQuote { .. }
            | TrackerError::EmptySeries { .. }
            | TrackerError::InvalidSeries { .. }
            | TrackerError::InsufficientCapital { .. }
            | TrackerError::InsufficientShares { .. }
            | TrackerError::InvalidTrade { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
