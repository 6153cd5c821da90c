//! Parsing of symbol lists and holdings from configuration strings.

use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid holding '{0}' (expected SYMBOL:SHARES)")]
    InvalidHolding(String),
}

fn normalize(token: &str) -> Result<String, SymbolListError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(SymbolListError::EmptyToken);
    }
    Ok(trimmed.to_uppercase())
}

/// `AAPL, tsla` → `["AAPL", "TSLA"]`, keeping input order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = normalize(token)?;
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// `AAPL:10, TSLA:5` → `{AAPL: 10, TSLA: 5}`. An empty string is no holdings.
pub fn parse_holdings(input: &str) -> Result<BTreeMap<String, u64>, SymbolListError> {
    let mut holdings = BTreeMap::new();
    if input.trim().is_empty() {
        return Ok(holdings);
    }

    for token in input.split(',') {
        let (symbol, shares) = token
            .split_once(':')
            .ok_or_else(|| SymbolListError::InvalidHolding(token.trim().to_string()))?;
        let symbol = normalize(symbol)?;
        let shares: u64 = shares
            .trim()
            .parse()
            .map_err(|_| SymbolListError::InvalidHolding(token.trim().to_string()))?;
        if holdings.insert(symbol.clone(), shares).is_some() {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
    }

    Ok(holdings)
}
