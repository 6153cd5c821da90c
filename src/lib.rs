//! stocktracker: portfolio valuation, lookback performance and a simulated
//! moving-average crossover strategy over live or offline market data.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
