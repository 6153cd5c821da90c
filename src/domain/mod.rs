//! Core domain types and logic.

pub mod ohlcv;
pub mod quote;
pub mod indicator;
pub mod signal;
pub mod portfolio;
pub mod performance;
pub mod simulator;
pub mod symbols;
pub mod config;
pub mod analysis;
pub mod error;
