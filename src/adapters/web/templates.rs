//! HTML templates using Askama.
//!
//! Templates receive pre-formatted strings; every figure that could not be
//! computed is rendered as an explicit "unavailable" marker with its reason.

use askama::Template;
use std::fmt::Display;

use crate::domain::analysis::AnalysisReport;
use crate::domain::config::TrackerConfig;
use crate::domain::error::TrackerError;

/// One headline number, or the reason it is missing.
pub struct Figure {
    pub available: bool,
    pub text: String,
}

impl Figure {
    fn from_result<T, F>(value: Result<T, &TrackerError>, format: F) -> Self
    where
        F: FnOnce(T) -> String,
    {
        match value {
            Ok(v) => Figure {
                available: true,
                text: format(v),
            },
            Err(e) => Figure {
                available: false,
                text: e.to_string(),
            },
        }
    }
}

fn money(value: impl Display) -> String {
    format!("{:.2}", value)
}

pub struct QuoteRow {
    pub symbol: String,
    pub price: String,
    pub timestamp: String,
    pub shares: u64,
}

pub struct SignalRow {
    pub action: String,
    pub date: String,
    pub price: String,
}

pub struct SignalGroup {
    pub symbol: String,
    pub events: Vec<SignalRow>,
}

pub struct TradeRow {
    pub symbol: String,
    pub action: String,
    pub quantity: u64,
    pub price: String,
    pub cash_after: String,
}

pub struct SkippedRow {
    pub date: String,
    pub symbol: String,
    pub action: String,
    pub price: String,
    pub reason: String,
}

pub struct PerformanceRow {
    pub symbol: String,
    pub start_value: Figure,
    pub end_value: Figure,
    pub percent_change: Figure,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub policy: String,
    pub initial_capital: String,
    pub portfolio_value: Figure,
    pub start_value: Figure,
    pub end_value: Figure,
    pub percent_change: Figure,
    pub final_value: Figure,
    pub cash: String,
    pub quotes: Vec<QuoteRow>,
    pub performance: Vec<PerformanceRow>,
    pub signals: Vec<SignalGroup>,
    pub trades: Vec<TradeRow>,
    pub skipped: Vec<SkippedRow>,
}

impl IndexTemplate {
    pub fn from_report(report: &AnalysisReport, config: &TrackerConfig) -> Self {
        let perf = report.performance.as_ref();

        let quotes = report
            .real_time_data
            .values()
            .map(|q| QuoteRow {
                symbol: q.symbol.clone(),
                price: money(q.price),
                timestamp: q.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
                shares: config.holdings.get(&q.symbol).copied().unwrap_or(0),
            })
            .collect();

        let performance = report
            .per_symbol_performance
            .iter()
            .map(|(symbol, result)| {
                let r = result.as_ref();
                PerformanceRow {
                    symbol: symbol.clone(),
                    start_value: Figure::from_result(r.map(|p| p.start_value), money),
                    end_value: Figure::from_result(r.map(|p| p.end_value), money),
                    percent_change: Figure::from_result(r.map(|p| p.percent_change), |v| {
                        format!("{:+.2}%", v)
                    }),
                }
            })
            .collect();

        let signals = report
            .buy_sell_signals
            .iter()
            .map(|(symbol, events)| SignalGroup {
                symbol: symbol.clone(),
                events: events
                    .iter()
                    .map(|e| SignalRow {
                        action: e.action.to_string(),
                        date: e.date.to_string(),
                        price: money(e.price),
                    })
                    .collect(),
            })
            .collect();

        let trades = report
            .trade_history
            .iter()
            .map(|t| TradeRow {
                symbol: t.symbol.clone(),
                action: t.action.to_string(),
                quantity: t.quantity,
                price: money(t.price),
                cash_after: money(t.cash_after),
            })
            .collect();

        let skipped = report
            .skipped_trades
            .iter()
            .map(|s| SkippedRow {
                date: s.date.to_string(),
                symbol: s.symbol.clone(),
                action: s.action.to_string(),
                price: money(s.price),
                reason: s.reason.clone(),
            })
            .collect();

        IndexTemplate {
            title: "Stock Portfolio Tracker".to_string(),
            policy: config.performance_policy.to_string(),
            initial_capital: money(config.initial_capital),
            portfolio_value: Figure::from_result(report.portfolio_value.as_ref().copied(), money),
            start_value: Figure::from_result(perf.map(|p| p.start_value), money),
            end_value: Figure::from_result(perf.map(|p| p.end_value), money),
            percent_change: Figure::from_result(perf.map(|p| p.percent_change), |v| {
                format!("{:+.2}%", v)
            }),
            final_value: Figure::from_result(report.final_value.as_ref().copied(), money),
            cash: money(report.cash),
            quotes,
            performance,
            signals,
            trades,
            skipped,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub status: u16,
}
