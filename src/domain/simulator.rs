//! Sequential trade simulator driven by crossover signals.
//!
//! Cash and trade notionals are `Decimal`, so a zero-fee buy followed by a
//! sell of the same size at the same price restores cash exactly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::error::TrackerError;
use crate::domain::quote::QuoteMap;
use crate::domain::signal::{SignalEvent, TradeAction};

pub const DEFAULT_INITIAL_CAPITAL: i64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u64,
    pub price: Decimal,
    pub cash_after: Decimal,
}

/// A signal the simulator could not act on.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTrade {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u64,
    pub price: f64,
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TradeSimulator {
    initial_capital: Decimal,
    cash: Decimal,
    holdings: BTreeMap<String, u64>,
    trade_history: Vec<TradeRecord>,
    skipped: Vec<SkippedTrade>,
}

impl Default for TradeSimulator {
    fn default() -> Self {
        Self::new(Decimal::from(DEFAULT_INITIAL_CAPITAL))
    }
}

impl TradeSimulator {
    pub fn new(initial_capital: Decimal) -> Self {
        TradeSimulator {
            initial_capital,
            cash: initial_capital,
            holdings: BTreeMap::new(),
            trade_history: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn holdings(&self) -> &BTreeMap<String, u64> {
        &self.holdings
    }

    pub fn held(&self, symbol: &str) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn trade_history(&self) -> &[TradeRecord] {
        &self.trade_history
    }

    pub fn skipped_trades(&self) -> &[SkippedTrade] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Executes one trade, or leaves state untouched and returns why not.
    pub fn execute_trade(
        &mut self,
        action: TradeAction,
        symbol: &str,
        quantity: u64,
        price: f64,
    ) -> Result<&TradeRecord, TrackerError> {
        let price = to_price(symbol, price)?;
        if quantity == 0 {
            return Err(TrackerError::InvalidTrade {
                symbol: symbol.to_string(),
                reason: "quantity must be at least 1".into(),
            });
        }
        let notional = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(|| TrackerError::InvalidTrade {
                symbol: symbol.to_string(),
                reason: format!("notional of {quantity} x {price} is out of range"),
            })?;

        match action {
            TradeAction::Buy => {
                if notional > self.cash {
                    return Err(TrackerError::InsufficientCapital {
                        symbol: symbol.to_string(),
                        required: notional,
                        available: self.cash,
                    });
                }
                let held = self.held(symbol).checked_add(quantity).ok_or_else(|| {
                    TrackerError::InvalidTrade {
                        symbol: symbol.to_string(),
                        reason: format!("holding after buying {quantity} is out of range"),
                    }
                })?;
                self.cash -= notional;
                self.holdings.insert(symbol.to_string(), held);
            }
            TradeAction::Sell => {
                let held = self.held(symbol);
                if held < quantity {
                    return Err(TrackerError::InsufficientShares {
                        symbol: symbol.to_string(),
                        requested: quantity,
                        held,
                    });
                }
                self.cash = self.cash.checked_add(notional).ok_or_else(|| {
                    TrackerError::InvalidTrade {
                        symbol: symbol.to_string(),
                        reason: format!("cash after selling {quantity} x {price} is out of range"),
                    }
                })?;
                self.holdings.insert(symbol.to_string(), held - quantity);
            }
        }

        debug!(%symbol, %action, quantity, %price, cash = %self.cash, "executed trade");
        self.trade_history.push(TradeRecord {
            symbol: symbol.to_string(),
            action,
            quantity,
            price,
            cash_after: self.cash,
        });
        Ok(&self.trade_history[self.trade_history.len() - 1])
    }

    /// Trades `quantity` shares on every signal in order, skipping and
    /// recording any that cannot execute.
    pub fn apply_signals<'a, I>(&mut self, quantity: u64, signals: I)
    where
        I: IntoIterator<Item = (&'a str, &'a SignalEvent)>,
    {
        for (symbol, event) in signals {
            let outcome = self
                .execute_trade(event.action, symbol, quantity, event.price)
                .map(|_| ());
            if let Err(err) = outcome {
                warn!(%symbol, date = %event.date, "skipping trade: {err}");
                self.skipped.push(SkippedTrade {
                    symbol: symbol.to_string(),
                    action: event.action,
                    quantity,
                    price: event.price,
                    date: event.date,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Mark-to-market value of simulated holdings, excluding cash.
    pub fn get_portfolio_value(&self, quotes: &QuoteMap) -> Result<Decimal, TrackerError> {
        let mut total = Decimal::ZERO;
        for (symbol, &quantity) in &self.holdings {
            let quote = quotes.get(symbol).ok_or_else(|| TrackerError::MissingQuote {
                symbol: symbol.clone(),
            })?;
            let price = to_price(symbol, quote.price)?;
            total = Decimal::from(quantity)
                .checked_mul(price)
                .and_then(|value| total.checked_add(value))
                .ok_or_else(|| out_of_range(symbol))?;
        }
        Ok(total)
    }

    /// Cash plus mark-to-market value of holdings.
    pub fn final_value(&self, quotes: &QuoteMap) -> Result<Decimal, TrackerError> {
        self.cash
            .checked_add(self.get_portfolio_value(quotes)?)
            .ok_or_else(|| out_of_range("portfolio"))
    }
}

fn out_of_range(symbol: &str) -> TrackerError {
    TrackerError::InvalidSeries {
        symbol: symbol.to_string(),
        reason: "mark-to-market value is out of range".into(),
    }
}

fn to_price(symbol: &str, price: f64) -> Result<Decimal, TrackerError> {
    match Decimal::from_f64(price) {
        Some(p) if p > Decimal::ZERO => Ok(p),
        _ => Err(TrackerError::InvalidTrade {
            symbol: symbol.to_string(),
            reason: format!("price {price} is not a positive number"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::Quote;
    use proptest::prelude::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn event(action: TradeAction, day: u32, price: f64) -> SignalEvent {
        SignalEvent {
            action,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            price,
        }
    }

    #[test]
    fn new_simulator() {
        let sim = TradeSimulator::default();
        assert_eq!(sim.cash(), dec(10_000));
        assert_eq!(sim.initial_capital(), dec(10_000));
        assert!(sim.holdings().is_empty());
        assert!(sim.trade_history().is_empty());
        assert_eq!(sim.skipped_count(), 0);
    }

    #[test]
    fn buy_then_sell_scenario() {
        let mut sim = TradeSimulator::new(dec(10_000));

        sim.execute_trade(TradeAction::Buy, "AAPL", 1, 150.0).unwrap();
        assert_eq!(sim.cash(), dec(9_850));
        assert_eq!(sim.held("AAPL"), 1);

        sim.execute_trade(TradeAction::Sell, "AAPL", 1, 160.0).unwrap();
        assert_eq!(sim.cash(), dec(10_010));
        assert_eq!(sim.holdings().get("AAPL"), Some(&0));
    }

    #[test]
    fn trade_record_fields() {
        let mut sim = TradeSimulator::new(dec(1_000));
        let record = sim.execute_trade(TradeAction::Buy, "TSLA", 2, 125.5).unwrap().clone();
        assert_eq!(record.symbol, "TSLA");
        assert_eq!(record.action, TradeAction::Buy);
        assert_eq!(record.quantity, 2);
        assert_eq!(record.price, Decimal::new(1255, 1));
        assert_eq!(record.cash_after, dec(749));
        assert_eq!(sim.trade_history(), &[record]);
    }

    #[test]
    fn buy_beyond_cash_is_rejected() {
        let mut sim = TradeSimulator::new(dec(100));
        let err = sim.execute_trade(TradeAction::Buy, "NVDA", 1, 100.01).unwrap_err();
        assert!(matches!(err, TrackerError::InsufficientCapital { .. }));
        assert_eq!(sim.cash(), dec(100));
        assert!(sim.holdings().is_empty());
        assert!(sim.trade_history().is_empty());
    }

    #[test]
    fn buy_exactly_all_cash() {
        let mut sim = TradeSimulator::new(dec(300));
        sim.execute_trade(TradeAction::Buy, "SPY", 3, 100.0).unwrap();
        assert_eq!(sim.cash(), Decimal::ZERO);
    }

    #[test]
    fn sell_without_shares_is_rejected() {
        let mut sim = TradeSimulator::new(dec(1_000));
        let err = sim.execute_trade(TradeAction::Sell, "META", 1, 300.0).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InsufficientShares { requested: 1, held: 0, .. }
        ));
        assert_eq!(sim.cash(), dec(1_000));
        assert!(sim.trade_history().is_empty());
    }

    #[test]
    fn sell_more_than_held_is_rejected() {
        let mut sim = TradeSimulator::new(dec(1_000));
        sim.execute_trade(TradeAction::Buy, "META", 1, 300.0).unwrap();
        assert!(sim.execute_trade(TradeAction::Sell, "META", 2, 300.0).is_err());
        assert_eq!(sim.held("META"), 1);
    }

    #[test]
    fn invalid_price_and_quantity() {
        let mut sim = TradeSimulator::default();
        assert!(matches!(
            sim.execute_trade(TradeAction::Buy, "AAPL", 1, 0.0),
            Err(TrackerError::InvalidTrade { .. })
        ));
        assert!(matches!(
            sim.execute_trade(TradeAction::Buy, "AAPL", 1, f64::NAN),
            Err(TrackerError::InvalidTrade { .. })
        ));
        assert!(matches!(
            sim.execute_trade(TradeAction::Buy, "AAPL", 0, 10.0),
            Err(TrackerError::InvalidTrade { .. })
        ));
    }

    #[test]
    fn oversized_trade_is_rejected_without_panic() {
        let mut sim = TradeSimulator::default();
        let err = sim
            .execute_trade(TradeAction::Buy, "AAPL", u64::MAX, 1e12)
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidTrade { .. }));
        assert_eq!(sim.cash(), dec(10_000));
        assert!(sim.trade_history().is_empty());
    }

    #[test]
    fn oversized_signal_is_skipped() {
        let mut sim = TradeSimulator::default();
        let signals = [
            ("AAPL", event(TradeAction::Buy, 1, 1e12)),
            ("AAPL", event(TradeAction::Sell, 2, 1e12)),
        ];
        sim.apply_signals(100_000_000_000_000_000, signals.iter().map(|(s, e)| (*s, e)));

        assert_eq!(sim.skipped_count(), 2);
        assert!(sim
            .skipped_trades()
            .iter()
            .all(|s| s.reason.contains("out of range")));
        assert!(sim.trade_history().is_empty());
        assert_eq!(sim.cash(), dec(10_000));
    }

    #[test]
    fn oversized_valuation_is_an_error() {
        let mut sim = TradeSimulator::new(dec(100_000_000_000));
        sim.execute_trade(TradeAction::Buy, "AAPL", 10_000_000_000, 1.0).unwrap();
        let mut quotes = QuoteMap::new();
        quotes.insert("AAPL".into(), Quote::now("AAPL", 1e19));
        assert!(matches!(
            sim.get_portfolio_value(&quotes),
            Err(TrackerError::InvalidSeries { ref symbol, .. }) if symbol == "AAPL"
        ));
        assert!(sim.final_value(&quotes).is_err());
    }

    #[test]
    fn apply_signals_skips_and_continues() {
        let mut sim = TradeSimulator::new(dec(200));
        let signals = [
            ("AAPL", event(TradeAction::Sell, 1, 100.0)),
            ("AAPL", event(TradeAction::Buy, 2, 150.0)),
            ("TSLA", event(TradeAction::Buy, 3, 100.0)),
            ("AAPL", event(TradeAction::Sell, 4, 160.0)),
        ];
        sim.apply_signals(1, signals.iter().map(|(s, e)| (*s, e)));

        assert_eq!(sim.trade_history().len(), 2);
        assert_eq!(sim.skipped_count(), 2);
        assert_eq!(sim.skipped_trades()[0].action, TradeAction::Sell);
        assert_eq!(sim.skipped_trades()[1].symbol, "TSLA");
        assert!(sim.skipped_trades()[1].reason.contains("insufficient capital"));
        assert_eq!(sim.cash(), dec(210));
    }

    #[test]
    fn history_preserves_invocation_order() {
        let mut sim = TradeSimulator::default();
        sim.execute_trade(TradeAction::Buy, "MSFT", 1, 400.0).unwrap();
        sim.execute_trade(TradeAction::Buy, "AAPL", 1, 150.0).unwrap();
        sim.execute_trade(TradeAction::Sell, "MSFT", 1, 410.0).unwrap();
        let symbols: Vec<_> = sim.trade_history().iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "AAPL", "MSFT"]);
    }

    #[test]
    fn portfolio_value_and_final_value() {
        let mut sim = TradeSimulator::new(dec(1_000));
        sim.execute_trade(TradeAction::Buy, "AAPL", 2, 100.0).unwrap();
        let mut quotes = QuoteMap::new();
        quotes.insert("AAPL".into(), Quote::now("AAPL", 120.0));

        assert_eq!(sim.get_portfolio_value(&quotes).unwrap(), dec(240));
        assert_eq!(sim.final_value(&quotes).unwrap(), dec(1_040));
    }

    #[test]
    fn portfolio_value_missing_quote() {
        let mut sim = TradeSimulator::new(dec(1_000));
        sim.execute_trade(TradeAction::Buy, "AAPL", 1, 100.0).unwrap();
        let err = sim.get_portfolio_value(&QuoteMap::new()).unwrap_err();
        assert!(matches!(err, TrackerError::MissingQuote { .. }));
        assert_eq!(sim.cash(), dec(900));
    }

    proptest! {
        #[test]
        fn round_trip_restores_cash(qty in 1u64..50, cents in 1i64..100_000) {
            let price = cents as f64 / 100.0;
            let mut sim = TradeSimulator::new(dec(1_000_000));
            let before = sim.cash();
            sim.execute_trade(TradeAction::Buy, "AAPL", qty, price).unwrap();
            sim.execute_trade(TradeAction::Sell, "AAPL", qty, price).unwrap();
            prop_assert_eq!(sim.cash(), before);
            prop_assert_eq!(sim.held("AAPL"), 0);
        }

        #[test]
        fn state_never_goes_negative(
            trades in proptest::collection::vec(
                (any::<bool>(), 0usize..3, 1u64..20, 1.0f64..500.0),
                0..60,
            )
        ) {
            let symbols = ["AAPL", "TSLA", "AMZN"];
            let mut sim = TradeSimulator::new(dec(5_000));
            for (buy, sym, qty, price) in trades {
                let action = if buy { TradeAction::Buy } else { TradeAction::Sell };
                let _ = sim.execute_trade(action, symbols[sym], qty, price);
                prop_assert!(sim.cash() >= Decimal::ZERO);
            }
            prop_assert!(sim.trade_history().iter().all(|t| t.cash_after >= Decimal::ZERO));
            for symbol in symbols {
                let net: i64 = sim
                    .trade_history()
                    .iter()
                    .filter(|t| t.symbol == symbol)
                    .map(|t| match t.action {
                        TradeAction::Buy => t.quantity as i64,
                        TradeAction::Sell => -(t.quantity as i64),
                    })
                    .sum();
                prop_assert_eq!(net, sim.held(symbol) as i64);
            }
        }
    }
}
