//! Equity curve — one point per bar, compounded from closed trades.

use super::trade::TradeRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single (timestamp, equity) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

/// Ordered per-bar equity trajectory, owned by the simulation engine and
/// consumed read-only by the performance analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.points.push(EquityPoint { timestamp, equity });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.points.last().map(|p| p.equity)
    }

    /// Equity values only, for metric computations.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    /// Replay a trade ledger against `initial_capital` using the documented
    /// compounding rule: `equity *= 1 + pnl_pct` per closed trade.
    ///
    /// The result must match `final_equity()` to floating-point tolerance;
    /// any gap means the engine's bookkeeping diverged from the ledger.
    pub fn replay_trades(initial_capital: f64, trades: &[TradeRecord]) -> f64 {
        trades
            .iter()
            .fold(initial_capital, |eq, t| eq * (1.0 + t.pnl_pct))
    }
}
