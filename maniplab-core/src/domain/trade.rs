//! TradeRecord — a completed round-trip trade.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction, derived from the sign of the execution signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// Why a position was closed, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Initial ATR stop crossed.
    StopLoss,
    /// ATR take-profit crossed.
    TakeProfit,
    /// Tightened trailing stop crossed.
    Trail,
    /// Maximum holding period reached; exit at the bar's open.
    Time,
    /// Series ended with the position still open; exit at the last close.
    EndOfData,
}

impl ExitReason {
    pub const ALL: [ExitReason; 5] = [
        ExitReason::StopLoss,
        ExitReason::TakeProfit,
        ExitReason::Trail,
        ExitReason::Time,
        ExitReason::EndOfData,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::Trail => "TRAIL",
            ExitReason::Time => "TIME",
            ExitReason::EndOfData => "END_OF_DATA",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete round-trip trade record: entry → exit.
///
/// Mutable only inside the simulation engine while open; immutable once it
/// lands in the trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub direction: Direction,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    /// ATR at the entry bar; sizes the stop/target distances.
    pub entry_atr: f64,
    pub stop_loss_price: f64,
    /// +inf when the rule runs without a fixed target.
    pub take_profit_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub bars_held: usize,

    // ── PnL ──
    /// Signed return net of round-trip cost, as a fraction of entry price.
    pub pnl_pct: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl_pct > 0.0
    }
}
