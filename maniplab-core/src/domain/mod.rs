//! Domain types: bars, timeframes, signals, trades, equity.

pub mod bar;
pub mod equity;
pub mod signal;
pub mod timeframe;
pub mod trade;

pub use bar::{fill_log_returns, first_unordered_index, validate_ordering, Bar};
pub use equity::{EquityCurve, EquityPoint};
pub use signal::SignalSeries;
pub use timeframe::Timeframe;
pub use trade::{Direction, ExitReason, TradeRecord};
