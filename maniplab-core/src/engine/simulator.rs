//! Bar-by-bar trade simulator.
//!
//! Walks the bar sequence once, holding at most one position. Each bar with
//! an open position is checked in a fixed priority order: initial/trailing
//! stop, take-profit, trail tightening, then the holding-period cap. Only
//! after exit handling may a flat simulator act on the bar's execution
//! signal. Intrabar fills assume the worst ordering consistent with OHLC,
//! which is what the stop-before-target priority encodes.

use crate::domain::{Bar, Direction, EquityCurve, ExitReason, SignalSeries, TradeRecord};

use super::config::SimConfig;

/// Output of one simulation run.
#[derive(Debug, Clone)]
pub struct SimResult {
    pub trades: Vec<TradeRecord>,
    pub equity: EquityCurve,
    pub final_equity: f64,
}

struct OpenPosition {
    direction: Direction,
    entry_bar: usize,
    entry_price: f64,
    entry_atr: f64,
    stop: f64,
    /// Finite only when a fixed target is configured.
    take_profit: Option<f64>,
    bars_held: usize,
    /// Best favorable excursion seen so far, in entry-ATR units.
    best_excursion_atr: f64,
    trailing_active: bool,
}

enum ExitHit {
    None,
    Hit { price: f64, reason: ExitReason },
}

/// Simulate the execution signal against `bars`.
///
/// `signals` and `atr` must be index-aligned with `bars`. Entries are taken
/// at the bar open when the simulator is flat, the execution signal is
/// nonzero and ATR is defined at that bar. A position still open when the
/// series ends is closed at the final close.
pub fn simulate(
    bars: &[Bar],
    signals: &SignalSeries,
    atr: &[f64],
    config: &SimConfig,
) -> SimResult {
    debug_assert_eq!(bars.len(), signals.exec().len());
    debug_assert_eq!(bars.len(), atr.len());

    let n = bars.len();
    let mut equity = config.initial_capital;
    let mut curve = EquityCurve::with_capacity(n);
    let mut trades: Vec<TradeRecord> = Vec::new();
    let mut position: Option<OpenPosition> = None;

    for t in 0..n {
        let bar = &bars[t];

        let mut hit: Option<(f64, ExitReason)> = None;
        if let Some(pos) = position.as_mut() {
            pos.bars_held += 1;

            let mut exit = check_stop(pos, bar);
            if matches!(exit, ExitHit::None) {
                exit = check_take_profit(pos, bar);
            }
            if matches!(exit, ExitHit::None) {
                exit = update_trail(pos, bar, config);
            }
            if matches!(exit, ExitHit::None) && pos.bars_held >= config.exit.max_holding_bars {
                exit = ExitHit::Hit {
                    price: bar.open,
                    reason: ExitReason::Time,
                };
            }
            if matches!(exit, ExitHit::None) && t == n - 1 {
                exit = ExitHit::Hit {
                    price: bar.close,
                    reason: ExitReason::EndOfData,
                };
            }
            if let ExitHit::Hit { price, reason } = exit {
                hit = Some((price, reason));
            }
        }

        if let Some((price, reason)) = hit {
            if let Some(pos) = position.take() {
                let trade = close_position(pos, bars, t, price, reason, config);
                equity *= 1.0 + trade.pnl_pct;
                trades.push(trade);
            }
        }

        if position.is_none() {
            let signal = signals.exec()[t];
            if signal != 0 && atr[t].is_finite() && t < n - 1 {
                position = Some(open_position(bar, t, signal, atr[t], config));
            }
        }

        curve.push(bar.timestamp, equity);
    }

    SimResult {
        trades,
        equity: curve,
        final_equity: equity,
    }
}

fn open_position(bar: &Bar, t: usize, signal: i8, atr: f64, config: &SimConfig) -> OpenPosition {
    let direction = if signal > 0 {
        Direction::Long
    } else {
        Direction::Short
    };
    let entry = bar.open;
    let sign = direction.sign();
    OpenPosition {
        direction,
        entry_bar: t,
        entry_price: entry,
        entry_atr: atr,
        stop: entry - sign * config.exit.sl_atr_mult * atr,
        take_profit: config
            .exit
            .tp_atr_mult
            .map(|mult| entry + sign * mult * atr),
        bars_held: 0,
        best_excursion_atr: 0.0,
        trailing_active: false,
    }
}

fn check_stop(pos: &OpenPosition, bar: &Bar) -> ExitHit {
    let crossed = match pos.direction {
        Direction::Long => bar.low <= pos.stop,
        Direction::Short => bar.high >= pos.stop,
    };
    if crossed {
        ExitHit::Hit {
            price: pos.stop,
            reason: if pos.trailing_active {
                ExitReason::Trail
            } else {
                ExitReason::StopLoss
            },
        }
    } else {
        ExitHit::None
    }
}

fn check_take_profit(pos: &OpenPosition, bar: &Bar) -> ExitHit {
    let Some(tp) = pos.take_profit else {
        return ExitHit::None;
    };
    let crossed = match pos.direction {
        Direction::Long => bar.high >= tp,
        Direction::Short => bar.low <= tp,
    };
    if crossed {
        ExitHit::Hit {
            price: tp,
            reason: ExitReason::TakeProfit,
        }
    } else {
        ExitHit::None
    }
}

/// Update the favorable excursion, arm and ratchet the trailing stop, and
/// exit on the close if the tightened stop is already crossed.
fn update_trail(pos: &mut OpenPosition, bar: &Bar, config: &SimConfig) -> ExitHit {
    let Some(trail) = config.exit.trail else {
        return ExitHit::None;
    };

    let excursion = match pos.direction {
        Direction::Long => (bar.high - pos.entry_price) / pos.entry_atr,
        Direction::Short => (pos.entry_price - bar.low) / pos.entry_atr,
    };
    if excursion > pos.best_excursion_atr {
        pos.best_excursion_atr = excursion;
    }
    if pos.best_excursion_atr < trail.trigger_atr_mult {
        return ExitHit::None;
    }

    pos.trailing_active = true;
    let sign = pos.direction.sign();
    let candidate =
        pos.entry_price + sign * (pos.best_excursion_atr - trail.lock_atr_mult) * pos.entry_atr;
    // Ratchet only; the stop never loosens.
    pos.stop = match pos.direction {
        Direction::Long => pos.stop.max(candidate),
        Direction::Short => pos.stop.min(candidate),
    };

    // The tightened stop applies from this bar's close onward.
    let crossed = match pos.direction {
        Direction::Long => bar.close <= pos.stop,
        Direction::Short => bar.close >= pos.stop,
    };
    if crossed {
        ExitHit::Hit {
            price: pos.stop,
            reason: ExitReason::Trail,
        }
    } else {
        ExitHit::None
    }
}

fn close_position(
    pos: OpenPosition,
    bars: &[Bar],
    exit_bar: usize,
    exit_price: f64,
    reason: ExitReason,
    config: &SimConfig,
) -> TradeRecord {
    let gross = pos.direction.sign() * (exit_price - pos.entry_price) / pos.entry_price;
    TradeRecord {
        symbol: bars[pos.entry_bar].symbol.clone(),
        direction: pos.direction,
        entry_bar: pos.entry_bar,
        entry_time: bars[pos.entry_bar].timestamp,
        entry_price: pos.entry_price,
        entry_atr: pos.entry_atr,
        stop_loss_price: pos.stop,
        take_profit_price: pos.take_profit.unwrap_or(f64::INFINITY),
        exit_bar,
        exit_time: bars[exit_bar].timestamp,
        exit_price,
        exit_reason: reason,
        bars_held: pos.bars_held,
        pnl_pct: gross - config.cost_per_trade,
    }
}
