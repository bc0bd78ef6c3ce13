//! Performance metrics — pure functions over the equity curve and trade ledger.
//!
//! Degenerate inputs recover locally with sentinels instead of failing the
//! run: zero-variance equity gives Sharpe 0, a lossless ledger gives profit
//! factor +inf, a winless one gives 0.

use maniplab_core::domain::{ExitReason, Timeframe, TradeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate performance summary for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub timeframe: Timeframe,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe: f64,
    /// Most negative peak-to-trough equity drop, as a fraction (<= 0).
    pub max_drawdown: f64,
    /// Longest stretch of bars spent below a prior equity peak.
    pub max_drawdown_duration_bars: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_pnl_pct: f64,
    pub avg_winner_pct: f64,
    pub avg_loser_pct: f64,
    pub trade_count: usize,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
}

impl PerformanceSummary {
    /// Compute all metrics from a per-bar equity curve and the trade ledger.
    pub fn compute(equity: &[f64], trades: &[TradeRecord], timeframe: Timeframe) -> Self {
        let (max_drawdown, max_drawdown_duration_bars) = drawdown_stats(equity);
        Self {
            timeframe,
            total_return: total_return(equity),
            annualized_return: annualized_return(equity, timeframe),
            annualized_volatility: annualized_volatility(equity, timeframe),
            sharpe: sharpe_ratio(equity, timeframe),
            max_drawdown,
            max_drawdown_duration_bars,
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            avg_pnl_pct: avg_pnl(trades),
            avg_winner_pct: avg_winner(trades),
            avg_loser_pct: avg_loser(trades),
            trade_count: trades.len(),
            exit_reasons: exit_reason_counts(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Per-bar simple returns from the equity curve.
fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&first), Some(&last)) if first > 0.0 && equity.len() >= 2 => (last - first) / first,
        _ => 0.0,
    }
}

/// Mean bar return scaled to a year of bars.
pub fn annualized_return(equity: &[f64], timeframe: Timeframe) -> f64 {
    let returns = bar_returns(equity);
    if returns.is_empty() {
        return 0.0;
    }
    mean(&returns) * timeframe.bars_per_year()
}

/// Std of bar returns scaled by sqrt(bars per year).
pub fn annualized_volatility(equity: &[f64], timeframe: Timeframe) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    std_dev(&returns) * timeframe.bars_per_year().sqrt()
}

/// Annualized Sharpe ratio from bar returns (zero risk-free rate).
///
/// Returns 0.0 on zero variance or fewer than 2 returns.
pub fn sharpe_ratio(equity: &[f64], timeframe: Timeframe) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let sd = std_dev(&returns);
    if sd < 1e-15 {
        return 0.0;
    }
    (mean(&returns) / sd) * timeframe.bars_per_year().sqrt()
}

/// Max drawdown (most negative, <= 0) and the longest run of bars spent
/// under a prior peak.
pub fn drawdown_stats(equity: &[f64]) -> (f64, usize) {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    let mut under_water = 0usize;
    let mut max_duration = 0usize;

    for &eq in equity {
        if eq >= peak {
            peak = eq;
            under_water = 0;
        } else {
            under_water += 1;
            max_duration = max_duration.max(under_water);
            if peak > 0.0 {
                max_dd = max_dd.min(eq / peak - 1.0);
            }
        }
    }
    (max_dd, max_duration)
}

/// Fraction of trades with positive net PnL. 0.0 with no trades.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross wins / gross losses.
///
/// Sentinels: +inf when there are wins but no losses, 0.0 when no wins.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    let gross_win: f64 = trades
        .iter()
        .filter(|t| t.pnl_pct > 0.0)
        .map(|t| t.pnl_pct)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_pct < 0.0)
        .map(|t| -t.pnl_pct)
        .sum();

    if gross_loss < 1e-15 {
        if gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_win / gross_loss
    }
}

pub fn avg_pnl(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.pnl_pct).sum::<f64>() / trades.len() as f64
}

pub fn avg_winner(trades: &[TradeRecord]) -> f64 {
    let winners: Vec<f64> = trades
        .iter()
        .filter(|t| t.pnl_pct > 0.0)
        .map(|t| t.pnl_pct)
        .collect();
    if winners.is_empty() {
        0.0
    } else {
        winners.iter().sum::<f64>() / winners.len() as f64
    }
}

pub fn avg_loser(trades: &[TradeRecord]) -> f64 {
    let losers: Vec<f64> = trades
        .iter()
        .filter(|t| t.pnl_pct < 0.0)
        .map(|t| t.pnl_pct)
        .collect();
    if losers.is_empty() {
        0.0
    } else {
        losers.iter().sum::<f64>() / losers.len() as f64
    }
}

/// Count of closed trades per exit reason. Reasons that never fired are
/// present with a zero count so exports have a stable shape.
pub fn exit_reason_counts(trades: &[TradeRecord]) -> BTreeMap<ExitReason, usize> {
    let mut counts: BTreeMap<ExitReason, usize> =
        ExitReason::ALL.iter().map(|&r| (r, 0)).collect();
    for trade in trades {
        *counts.entry(trade.exit_reason).or_insert(0) += 1;
    }
    counts
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
