//! Trend/extremity features: rolling past return, rolling volatility, and
//! the normalized trend-strength statistic.
//!
//! A row is defined only once both rolling windows are fully populated with
//! finite log returns; earlier rows are NaN-coded and excluded downstream.
//! Pure function of the bar window — no state, no side effects.

use crate::domain::Bar;
use crate::stats::sample_std;
use serde::{Deserialize, Serialize};

/// Floor added to rolling volatility so a collapsed window cannot divide by zero.
pub const VOL_EPSILON: f64 = 1e-8;

/// Windows for the trend feature computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    /// Lookback (bars) for the cumulative past return.
    pub l_past: usize,
    /// Window (bars) for rolling volatility of log returns.
    pub vol_window: usize,
}

impl TrendParams {
    /// Bars consumed before the first defined row can appear.
    pub fn warmup_bars(&self) -> usize {
        self.l_past.max(self.vol_window)
    }
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            l_past: 5,
            vol_window: 20,
        }
    }
}

/// Derived per-bar trend attributes. All fields NaN while undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Sum of log returns over the last `l_past` bars (inclusive).
    pub past_return_sum: f64,
    /// Rolling sample standard deviation of log returns over `vol_window` bars.
    pub volatility: f64,
    /// `past_return_sum / (volatility + ε)`.
    pub trend_strength: f64,
    pub abs_trend_strength: f64,
}

impl FeatureRow {
    pub const UNDEFINED: FeatureRow = FeatureRow {
        past_return_sum: f64::NAN,
        volatility: f64::NAN,
        trend_strength: f64::NAN,
        abs_trend_strength: f64::NAN,
    };

    /// True once both rolling windows were fully populated at this bar.
    pub fn is_defined(&self) -> bool {
        self.trend_strength.is_finite()
    }
}

/// Compute one `FeatureRow` per bar.
///
/// A row at index t is defined only if every log return in both the
/// `l_past` and `vol_window` trailing windows (ending at t) is finite.
/// Since `log_return[0]` is NaN, the first defined row appears at index
/// `max(l_past, vol_window)` at the earliest.
pub fn compute_trend_features(bars: &[Bar], params: &TrendParams) -> Vec<FeatureRow> {
    assert!(params.l_past >= 1, "l_past must be >= 1");
    assert!(params.vol_window >= 2, "vol_window must be >= 2");

    let n = bars.len();
    let mut rows = vec![FeatureRow::UNDEFINED; n];
    let widest = params.warmup_bars();

    for t in 0..n {
        if t + 1 < widest + 1 {
            // Not enough bars behind t for both windows (index 0 has no return).
            continue;
        }

        let ret_window = &bars[t + 1 - params.l_past..=t];
        let vol_window = &bars[t + 1 - params.vol_window..=t];

        if ret_window.iter().any(|b| !b.log_return.is_finite())
            || vol_window.iter().any(|b| !b.log_return.is_finite())
        {
            continue;
        }

        let past_return_sum: f64 = ret_window.iter().map(|b| b.log_return).sum();
        let returns: Vec<f64> = vol_window.iter().map(|b| b.log_return).collect();
        let volatility = sample_std(&returns);
        let trend_strength = past_return_sum / (volatility + VOL_EPSILON);

        rows[t] = FeatureRow {
            past_return_sum,
            volatility,
            trend_strength,
            abs_trend_strength: trend_strength.abs(),
        };
    }

    rows
}
