//! Signal generation: extreme-trend and high-anomaly flags combined into a
//! directional raw signal, then delayed one bar into the execution signal.
//!
//! Thresholds are quantiles over the defined feature/score history for the
//! run, computed once and held immutable — they are passed in explicitly
//! rather than recomputed per bar, and the range they are computed over is
//! the caller's policy (full history or a training prefix).

use crate::domain::SignalSeries;
use crate::error::CoreError;
use crate::features::FeatureRow;
use crate::stats::quantile;
use serde::{Deserialize, Serialize};

/// How extreme-trend bars map to trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// Long on any extreme move (up or down) with a high anomaly score.
    Asymmetric,
    /// Fade the move: short extreme ups, long extreme downs.
    Reversal,
}

/// Signal generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalParams {
    /// Quantile of |trend strength| marking a trend as extreme.
    pub q_trend: f64,
    /// Quantile of the anomaly score marking a bar as anomalous.
    pub q_score: f64,
    pub policy: SignalPolicy,
    /// Optional absolute floor on |past return| (e.g. 0.003 = 0.3% minimum move).
    pub min_abs_past_return: Option<f64>,
    /// Optional absolute floor on the anomaly-score threshold.
    pub min_score: Option<f64>,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            q_trend: 0.9,
            q_score: 0.9,
            policy: SignalPolicy::Asymmetric,
            min_abs_past_return: None,
            min_score: None,
        }
    }
}

/// Quantile thresholds derived from one run's history, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub trend: f64,
    pub score: f64,
}

/// Compute the trend and score thresholds over defined rows.
///
/// `features` and `scores` must be index-aligned with the same bar range.
/// Fails with `InsufficientData` if either series has no defined values
/// (e.g. the bar sequence never outgrew its warm-up windows).
pub fn compute_thresholds(
    features: &[FeatureRow],
    scores: &[f64],
    params: &SignalParams,
) -> Result<Thresholds, CoreError> {
    let abs_ts: Vec<f64> = features
        .iter()
        .filter(|r| r.is_defined())
        .map(|r| r.abs_trend_strength)
        .collect();
    let trend = quantile(&abs_ts, params.q_trend).ok_or(CoreError::InsufficientData {
        component: "trend_threshold",
        rows: abs_ts.len(),
        required: 1,
    })?;

    let defined_scores: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    let mut score =
        quantile(&defined_scores, params.q_score).ok_or(CoreError::InsufficientData {
            component: "score_threshold",
            rows: defined_scores.len(),
            required: 1,
        })?;
    if let Some(floor) = params.min_score {
        score = score.max(floor);
    }

    Ok(Thresholds { trend, score })
}

/// Generate the raw/exec signal series for one bar range.
///
/// A bar emits a raw signal only when its feature row and score are both
/// defined; undefined bars stay flat rather than borrowing neighboring data.
/// The returned series derives `exec` by the one-bar shift — the only
/// causality mechanism in the pipeline.
pub fn generate_signals(
    features: &[FeatureRow],
    scores: &[f64],
    thresholds: Thresholds,
    params: &SignalParams,
) -> SignalSeries {
    debug_assert_eq!(features.len(), scores.len());

    let raw: Vec<i8> = features
        .iter()
        .zip(scores.iter())
        .map(|(row, &score)| {
            if !row.is_defined() || !score.is_finite() {
                return 0;
            }
            if let Some(min_move) = params.min_abs_past_return {
                if row.past_return_sum.abs() < min_move {
                    return 0;
                }
            }

            let extreme_up = row.trend_strength > thresholds.trend;
            let extreme_down = row.trend_strength < -thresholds.trend;
            let high_anomaly = score > thresholds.score;
            if !high_anomaly {
                return 0;
            }

            match params.policy {
                SignalPolicy::Asymmetric => {
                    if extreme_up || extreme_down {
                        1
                    } else {
                        0
                    }
                }
                SignalPolicy::Reversal => {
                    if extreme_up {
                        -1
                    } else if extreme_down {
                        1
                    } else {
                        0
                    }
                }
            }
        })
        .collect();

    SignalSeries::from_raw(raw)
}
