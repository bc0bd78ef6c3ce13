//! Anomaly scoring (ManipScore).
//!
//! Fits a baseline regression of "normal" |log return| on microstructure
//! features (plus one- and two-bar-lagged |log return|), then scores each bar
//! as the z-score of its residual against the fitted residual distribution.
//! A high score means the bar moved far more than its microstructure context
//! explains.
//!
//! One model per timeframe. The target is the current bar's |log return|
//! and every regressor is the current bar's own field or a past lag, so a
//! score at bar t can never see bar t+1.

pub mod regression;

use crate::domain::{Bar, Timeframe};
use crate::error::CoreError;
use crate::stats::{mean, population_std};
use regression::{ols_fit, OlsCoefficients, Standardizer};
use serde::{Deserialize, Serialize};

/// Floor added to the residual std when standardizing scores.
pub const SCORE_EPSILON: f64 = 1e-8;

/// Regressor columns available to the scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    TickCount,
    MeanSpread,
    RealizedVolatility,
    Volume,
    /// |log_return[t-1]|
    AbsRetLag1,
    /// |log_return[t-2]|
    AbsRetLag2,
}

impl FeatureColumn {
    /// Extract this column's value at bar `t`. NaN when undefined (lags at
    /// the start of the series, or NaN source fields).
    fn value(self, bars: &[Bar], t: usize) -> f64 {
        match self {
            FeatureColumn::TickCount => bars[t].tick_count as f64,
            FeatureColumn::MeanSpread => bars[t].mean_spread,
            FeatureColumn::RealizedVolatility => bars[t].realized_volatility,
            FeatureColumn::Volume => bars[t].volume,
            FeatureColumn::AbsRetLag1 => lagged_abs_return(bars, t, 1),
            FeatureColumn::AbsRetLag2 => lagged_abs_return(bars, t, 2),
        }
    }
}

fn lagged_abs_return(bars: &[Bar], t: usize, lag: usize) -> f64 {
    if t < lag {
        f64::NAN
    } else {
        bars[t - lag].log_return.abs()
    }
}

/// Fit parameters for the scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreParams {
    pub feature_columns: Vec<FeatureColumn>,
    /// Minimum usable rows after dropping undefined ones.
    pub min_rows: usize,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            feature_columns: vec![
                FeatureColumn::TickCount,
                FeatureColumn::MeanSpread,
                FeatureColumn::RealizedVolatility,
                FeatureColumn::Volume,
                FeatureColumn::AbsRetLag1,
                FeatureColumn::AbsRetLag2,
            ],
            min_rows: 30,
        }
    }
}

/// Fitted scoring model for one timeframe.
///
/// Immutable after fitting; re-fit to change anything. Applying it is a pure
/// function of the model and the bar window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManipScoreModel {
    timeframe: Timeframe,
    feature_columns: Vec<FeatureColumn>,
    standardizer: Standardizer,
    coefficients: OlsCoefficients,
    residual_mean: f64,
    residual_std: f64,
}

impl ManipScoreModel {
    /// Fit the baseline model over `bars` (the training range).
    ///
    /// Rows where the target or any regressor is undefined are dropped; if
    /// fewer than `params.min_rows` remain the fit fails with
    /// [`CoreError::InsufficientData`].
    pub fn fit(
        bars: &[Bar],
        timeframe: Timeframe,
        params: &ScoreParams,
    ) -> Result<Self, CoreError> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut targets: Vec<f64> = Vec::new();

        for t in 0..bars.len() {
            let target = bars[t].log_return.abs();
            if !target.is_finite() {
                continue;
            }
            let row: Vec<f64> = params
                .feature_columns
                .iter()
                .map(|c| c.value(bars, t))
                .collect();
            if row.iter().any(|v| !v.is_finite()) {
                continue;
            }
            rows.push(row);
            targets.push(target);
        }

        if rows.len() < params.min_rows {
            return Err(CoreError::InsufficientData {
                component: "manip_score_model",
                rows: rows.len(),
                required: params.min_rows,
            });
        }

        let standardizer = Standardizer::fit(&rows, params.feature_columns.len());
        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| standardizer.transform_row(r)).collect();
        let coefficients = ols_fit(&scaled, &targets);

        let residuals: Vec<f64> = scaled
            .iter()
            .zip(targets.iter())
            .map(|(row, &y)| y - coefficients.predict(row))
            .collect();

        Ok(Self {
            timeframe,
            feature_columns: params.feature_columns.clone(),
            standardizer,
            coefficients,
            residual_mean: mean(&residuals),
            residual_std: population_std(&residuals),
        })
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn feature_columns(&self) -> &[FeatureColumn] {
        &self.feature_columns
    }

    pub fn residual_mean(&self) -> f64 {
        self.residual_mean
    }

    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    /// Score every bar: `(residual - residual_mean) / (residual_std + ε)`.
    ///
    /// Bars with an undefined target or regressor get NaN. Errors if the
    /// bars' timeframe does not match the one the model was fitted on.
    pub fn apply(&self, bars: &[Bar], timeframe: Timeframe) -> Result<Vec<f64>, CoreError> {
        if timeframe != self.timeframe {
            return Err(CoreError::TimeframeMismatch {
                model: self.timeframe,
                bars: timeframe,
            });
        }

        let mut scores = vec![f64::NAN; bars.len()];
        for t in 0..bars.len() {
            let target = bars[t].log_return.abs();
            if !target.is_finite() {
                continue;
            }
            let row: Vec<f64> = self
                .feature_columns
                .iter()
                .map(|c| c.value(bars, t))
                .collect();
            if row.iter().any(|v| !v.is_finite()) {
                continue;
            }
            let scaled = self.standardizer.transform_row(&row);
            let residual = target - self.coefficients.predict(&scaled);
            scores[t] = (residual - self.residual_mean) / (self.residual_std + SCORE_EPSILON);
        }
        Ok(scores)
    }
}
