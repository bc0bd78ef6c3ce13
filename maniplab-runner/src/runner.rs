//! Run orchestration — wires features, scoring, signals and simulation into
//! one result per instrument.
//!
//! Two entry points:
//! - `run_pipeline()`: one symbol's bars + config → `BacktestResult`.
//! - `run_many()`: independent (config, bars) pairs in parallel via rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use maniplab_core::domain::{validate_ordering, Bar, EquityCurve, TradeRecord};
use maniplab_core::engine::simulate;
use maniplab_core::features::compute_trend_features;
use maniplab_core::indicators::atr;
use maniplab_core::score::ManipScoreModel;
use maniplab_core::signals::{compute_thresholds, generate_signals, Thresholds};
use maniplab_core::CoreError;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::LoadError;
use crate::metrics::PerformanceSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("pipeline error for '{symbol}': {source}")]
    Pipeline {
        symbol: String,
        #[source]
        source: CoreError,
    },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub bar_count: usize,
    pub thresholds: Thresholds,
    pub signal_count: usize,
    pub trades: Vec<TradeRecord>,
    pub equity: EquityCurve,
    pub final_equity: f64,
    pub summary: PerformanceSummary,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run the full pipeline on pre-loaded bars. No I/O.
///
/// The model and quantile thresholds are fitted over the range selected by
/// `config.fit` (full history or a training prefix); features, scores and
/// signals are then computed over the whole series and simulated bar by bar.
pub fn run_pipeline(config: &RunConfig, bars: &[Bar]) -> Result<BacktestResult, RunError> {
    let symbol = config.symbol.as_str();
    let wrap = |source: CoreError| RunError::Pipeline {
        symbol: symbol.to_string(),
        source,
    };

    validate_ordering(bars).map_err(wrap)?;

    let train_len = config.fit.training_len(bars.len());

    let model = ManipScoreModel::fit(&bars[..train_len], config.timeframe, &config.score)
        .map_err(wrap)?;

    let features = compute_trend_features(bars, &config.trend);
    let scores = model.apply(bars, config.timeframe).map_err(wrap)?;

    let thresholds = compute_thresholds(
        &features[..train_len],
        &scores[..train_len],
        &config.signal,
    )
    .map_err(wrap)?;

    let signals = generate_signals(&features, &scores, thresholds, &config.signal);
    let atr_series = atr(bars, config.atr_window);
    let sim = simulate(bars, &signals, &atr_series, &config.sim);

    let summary =
        PerformanceSummary::compute(&sim.equity.values(), &sim.trades, config.timeframe);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        symbol: symbol.to_string(),
        bar_count: bars.len(),
        thresholds,
        signal_count: signals.exec_count(),
        trades: sim.trades,
        equity: sim.equity,
        final_equity: sim.final_equity,
        summary,
    })
}

/// Run many independent (config, bars) pairs in parallel.
///
/// Result order matches input order; one failed run does not abort the rest.
pub fn run_many(jobs: &[(RunConfig, Vec<Bar>)]) -> Vec<Result<BacktestResult, RunError>> {
    jobs.par_iter()
        .map(|(config, bars)| run_pipeline(config, bars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitPolicy;
    use crate::data_loader::synthetic_bars;
    use maniplab_core::domain::Timeframe;

    fn test_config(symbol: &str) -> RunConfig {
        RunConfig {
            symbol: symbol.to_string(),
            timeframe: Timeframe::H1,
            ..RunConfig::default()
        }
    }

    #[test]
    fn pipeline_runs_on_synthetic_bars() {
        let config = test_config("BTCUSD");
        let bars = synthetic_bars(&config.symbol, config.timeframe, 2_000);
        let result = run_pipeline(&config, &bars).unwrap();

        assert_eq!(result.bar_count, 2_000);
        assert_eq!(result.equity.len(), 2_000);
        assert!(result.signal_count > 0, "synthetic spikes should signal");
        assert!(!result.trades.is_empty());
        assert!(result.final_equity > 0.0);
        assert_eq!(result.summary.trade_count, result.trades.len());

        let replayed =
            EquityCurve::replay_trades(config.sim.initial_capital, &result.trades);
        assert!((result.final_equity - replayed).abs() < 1e-6);
    }

    #[test]
    fn pipeline_fails_cleanly_on_short_series() {
        let config = test_config("BTCUSD");
        let bars = synthetic_bars(&config.symbol, config.timeframe, 10);
        let err = run_pipeline(&config, &bars).unwrap_err();
        match err {
            RunError::Pipeline { symbol, source } => {
                assert_eq!(symbol, "BTCUSD");
                assert!(matches!(source, CoreError::InsufficientData { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn train_prefix_fit_is_honored() {
        let mut config = test_config("BTCUSD");
        config.fit = FitPolicy::TrainPrefix { bars: 800 };
        let bars = synthetic_bars(&config.symbol, config.timeframe, 2_000);

        let prefixed = run_pipeline(&config, &bars).unwrap();
        config.fit = FitPolicy::FullHistory;
        let full = run_pipeline(&config, &bars).unwrap();

        // Different fit ranges give different thresholds in general.
        assert_eq!(prefixed.bar_count, full.bar_count);
        assert!(
            prefixed.thresholds != full.thresholds
                || prefixed.signal_count == full.signal_count
        );
    }

    #[test]
    fn run_many_preserves_order_and_isolates_failures() {
        let good = test_config("BTCUSD");
        let good_bars = synthetic_bars(&good.symbol, good.timeframe, 1_500);
        let bad = test_config("ETHUSD");
        let bad_bars = synthetic_bars(&bad.symbol, bad.timeframe, 5);

        let results = run_many(&[(good.clone(), good_bars), (bad, bad_bars)]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[0].as_ref().unwrap().symbol, "BTCUSD");
    }
}
