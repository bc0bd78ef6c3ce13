//! Look-ahead contamination tests for every pipeline stage.
//!
//! Invariant: no value at bar t may depend on bar t+1 or later. With the
//! model and thresholds fitted on a fixed training prefix, every derived
//! series must be identical at bars 0..100 whether computed over 100 or
//! 200 bars.

use chrono::NaiveDate;
use maniplab_core::domain::{fill_log_returns, Bar, Timeframe};
use maniplab_core::features::{compute_trend_features, TrendParams};
use maniplab_core::indicators::atr;
use maniplab_core::score::{ManipScoreModel, ScoreParams};
use maniplab_core::signals::{compute_thresholds, generate_signals, SignalParams};

/// Deterministic synthetic bars with microstructure fields populated.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut price = 100.0_f64;
    let mut bars: Vec<Bar> = (0..n)
        .map(|i| {
            // Deterministic pseudo-random walk using a simple LCG
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.0004;
            price *= 1.0 + change;
            Bar {
                symbol: "TEST".to_string(),
                timestamp: base + chrono::Duration::minutes(5 * i as i64),
                open: price * 0.999,
                high: price * 1.002,
                low: price * 0.997,
                close: price,
                volume: 1_000.0 + (seed % 500) as f64,
                tick_count: 100 + (seed % 50),
                mean_spread: 0.01 + (seed % 7) as f64 * 0.001,
                realized_volatility: 0.002 + (seed % 11) as f64 * 0.0001,
                log_return: f64::NAN,
            }
        })
        .collect();
    fill_log_returns(&mut bars);
    bars
}

fn assert_prefix_equal(name: &str, truncated: &[f64], full: &[f64]) {
    for (i, (t, f)) in truncated.iter().zip(full.iter()).enumerate() {
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            !t.is_nan() && !f.is_nan(),
            "{name}: NaN mismatch at bar {i} (truncated={t}, full={f})"
        );
        assert!(
            (t - f).abs() < 1e-10,
            "{name}: look-ahead contamination at bar {i}: truncated={t}, full={f}"
        );
    }
}

#[test]
fn lookahead_trend_features() {
    let bars = make_test_bars(200);
    let params = TrendParams::default();
    let full = compute_trend_features(&bars, &params);
    let truncated = compute_trend_features(&bars[..100], &params);

    let ts_full: Vec<f64> = full.iter().map(|r| r.trend_strength).collect();
    let ts_trunc: Vec<f64> = truncated.iter().map(|r| r.trend_strength).collect();
    assert_prefix_equal("trend_strength", &ts_trunc, &ts_full);

    let rp_full: Vec<f64> = full.iter().map(|r| r.past_return_sum).collect();
    let rp_trunc: Vec<f64> = truncated.iter().map(|r| r.past_return_sum).collect();
    assert_prefix_equal("past_return_sum", &rp_trunc, &rp_full);
}

#[test]
fn lookahead_atr() {
    let bars = make_test_bars(200);
    let full = atr(&bars, 14);
    let truncated = atr(&bars[..100], 14);
    assert_prefix_equal("atr", &truncated, &full);
}

#[test]
fn lookahead_scores_with_fixed_model() {
    let bars = make_test_bars(200);
    let model = ManipScoreModel::fit(&bars[..100], Timeframe::M5, &ScoreParams::default())
        .expect("fit on 100 bars");

    let full = model.apply(&bars, Timeframe::M5).unwrap();
    let truncated = model.apply(&bars[..100], Timeframe::M5).unwrap();
    assert_prefix_equal("manip_score", &truncated, &full);
}

#[test]
fn lookahead_signals_with_fixed_thresholds() {
    let bars = make_test_bars(200);
    let trend_params = TrendParams::default();
    let signal_params = SignalParams {
        q_trend: 0.8,
        q_score: 0.8,
        ..SignalParams::default()
    };

    let model = ManipScoreModel::fit(&bars[..100], Timeframe::M5, &ScoreParams::default())
        .expect("fit on 100 bars");

    let features_full = compute_trend_features(&bars, &trend_params);
    let scores_full = model.apply(&bars, Timeframe::M5).unwrap();
    let thresholds = compute_thresholds(
        &features_full[..100],
        &scores_full[..100],
        &signal_params,
    )
    .expect("thresholds on training prefix");

    let signals_full = generate_signals(&features_full, &scores_full, thresholds, &signal_params);

    let features_trunc = compute_trend_features(&bars[..100], &trend_params);
    let scores_trunc = model.apply(&bars[..100], Timeframe::M5).unwrap();
    let signals_trunc =
        generate_signals(&features_trunc, &scores_trunc, thresholds, &signal_params);

    assert_eq!(&signals_full.raw()[..100], signals_trunc.raw());
    assert_eq!(&signals_full.exec()[..100], signals_trunc.exec());
}

#[test]
fn exec_signal_is_always_the_shifted_raw_signal() {
    let bars = make_test_bars(300);
    let trend_params = TrendParams::default();
    let signal_params = SignalParams {
        q_trend: 0.7,
        q_score: 0.7,
        ..SignalParams::default()
    };

    let model =
        ManipScoreModel::fit(&bars, Timeframe::M5, &ScoreParams::default()).expect("fit");
    let features = compute_trend_features(&bars, &trend_params);
    let scores = model.apply(&bars, Timeframe::M5).unwrap();
    let thresholds = compute_thresholds(&features, &scores, &signal_params).expect("thresholds");
    let signals = generate_signals(&features, &scores, thresholds, &signal_params);

    assert_eq!(signals.exec()[0], 0);
    for t in 1..signals.raw().len() {
        assert_eq!(signals.exec()[t], signals.raw()[t - 1], "shift broken at bar {t}");
    }
}
