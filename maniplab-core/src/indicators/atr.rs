//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR here is a plain rolling mean of TR over `window` bars, sized to match
//! the stop/target distances it feeds. The first bar has no previous close,
//! so its TR is undefined and the rolling mean starts from TR[1]; ATR stays
//! NaN until a full window of defined TR values exists. Entries are skipped
//! while ATR is NaN.

use crate::domain::Bar;

/// Compute the True Range series from bars.
/// TR[0] = NaN (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            tr[i] = f64::NAN;
        } else {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

/// Rolling-mean ATR over `window` true ranges.
///
/// ATR[t] is defined once TR[t-window+1..=t] are all finite; otherwise NaN.
pub fn atr(bars: &[Bar], window: usize) -> Vec<f64> {
    assert!(window >= 1, "ATR window must be >= 1");

    let tr = true_range(bars);
    let n = tr.len();
    let mut out = vec![f64::NAN; n];

    for t in 0..n {
        if t + 1 < window + 1 {
            // Need `window` TRs ending at t, and TR[0] is never defined.
            continue;
        }
        let win = &tr[t + 1 - window..=t];
        if win.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[t] = win.iter().sum::<f64>() / window as f64;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Bar {
                symbol: "TEST".to_string(),
                timestamp: base + chrono::Duration::hours(4 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1_000.0,
                tick_count: 100,
                mean_spread: 0.01,
                realized_volatility: 0.002,
                log_return: f64::NAN,
            })
            .collect()
    }

    #[test]
    fn true_range_basic() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&bars);
        assert!(tr[0].is_nan());
        assert!((tr[1] - 8.0).abs() < 1e-12);
        assert!((tr[2] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn true_range_gap_up() {
        // Gap up: prev close 100, current bar 115-108 range.
        let bars = make_ohlc_bars(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, 15, 8) = 15
        ]);
        let tr = true_range(&bars);
        assert!((tr[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn atr_window_3() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),  // TR undefined
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6 (wait: max(6, 5, 1) = 6)
        ]);
        let result = atr(&bars, 3);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        // First full window is TR[1..=3] = [8, 9, 6].
        assert!((result[3] - 23.0 / 3.0).abs() < 1e-12);
        assert!((result[4] - 21.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn atr_nan_bar_breaks_window() {
        let mut bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
        ]);
        bars[2].high = f64::NAN;
        let result = atr(&bars, 2);
        // Windows containing TR[2] or TR[3] (prev close from a clean bar is
        // fine, but TR[2] itself is NaN) stay undefined.
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn atr_truncation_invariance() {
        let data: Vec<(f64, f64, f64, f64)> = (0..50)
            .map(|i| {
                let p = 100.0 + (i as f64 * 0.9).sin() * 4.0;
                (p, p + 2.0, p - 2.0, p + 0.5)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let full = atr(&bars, 10);
        let truncated = atr(&bars[..30], 10);
        for t in 0..30 {
            match (truncated[t].is_nan(), full[t].is_nan()) {
                (true, true) => {}
                (false, false) => assert!((truncated[t] - full[t]).abs() < 1e-12),
                _ => panic!("ATR definedness mismatch at bar {t}"),
            }
        }
    }
}
