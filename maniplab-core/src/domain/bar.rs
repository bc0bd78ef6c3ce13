//! Bar — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar plus microstructure features for a single symbol/timeframe.
///
/// Bars arrive from the external aggregation layer sorted ascending by
/// timestamp with no duplicates. `log_return` is derived (NaN on the first
/// bar of a series) via [`fill_log_returns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    // ── Microstructure ──
    /// Number of ticks aggregated into this bar.
    pub tick_count: u64,
    /// Mean bid-ask spread over the bar.
    pub mean_spread: f64,
    /// Realized volatility of intrabar tick returns.
    pub realized_volatility: f64,

    // ── Derived ──
    /// ln(close[t] / close[t-1]); NaN for the first bar.
    pub log_return: f64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, range contains open/close, prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Fill `log_return` in place from consecutive closes.
///
/// The first bar (and any bar following a non-positive or NaN close) gets NaN.
pub fn fill_log_returns(bars: &mut [Bar]) {
    for i in 0..bars.len() {
        bars[i].log_return = if i == 0 {
            f64::NAN
        } else {
            let prev = bars[i - 1].close;
            let cur = bars[i].close;
            if prev > 0.0 && cur > 0.0 {
                (cur / prev).ln()
            } else {
                f64::NAN
            }
        };
    }
}

/// Check that timestamps are strictly increasing.
///
/// Returns the index of the first offending bar, or None if the sequence is
/// properly ordered.
pub fn first_unordered_index(bars: &[Bar]) -> Option<usize> {
    bars.windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
        .map(|i| i + 1)
}

/// Validate strict timestamp ordering, for callers handed pre-built bars.
pub fn validate_ordering(bars: &[Bar]) -> Result<(), crate::error::CoreError> {
    match first_unordered_index(bars) {
        Some(index) => Err(crate::error::CoreError::NonMonotonicTimestamps { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            symbol: "BTCUSD".into(),
            timestamp: ts(0),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
            tick_count: 420,
            mean_spread: 0.02,
            realized_volatility: 0.004,
            log_return: f64::NAN,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn log_returns_filled() {
        let mut bars = vec![sample_bar(), sample_bar(), sample_bar()];
        bars[1].timestamp = ts(5);
        bars[1].close = 104.0;
        bars[2].timestamp = ts(10);
        bars[2].close = 102.0;
        fill_log_returns(&mut bars);

        assert!(bars[0].log_return.is_nan());
        assert!((bars[1].log_return - (104.0_f64 / 103.0).ln()).abs() < 1e-12);
        assert!((bars[2].log_return - (102.0_f64 / 104.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn unordered_timestamps_detected() {
        let mut bars = vec![sample_bar(), sample_bar(), sample_bar()];
        bars[1].timestamp = ts(5);
        bars[2].timestamp = ts(5); // duplicate
        assert_eq!(first_unordered_index(&bars), Some(2));

        bars[2].timestamp = ts(10);
        assert_eq!(first_unordered_index(&bars), None);
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar.symbol, deser.symbol);
        assert_eq!(bar.timestamp, deser.timestamp);
        assert_eq!(bar.tick_count, deser.tick_count);
        assert_eq!(bar.close, deser.close);
    }
}
