//! Bar loading for the runner.
//!
//! Reads the bar table from CSV (one row per bar, ascending timestamps),
//! validates ordering, and derives log returns. A deterministic synthetic
//! generator covers demo runs and tests when no real bar file is at hand;
//! synthetic bars are seeded from the symbol so the same symbol always
//! produces the same series.

use chrono::NaiveDateTime;
use maniplab_core::domain::{fill_log_returns, first_unordered_index, Bar, Timeframe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open bar file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("bad timestamp '{value}' at row {row}")]
    Timestamp { row: usize, value: String },

    #[error("timestamps not strictly ascending at row {index}")]
    NonMonotonic { index: usize },

    #[error("bar file '{path}' contains no rows")]
    Empty { path: String },
}

/// Wire format of one CSV row, matching the bar-table schema.
#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    tick_count: u64,
    mean_spread: f64,
    realized_volatility: f64,
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(value: &str, row: usize) -> Result<NaiveDateTime, LoadError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| LoadError::Timestamp {
            row,
            value: value.to_string(),
        })
}

/// Load bars from a CSV file, validate ordering, and fill log returns.
pub fn load_bars(path: &Path, symbol: &str) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars: Vec<Bar> = Vec::new();
    for (i, record) in reader.deserialize::<BarRow>().enumerate() {
        let row = record?;
        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp: parse_timestamp(&row.timestamp, i + 1)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            tick_count: row.tick_count,
            mean_spread: row.mean_spread,
            realized_volatility: row.realized_volatility,
            log_return: f64::NAN,
        });
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.display().to_string(),
        });
    }
    if let Some(index) = first_unordered_index(&bars) {
        return Err(LoadError::NonMonotonic { index });
    }

    fill_log_returns(&mut bars);
    Ok(bars)
}

/// Deterministic synthetic bars with microstructure fields and occasional
/// anomalous spike bars, for demo runs and offline tests.
///
/// The RNG is seeded from a blake3 hash of the symbol, so a given symbol
/// always yields the same series.
pub fn synthetic_bars(symbol: &str, timeframe: Timeframe, n: usize) -> Vec<Bar> {
    let hash = blake3::hash(symbol.as_bytes());
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&hash.as_bytes()[..8]);
    let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed_bytes));

    let bar_minutes = (24 * 60 / timeframe.bars_per_day()) as i64;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let mut price = 100.0 + rng.gen_range(0.0..400.0);
    let mut bars: Vec<Bar> = Vec::with_capacity(n);

    for i in 0..n {
        let is_spike = rng.gen_bool(0.01);
        let drift: f64 = rng.gen_range(-0.002..0.002);
        let change = if is_spike {
            // Anomalous bar: large move with ordinary microstructure.
            let magnitude = rng.gen_range(0.02..0.05);
            if rng.gen_bool(0.5) {
                magnitude
            } else {
                -magnitude
            }
        } else {
            drift
        };

        let open = price;
        price *= 1.0 + change;
        let close = price;
        let span = rng.gen_range(0.001..0.004);
        let high = open.max(close) * (1.0 + span);
        let low = open.min(close) * (1.0 - span);

        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp: base + chrono::Duration::minutes(bar_minutes * i as i64),
            open,
            high,
            low,
            close,
            volume: rng.gen_range(500.0..5_000.0),
            tick_count: rng.gen_range(50..500),
            mean_spread: rng.gen_range(0.005..0.03),
            realized_volatility: rng.gen_range(0.001..0.006),
            log_return: f64::NAN,
        });
    }

    fill_log_returns(&mut bars);
    bars
}
