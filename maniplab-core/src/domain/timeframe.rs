//! Bar timeframes and their annualization factors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported bar timeframes.
///
/// Every fitted scoring model and every performance summary is tagged with
/// the timeframe it was produced on; coefficients fitted on 5-minute bars are
/// never applied to 30-minute bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    /// Bars per calendar day (24h markets).
    pub fn bars_per_day(self) -> u32 {
        match self {
            Timeframe::M5 => 288,
            Timeframe::M15 => 96,
            Timeframe::M30 => 48,
            Timeframe::H1 => 24,
            Timeframe::H4 => 6,
            Timeframe::D1 => 1,
        }
    }

    /// Bars per year, used to annualize returns and volatility.
    pub fn bars_per_year(self) -> f64 {
        self.bars_per_day() as f64 * 365.0
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M5 => "5min",
            Timeframe::M15 => "15min",
            Timeframe::M30 => "30min",
            Timeframe::H1 => "60min",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        };
        f.write_str(s)
    }
}
