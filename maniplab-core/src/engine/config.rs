//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Trailing-stop behavior, active only when configured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Favorable excursion (in entry-ATR units) that arms the trail.
    pub trigger_atr_mult: f64,
    /// How far behind the best excursion the stop locks, in ATR units.
    pub lock_atr_mult: f64,
}

/// Exit rule: ATR-sized stop and target, optional trail, holding cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRuleConfig {
    /// Stop distance, in entry-ATR multiples.
    pub sl_atr_mult: f64,
    /// Target distance, in entry-ATR multiples. `None` means no fixed target.
    pub tp_atr_mult: Option<f64>,
    /// Force an exit after this many bars held.
    pub max_holding_bars: usize,
    pub trail: Option<TrailConfig>,
}

impl Default for ExitRuleConfig {
    fn default() -> Self {
        Self {
            sl_atr_mult: 2.0,
            tp_atr_mult: Some(3.0),
            max_holding_bars: 24,
            trail: None,
        }
    }
}

/// Full simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub exit: ExitRuleConfig,
    /// Round-trip cost as a fraction of entry price, deducted once per trade.
    pub cost_per_trade: f64,
    pub initial_capital: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            exit: ExitRuleConfig::default(),
            cost_per_trade: 0.0006,
            initial_capital: 10_000.0,
        }
    }
}
