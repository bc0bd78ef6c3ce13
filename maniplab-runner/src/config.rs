//! Serializable run configuration.
//!
//! A `RunConfig` captures every parameter needed to reproduce a run; its
//! blake3 content hash is the run id, so two identical configs always map
//! to the same artifacts.

use maniplab_core::domain::Timeframe;
use maniplab_core::engine::SimConfig;
use maniplab_core::features::TrendParams;
use maniplab_core::score::ScoreParams;
use maniplab_core::signals::SignalParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from config loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which bar range the model and thresholds are fitted on.
///
/// Fitting on the full history makes thresholds globally informed (fine for
/// research on a closed dataset); a training prefix keeps the fitted
/// statistics strictly causal for out-of-sample evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FitPolicy {
    FullHistory,
    TrainPrefix { bars: usize },
}

impl FitPolicy {
    /// Number of leading bars the fit may see, for a series of `n` bars.
    pub fn training_len(self, n: usize) -> usize {
        match self {
            FitPolicy::FullHistory => n,
            FitPolicy::TrainPrefix { bars } => bars.min(n),
        }
    }
}

impl Default for FitPolicy {
    fn default() -> Self {
        FitPolicy::FullHistory
    }
}

/// Complete configuration for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// ATR lookback for stop/target sizing.
    #[serde(default = "default_atr_window")]
    pub atr_window: usize,
    #[serde(default)]
    pub trend: TrendParams,
    #[serde(default)]
    pub score: ScoreParams,
    #[serde(default)]
    pub signal: SignalParams,
    #[serde(default)]
    pub fit: FitPolicy,
    #[serde(default)]
    pub sim: SimConfig,
}

fn default_atr_window() -> usize {
    14
}

impl RunConfig {
    /// Deterministic content hash of this configuration.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.atr_window < 1 {
            return Err(ConfigError::Invalid("atr_window must be >= 1".into()));
        }
        if self.trend.l_past < 1 {
            return Err(ConfigError::Invalid("trend.l_past must be >= 1".into()));
        }
        if self.trend.vol_window < 2 {
            return Err(ConfigError::Invalid("trend.vol_window must be >= 2".into()));
        }
        for (name, q) in [
            ("signal.q_trend", self.signal.q_trend),
            ("signal.q_score", self.signal.q_score),
        ] {
            if !(0.0..1.0).contains(&q) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in [0, 1), got {q}"
                )));
            }
        }
        if self.sim.exit.sl_atr_mult <= 0.0 {
            return Err(ConfigError::Invalid("sim.exit.sl_atr_mult must be > 0".into()));
        }
        if let Some(tp) = self.sim.exit.tp_atr_mult {
            if tp <= 0.0 {
                return Err(ConfigError::Invalid("sim.exit.tp_atr_mult must be > 0".into()));
            }
        }
        if self.sim.exit.max_holding_bars < 1 {
            return Err(ConfigError::Invalid(
                "sim.exit.max_holding_bars must be >= 1".into(),
            ));
        }
        if let Some(trail) = self.sim.exit.trail {
            if trail.trigger_atr_mult <= 0.0 || trail.lock_atr_mult < 0.0 {
                return Err(ConfigError::Invalid(
                    "sim.exit.trail multipliers must be positive".into(),
                ));
            }
        }
        if self.sim.cost_per_trade < 0.0 {
            return Err(ConfigError::Invalid("sim.cost_per_trade must be >= 0".into()));
        }
        if self.sim.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid("sim.initial_capital must be > 0".into()));
        }
        if let FitPolicy::TrainPrefix { bars } = self.fit {
            if bars < self.score.min_rows {
                return Err(ConfigError::Invalid(format!(
                    "fit.bars ({bars}) is below the model's minimum row count ({})",
                    self.score.min_rows
                )));
            }
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSD".to_string(),
            timeframe: Timeframe::H1,
            atr_window: default_atr_window(),
            trend: TrendParams::default(),
            score: ScoreParams::default(),
            signal: SignalParams::default(),
            fit: FitPolicy::default(),
            sim: SimConfig::default(),
        }
    }
}
