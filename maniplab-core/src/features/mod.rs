//! Per-bar derived features.

pub mod trend;

pub use trend::{compute_trend_features, FeatureRow, TrendParams, VOL_EPSILON};
