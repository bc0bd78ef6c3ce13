//! ManipLab Core — anomaly scoring, trend features, signals, trade simulation.
//!
//! The pipeline stages, in data-flow order:
//! - Domain types (bars, timeframes, signals, trades, equity)
//! - Trend/extremity features over trailing windows
//! - Anomaly scoring: residual z-scores from a microstructure baseline model
//! - Quantile-thresholded signal generation with a one-bar execution delay
//! - Bar-by-bar trade simulator with ATR stops, targets, trail and time exits
//!
//! Every stage at bar `t` reads only bars `<= t`; the execution delay in
//! [`domain::SignalSeries`] is the single causality boundary between deciding
//! and trading.

pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod indicators;
pub mod score;
pub mod signals;
pub mod stats;

pub use error::CoreError;
