//! Trade simulation engine.

pub mod config;
pub mod simulator;

pub use config::{ExitRuleConfig, SimConfig, TrailConfig};
pub use simulator::{simulate, SimResult};
