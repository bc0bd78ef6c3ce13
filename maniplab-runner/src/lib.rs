//! ManipLab Runner — run orchestration on top of `maniplab-core`.
//!
//! This crate provides:
//! - TOML run configuration with a content-addressed run id
//! - CSV bar loading and a deterministic synthetic bar generator
//! - The single-run pipeline and a rayon-parallel multi-run driver
//! - Performance metrics and CSV/JSON artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{ConfigError, FitPolicy, RunConfig, RunId};
pub use data_loader::{load_bars, synthetic_bars, LoadError};
pub use export::{export_result, ExportError, ExportedArtifacts};
pub use metrics::PerformanceSummary;
pub use runner::{run_many, run_pipeline, BacktestResult, RunError, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
