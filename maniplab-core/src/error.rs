//! Error taxonomy for the core pipeline.
//!
//! Fatal conditions (too little usable data, model/timeframe mismatch,
//! malformed input ordering) surface as `CoreError` and abort the run.
//! Locally recoverable conditions — warm-up rows, zero-variance statistics —
//! are handled in place (NaN rows are skipped; degenerate ratios return
//! sentinels) and never reach this enum.

use crate::domain::Timeframe;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Fewer usable rows than a component's minimum after dropping
    /// undefined (warm-up/NaN) rows.
    #[error("{component}: insufficient data ({rows} usable rows, need {required})")]
    InsufficientData {
        component: &'static str,
        rows: usize,
        required: usize,
    },

    /// A scoring model fitted on one timeframe was applied to another.
    #[error("scoring model fitted on {model} applied to {bars} bars; re-fit per timeframe")]
    TimeframeMismatch { model: Timeframe, bars: Timeframe },

    /// Bar timestamps must be strictly increasing.
    #[error("bar timestamps not strictly increasing at index {index}")]
    NonMonotonicTimestamps { index: usize },
}
