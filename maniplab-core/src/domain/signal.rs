//! Raw and execution signal series.
//!
//! The causality contract lives here: `exec[t] == raw[t-1]` always, and the
//! only way to build a `SignalSeries` is through the shifting constructor.
//! Downstream code (the simulation engine) consumes `exec` exclusively.

use serde::{Deserialize, Serialize};

/// Per-bar directional signals for one instrument/timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSeries {
    /// Signal computed from bar t's own features, in {-1, 0, +1}.
    raw: Vec<i8>,
    /// `raw` delayed by exactly one bar; the tradeable signal.
    exec: Vec<i8>,
}

impl SignalSeries {
    /// Build the series from raw signals, deriving `exec` by the one-bar shift.
    ///
    /// `exec[0]` is defined as 0: there is no prior bar to act on.
    pub fn from_raw(raw: Vec<i8>) -> Self {
        debug_assert!(raw.iter().all(|s| (-1..=1).contains(s)));
        let mut exec = Vec::with_capacity(raw.len());
        if !raw.is_empty() {
            exec.push(0);
            exec.extend_from_slice(&raw[..raw.len() - 1]);
        }
        Self { raw, exec }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &[i8] {
        &self.raw
    }

    pub fn exec(&self) -> &[i8] {
        &self.exec
    }

    /// Number of non-zero execution signals.
    pub fn exec_count(&self) -> usize {
        self.exec.iter().filter(|&&s| s != 0).count()
    }
}
