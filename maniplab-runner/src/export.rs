//! Artifact export: trades.csv, equity.csv and summary.json per run.
//!
//! Artifacts land in `<output_dir>/<run_id>/` so runs with identical configs
//! overwrite their own directory instead of piling up duplicates.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runner::BacktestResult;

/// Errors from artifact export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create output directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error writing '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("json error writing '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat CSV row for one equity point.
#[derive(Debug, Serialize)]
struct EquityRow {
    timestamp: String,
    equity: f64,
}

/// Paths of the written artifacts.
#[derive(Debug, Clone)]
pub struct ExportedArtifacts {
    pub dir: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Write all artifacts for one result under `output_dir/<run_id>/`.
pub fn export_result(
    output_dir: &Path,
    result: &BacktestResult,
) -> Result<ExportedArtifacts, ExportError> {
    let dir = output_dir.join(&result.run_id);
    fs::create_dir_all(&dir).map_err(|source| ExportError::CreateDir {
        path: dir.display().to_string(),
        source,
    })?;

    let trades_csv = dir.join("trades.csv");
    write_trades_csv(&trades_csv, result)?;

    let equity_csv = dir.join("equity.csv");
    write_equity_csv(&equity_csv, result)?;

    let summary_json = dir.join("summary.json");
    write_summary_json(&summary_json, result)?;

    Ok(ExportedArtifacts {
        dir,
        trades_csv,
        equity_csv,
        summary_json,
    })
}

fn write_trades_csv(path: &Path, result: &BacktestResult) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| ExportError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    for trade in &result.trades {
        writer.serialize(trade).map_err(|source| ExportError::Csv {
            path: path.display().to_string(),
            source,
        })?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

fn write_equity_csv(path: &Path, result: &BacktestResult) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| ExportError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    for point in result.equity.points() {
        let row = EquityRow {
            timestamp: point.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            equity: point.equity,
        };
        writer.serialize(row).map_err(|source| ExportError::Csv {
            path: path.display().to_string(),
            source,
        })?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// The summary artifact carries the whole result minus the per-bar equity
/// curve (that lives in equity.csv).
#[derive(Debug, Serialize)]
struct SummaryArtifact<'a> {
    schema_version: u32,
    run_id: &'a str,
    symbol: &'a str,
    bar_count: usize,
    signal_count: usize,
    thresholds: &'a maniplab_core::signals::Thresholds,
    final_equity: f64,
    summary: &'a crate::metrics::PerformanceSummary,
}

fn write_summary_json(path: &Path, result: &BacktestResult) -> Result<(), ExportError> {
    let artifact = SummaryArtifact {
        schema_version: result.schema_version,
        run_id: &result.run_id,
        symbol: &result.symbol,
        bar_count: result.bar_count,
        signal_count: result.signal_count,
        thresholds: &result.thresholds,
        final_equity: result.final_equity,
        summary: &result.summary,
    };
    let file = fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer_pretty(file, &artifact).map_err(|source| ExportError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}
