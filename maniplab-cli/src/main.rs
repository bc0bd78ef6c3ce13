//! ManipLab CLI — run the anomaly-signal pipeline from the command line.
//!
//! Commands:
//! - `run` — execute the pipeline from a TOML config on CSV or synthetic bars
//! - `validate` — parse a config, validate it, and print its run id

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use maniplab_runner::{
    export_result, load_bars, run_pipeline, synthetic_bars, BacktestResult, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "maniplab",
    about = "ManipLab CLI — anomaly-driven signal backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the pipeline from a TOML config file.
    Run {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Path to a CSV bar file matching the documented schema.
        #[arg(long)]
        bars: Option<PathBuf>,

        /// Generate deterministic synthetic bars instead of reading a file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Number of synthetic bars to generate.
        #[arg(long, default_value_t = 5_000)]
        synthetic_bars: usize,

        /// Output directory for artifacts (trades.csv, equity.csv, summary.json).
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Parse and validate a config, printing its run id without running.
    Validate {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            bars,
            synthetic,
            synthetic_bars,
            output_dir,
        } => run_cmd(config, bars, synthetic, synthetic_bars, output_dir),
        Commands::Validate { config } => validate_cmd(config),
    }
}

fn run_cmd(
    config_path: PathBuf,
    bars_path: Option<PathBuf>,
    synthetic: bool,
    synthetic_len: usize,
    output_dir: PathBuf,
) -> Result<()> {
    if bars_path.is_some() && synthetic {
        bail!("--bars and --synthetic are mutually exclusive");
    }

    let config = RunConfig::load(&config_path)
        .with_context(|| format!("loading config '{}'", config_path.display()))?;

    let bars = match bars_path {
        Some(path) => load_bars(&path, &config.symbol)
            .with_context(|| format!("loading bars '{}'", path.display()))?,
        None if synthetic => synthetic_bars(&config.symbol, config.timeframe, synthetic_len),
        None => bail!("one of --bars or --synthetic is required"),
    };

    let result = run_pipeline(&config, &bars)?;
    print_summary(&result);

    let artifacts = export_result(&output_dir, &result)?;
    println!("Artifacts saved to: {}", artifacts.dir.display());

    Ok(())
}

fn validate_cmd(config_path: PathBuf) -> Result<()> {
    let config = RunConfig::load(&config_path)
        .with_context(|| format!("loading config '{}'", config_path.display()))?;

    println!("Config OK");
    println!("  symbol:     {}", config.symbol);
    println!("  timeframe:  {}", config.timeframe);
    println!("  run id:     {}", config.run_id());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    println!("── {} ({} bars) ──", result.symbol, result.bar_count);
    println!("  run id:           {}", result.run_id);
    println!("  signals executed: {}", result.signal_count);
    println!("  trades:           {}", s.trade_count);
    println!("  total return:     {:+.2}%", s.total_return * 100.0);
    println!("  annualized:       {:+.2}%", s.annualized_return * 100.0);
    println!("  sharpe:           {:.2}", s.sharpe);
    println!("  max drawdown:     {:.2}%", s.max_drawdown * 100.0);
    println!("  win rate:         {:.1}%", s.win_rate * 100.0);
    println!("  profit factor:    {:.2}", s.profit_factor);
    println!("  final equity:     {:.2}", result.final_equity);
    print!("  exits:            ");
    let parts: Vec<String> = s
        .exit_reasons
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(reason, count)| format!("{reason}={count}"))
        .collect();
    println!("{}", parts.join(" "));
}
