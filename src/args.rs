use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::filter::DEFAULT_SKIP_FRACTION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuantileImplArg {
    Brute,
    Tdigest,
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("invalid fraction '{}'", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("fraction must be within 0.0..=1.0, got {}", value));
    }
    Ok(value)
}

#[derive(Parser, Debug)]
#[command(
    about = "Compute metrics from CBDC benchmark timestamp logs. \
             Always computes throughput, other metrics are optional."
)]
pub struct Args {
    /// Timestamp log files, or directories scanned for *.log files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Compute batching statistics
    #[arg(short = 'b', long = "batching")]
    pub batching: bool,

    /// Compute latency breakdown
    #[arg(short = 'l', long = "latency")]
    pub latency: bool,

    /// Fraction of earliest/latest-started transactions to trim
    #[arg(long = "skip-fraction", value_parser = parse_fraction,
          default_value_t = DEFAULT_SKIP_FRACTION)]
    pub skip_fraction: f64,

    /// Quantile backend for summary statistics
    #[arg(long = "quantile-impl", value_enum, default_value_t = QuantileImplArg::Brute)]
    pub quantile_impl: QuantileImplArg,
}
