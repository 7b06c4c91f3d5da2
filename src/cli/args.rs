use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Calculate commission fees for deposits and withdrawals
#[derive(Parser, Debug)]
#[command(name = "commission-engine")]
#[command(about = "Calculate commission fees for deposits and withdrawals", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operations
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// YAML configuration file
    #[arg(
        long = "config",
        short = 'c',
        value_name = "PATH",
        help = "YAML configuration file (default: built-in settings)"
    )]
    pub config: Option<PathBuf>,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for sequential or 'async' for batched parallel processing"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads processing a batch (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", help = "Log debug output to stderr (RUST_LOG overrides)")]
    pub verbose: bool,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced with a
    /// warning by [`BatchConfig::new`].
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }
}
