//! Commission Engine CLI
//!
//! Command-line interface for calculating commission fees from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > commissions.txt
//! cargo run -- --config fees.yaml operations.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv
//! cargo run -- -v operations.csv
//! ```
//!
//! The program loads the configuration, resolves the exchange rates, then reads the
//! operations from the input file and prints one commission per line to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, invalid configuration, rates unavailable, etc.)

use commission_engine::cli;
use commission_engine::config::CalculatorConfig;
use commission_engine::logging::init_logging;
use commission_engine::rates::{load_rate_table, RateTable};
use commission_engine::strategy::{self, ProcessingContext};
use commission_engine::types::CommissionError;
use std::io::{self, BufWriter};
use std::process;
use std::sync::Arc;
use tracing::error;

fn load_config(args: &cli::CliArgs) -> Result<CalculatorConfig, CommissionError> {
    match &args.config {
        Some(path) => CalculatorConfig::load_from_path(path),
        None => Ok(CalculatorConfig::default()),
    }
}

/// Resolve the rate table before any operation is processed
fn load_rates(config: &CalculatorConfig) -> Result<RateTable, CommissionError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CommissionError::IoError {
            message: format!("Failed to create tokio runtime: {}", e),
        })?;

    runtime.block_on(load_rate_table(config.exchange_rates()))
}

fn run(args: cli::CliArgs) -> Result<(), CommissionError> {
    let config = load_config(&args)?;
    let rates = load_rates(&config)?;
    let context = ProcessingContext::new(Arc::new(config), rates);

    let batch_config = match args.strategy {
        cli::StrategyType::Async => Some(args.to_batch_config()),
        cli::StrategyType::Sync => None,
    };
    let strategy = strategy::create_strategy(args.strategy, batch_config, context);

    let mut output = BufWriter::new(io::stdout().lock());
    strategy.process(&args.input_file, &mut output)
}

fn main() {
    let args = cli::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        error!(error = %e, "fatal error");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
