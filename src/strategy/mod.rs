//! Processing strategy module for commission calculation
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! encompassing both CSV parsing and commission calculation. This allows different
//! processing implementations (synchronous, asynchronous batch) to be selected at runtime.
//!
//! Both strategies share a [`ProcessingContext`]: the validated configuration and
//! the exchange rate table, resolved once before any operation is read.

use crate::cli::StrategyType;
use crate::config::CalculatorConfig;
use crate::core::traits::{ConfigProvider, TransactionHistory};
use crate::core::CommissionEngine;
use crate::rates::{CurrencyExchangeRateProvider, RateTable};
use crate::types::CommissionError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete commission pipelines
///
/// Each strategy reads operations from a CSV file, calculates their commissions and
/// writes one commission per successfully processed row, in input order.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write commissions to output
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - Output cannot be written
    /// - The async runtime cannot be created
    ///
    /// Malformed rows and failed calculations are logged and skipped; they do not
    /// cause this method to return an error.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CommissionError>;
}

/// Configuration and exchange rates shared by every engine a strategy builds
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    config: Arc<CalculatorConfig>,
    rates: RateTable,
}

impl ProcessingContext {
    pub fn new(config: Arc<CalculatorConfig>, rates: RateTable) -> Self {
        Self { config, rates }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Build an engine over `history` with this context's configuration and rates
    pub fn engine<H: TransactionHistory>(&self, history: H) -> CommissionEngine<H> {
        let config: Arc<dyn ConfigProvider> = self.config.clone();
        let exchange = CurrencyExchangeRateProvider::new(Arc::clone(&config), self.rates.clone());
        CommissionEngine::new(config, Arc::new(exchange), history)
    }
}

/// Running totals reported when a strategy finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Rows whose commission was written
    pub processed: u64,
    /// Rows that could not be read or calculated
    pub skipped: u64,
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
/// * `context` - Configuration and rates the strategy's engine is built from
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    context: ProcessingContext,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(context)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, context))
        }
    }
}
