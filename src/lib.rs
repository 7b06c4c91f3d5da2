//! Commission Engine Library
//! # Overview
//!
//! This library calculates the commission fee of every deposit and withdrawal in a
//! CSV file, with a sequential and a batched parallel processing strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Operation, TransactionRecord, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`config`] - YAML configuration and its validation
//! - [`rates`] - Exchange rate table, currency conversion, HTTP source and cache
//! - [`core`] - Business logic components:
//!   - [`core::math`] - Fixed-precision decimal arithmetic
//!   - [`core::calculator`] - The commission rules and their selector
//!   - [`core::engine`] - Per-operation calculation entry point
//!   - [`core::history_store`] - Transaction history for the weekly allowance
//! - [`io`] - CSV input and commission output
//! - [`strategy`] - Sequential and batched processing pipelines
//!
//! # Commission Rules
//!
//! - **Deposit**: 0.03% of the amount, any client type
//! - **Business withdraw**: 0.5% of the amount
//! - **Private withdraw**: 0.3% of the amount above the weekly free allowance
//!   (1000.00 EUR over the first 3 withdrawals of each ISO week)
//!
//! Percentages, the allowance and the currencies are configurable. Commissions are
//! rounded up to the currency's decimal places.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod rates;
pub mod strategy;
pub mod types;

pub use config::CalculatorConfig;
pub use core::{CommissionEngine, ConcurrentHistoryStore, MemoryHistoryStore};
pub use io::write_commissions;
pub use rates::{load_rate_table, CurrencyExchangeRateProvider, RateTable};
pub use types::{
    ClientId, ClientType, CommissionError, Operation, OperationType, SequencedOperation,
    TransactionRecord,
};
