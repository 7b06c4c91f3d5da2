//! Core business logic module
//!
//! This module contains the commission calculation components:
//! - `math` - Fixed-precision decimal arithmetic
//! - `traits` - Collaborator interfaces (configuration, exchange rates, history)
//! - `calculator` - The three commission rules and their selector
//! - `history_store` - In-memory transaction history
//! - `engine` - Per-operation calculation entry point
//! - `async` - Concurrent history store and batch processing

pub mod r#async;
pub mod calculator;
pub mod engine;
pub mod history_store;
pub mod math;
pub mod traits;

pub use calculator::{Calculator, CalculatorFactory, CommissionCalculator};
pub use engine::CommissionEngine;
pub use history_store::MemoryHistoryStore;
pub use r#async::{BatchProcessor, ConcurrentHistoryStore};
pub use traits::{
    ConfigProvider, ExchangeRateProvider, FreeAllowance, TransactionHistory, WithdrawCommission,
};
