//! Commission engine
//!
//! This module provides the `CommissionEngine`, the entry point for calculating the
//! commission of one operation. The engine owns the collaborators the calculators
//! borrow (configuration, exchange rates and a transaction history store) and
//! builds a [`CalculatorFactory`] over them per call.
//!
//! The engine is generic over the history store so the same code serves the
//! sequential strategy (`MemoryHistoryStore`) and the concurrent one
//! (`ConcurrentHistoryStore`).

use crate::core::calculator::CalculatorFactory;
use crate::core::traits::{ConfigProvider, ExchangeRateProvider, TransactionHistory};
use crate::types::{CommissionError, Operation};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug_span;

/// Commission calculation engine
///
/// Holds shared, read-only configuration and rates plus the history store that
/// private withdrawals are recorded in.
pub struct CommissionEngine<H: TransactionHistory> {
    config: Arc<dyn ConfigProvider>,
    exchange: Arc<dyn ExchangeRateProvider>,
    history: H,
}

impl<H: TransactionHistory> CommissionEngine<H> {
    /// Create a new CommissionEngine
    ///
    /// # Arguments
    ///
    /// * `config` - Validated calculator configuration
    /// * `exchange` - Exchange rate provider for the configured default currency
    /// * `history` - Store the private withdraw allowance is tracked in
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        exchange: Arc<dyn ExchangeRateProvider>,
        history: H,
    ) -> Self {
        CommissionEngine {
            config,
            exchange,
            history,
        }
    }

    /// Calculate the commission for a single operation
    ///
    /// Selects the calculator from the operation and client type and runs it.
    /// Private withdrawals are appended to the history store as a side effect.
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The commission, with as many fractional digits as the
    ///   operation currency has decimal places
    /// * `Err(CommissionError)` - If the calculation failed
    ///
    /// # Errors
    ///
    /// - `UnknownCurrency` if a conversion needs a rate that is not available
    /// - `InvalidAmount` if a converted amount is negative
    /// - `HistoryUnavailable` if the history store could not be read
    pub fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        let span = debug_span!(
            "calculate",
            client = %operation.client_id,
            operation = %operation.operation_type,
            client_type = %operation.client_type,
            date = %operation.date,
        );
        let _enter = span.enter();

        CalculatorFactory::new(&*self.config, &*self.exchange, &self.history).calculate(operation)
    }

    /// Access the history store
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Access the configuration
    pub fn config(&self) -> &dyn ConfigProvider {
        &*self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calculator::test_support::{config, exchange, operation};
    use crate::core::history_store::MemoryHistoryStore;
    use crate::core::r#async::ConcurrentHistoryStore;
    use crate::types::{ClientType, OperationType};
    use rstest::rstest;

    /// The sample operations file: (date, client, client type, operation, amount, currency)
    const SAMPLE: [(&str, &str, &str, &str, &str, &str); 13] = [
        ("2014-12-31", "4", "private", "withdraw", "1200.00", "EUR"),
        ("2015-01-01", "4", "private", "withdraw", "1000.00", "EUR"),
        ("2016-01-05", "4", "private", "withdraw", "1000.00", "EUR"),
        ("2016-01-05", "1", "private", "deposit", "200.00", "EUR"),
        ("2016-01-06", "2", "business", "withdraw", "300.00", "EUR"),
        ("2016-01-06", "1", "private", "withdraw", "30000", "JPY"),
        ("2016-01-07", "1", "private", "withdraw", "1000.00", "EUR"),
        ("2016-01-07", "1", "private", "withdraw", "100.00", "USD"),
        ("2016-01-10", "1", "private", "withdraw", "100.00", "EUR"),
        ("2016-01-10", "2", "business", "deposit", "10000.00", "EUR"),
        ("2016-01-10", "3", "private", "withdraw", "1000.00", "EUR"),
        ("2016-02-15", "1", "private", "withdraw", "300.00", "EUR"),
        ("2016-02-19", "5", "private", "withdraw", "3000000", "JPY"),
    ];

    const EXPECTED: [&str; 13] = [
        "0.60", "3.00", "0.00", "0.06", "1.50", "0", "0.70", "0.30", "0.30", "3.00", "0.00",
        "0.00", "8612",
    ];

    fn engine<H: TransactionHistory>(history: H) -> CommissionEngine<H> {
        let config = config();
        let exchange = exchange(config.clone());
        CommissionEngine::new(config, Arc::new(exchange), history)
    }

    fn run_sample<H: TransactionHistory>(engine: &CommissionEngine<H>) -> Vec<String> {
        SAMPLE
            .iter()
            .map(|(date, client, client_type, op_type, amount, currency)| {
                let op = operation(
                    client,
                    client_type.parse::<ClientType>().unwrap(),
                    op_type.parse::<OperationType>().unwrap(),
                    date,
                    amount,
                    currency,
                );
                engine.calculate(&op).unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_sample_file_with_memory_store() {
        let engine = engine(MemoryHistoryStore::new());
        assert_eq!(run_sample(&engine), EXPECTED);
    }

    #[test]
    fn test_sample_file_with_concurrent_store() {
        let engine = engine(ConcurrentHistoryStore::new());
        assert_eq!(run_sample(&engine), EXPECTED);
    }

    #[test]
    fn test_only_private_withdrawals_are_recorded() {
        let engine = engine(MemoryHistoryStore::new());
        run_sample(&engine);

        assert_eq!(engine.history().record_count("1"), 5);
        assert_eq!(engine.history().record_count("2"), 0);
        assert_eq!(engine.history().record_count("3"), 1);
        assert_eq!(engine.history().record_count("4"), 3);
        assert_eq!(engine.history().record_count("5"), 1);
    }

    #[rstest]
    #[case(OperationType::Deposit, ClientType::Private)]
    #[case(OperationType::Withdraw, ClientType::Private)]
    #[case(OperationType::Withdraw, ClientType::Business)]
    fn test_unknown_currency_fails_only_when_converting(
        #[case] operation_type: OperationType,
        #[case] client_type: ClientType,
    ) {
        let engine = engine(MemoryHistoryStore::new());
        let op = operation("9", client_type, operation_type, "2016-01-05", "100.00", "GBP");

        let result = engine.calculate(&op);
        match (operation_type, client_type) {
            (OperationType::Withdraw, ClientType::Private) => {
                assert_eq!(result, Err(CommissionError::unknown_currency("gbp")))
            }
            _ => assert!(result.is_ok()),
        }
    }

    #[test]
    fn test_config_accessor() {
        let engine = engine(MemoryHistoryStore::new());
        assert_eq!(engine.config().default_currency(), "eur");
    }
}
