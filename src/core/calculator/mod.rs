//! Commission calculators
//!
//! Three rule sets exist and the set is closed:
//!
//! | Operation | Client   | Calculator                  |
//! |-----------|----------|-----------------------------|
//! | deposit   | any      | [`DepositCalculator`]       |
//! | withdraw  | business | [`BusinessWithdrawCalculator`] |
//! | withdraw  | private  | [`PrivateWithdrawCalculator`]  |
//!
//! [`CalculatorFactory::create`] is the pure mapping from `(operation type, client type)`
//! to one of them. All variants share [`percentage_commission`] for the final
//! `amount × percentage / 100` step and its rounding.

pub mod business_withdraw;
pub mod deposit;
pub mod private_withdraw;

pub use business_withdraw::BusinessWithdrawCalculator;
pub use deposit::DepositCalculator;
pub use private_withdraw::PrivateWithdrawCalculator;

use crate::core::math;
use crate::core::traits::{ConfigProvider, ExchangeRateProvider, TransactionHistory};
use crate::types::{ClientType, CommissionError, Operation, OperationType};
use rust_decimal::Decimal;

/// A commission rule
pub trait CommissionCalculator {
    /// Commission for the operation, in the operation's currency, carrying exactly
    /// as many fractional digits as the currency has decimal places
    fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError>;
}

/// Compute `round_up(amount × percentage / 100, decimal_places)`
///
/// The multiply and divide steps run at `decimal_places + 1` so one guard digit
/// survives until the final rounding.
pub fn percentage_commission(
    amount: Decimal,
    percentage: Decimal,
    decimal_places: u32,
) -> Result<Decimal, CommissionError> {
    let precision = math::working_precision(decimal_places);
    let product = math::multiply(amount, percentage, precision)?;
    let commission = math::divide(product, Decimal::ONE_HUNDRED, precision)?;
    math::round_up(commission, decimal_places as i32)
}

/// One of the three commission rules, bound to its collaborators
pub enum Calculator<'a> {
    Deposit(DepositCalculator<'a>),
    BusinessWithdraw(BusinessWithdrawCalculator<'a>),
    PrivateWithdraw(PrivateWithdrawCalculator<'a>),
}

impl CommissionCalculator for Calculator<'_> {
    fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        match self {
            Calculator::Deposit(calculator) => calculator.calculate(operation),
            Calculator::BusinessWithdraw(calculator) => calculator.calculate(operation),
            Calculator::PrivateWithdraw(calculator) => calculator.calculate(operation),
        }
    }
}

/// Selects the calculator for an operation
///
/// Holds borrowed collaborators only, so creating a factory per operation is free.
#[derive(Clone, Copy)]
pub struct CalculatorFactory<'a> {
    config: &'a dyn ConfigProvider,
    exchange: &'a dyn ExchangeRateProvider,
    history: &'a dyn TransactionHistory,
}

impl<'a> CalculatorFactory<'a> {
    pub fn new(
        config: &'a dyn ConfigProvider,
        exchange: &'a dyn ExchangeRateProvider,
        history: &'a dyn TransactionHistory,
    ) -> Self {
        CalculatorFactory {
            config,
            exchange,
            history,
        }
    }

    /// Map an operation type and client type to its calculator
    ///
    /// Both enums are closed, so every combination has a calculator; unknown raw
    /// values are rejected with `UnsupportedOperation` when they are parsed.
    pub fn create(&self, operation_type: OperationType, client_type: ClientType) -> Calculator<'a> {
        match (operation_type, client_type) {
            (OperationType::Deposit, _) => Calculator::Deposit(DepositCalculator::new(self.config)),
            (OperationType::Withdraw, ClientType::Business) => {
                Calculator::BusinessWithdraw(BusinessWithdrawCalculator::new(self.config))
            }
            (OperationType::Withdraw, ClientType::Private) => {
                Calculator::PrivateWithdraw(PrivateWithdrawCalculator::new(
                    self.config,
                    self.exchange,
                    self.history,
                ))
            }
        }
    }

    /// Select the calculator for `operation` and run it
    pub fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        self.create(operation.operation_type, operation.client_type)
            .calculate(operation)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for calculator tests

    use crate::config::CalculatorConfig;
    use crate::rates::{CurrencyExchangeRateProvider, RateTable};
    use crate::types::{ClientType, Operation, OperationType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    /// Standard configuration: eur default, jpy without decimals, 0.03% deposits,
    /// 0.3% private withdrawals with 1000.00 eur / 3 withdrawals free per week,
    /// 0.5% business withdrawals
    pub fn config() -> Arc<CalculatorConfig> {
        Arc::new(CalculatorConfig::default())
    }

    pub fn exchange(config: Arc<CalculatorConfig>) -> CurrencyExchangeRateProvider {
        let rates = RateTable::from_pairs([
            ("eur", Decimal::ONE),
            ("usd", Decimal::from_str("1.1497").unwrap()),
            ("jpy", Decimal::from_str("129.53").unwrap()),
        ]);
        CurrencyExchangeRateProvider::new(config, rates)
    }

    pub fn operation(
        client: &str,
        client_type: ClientType,
        operation_type: OperationType,
        date: &str,
        amount: &str,
        currency: &str,
    ) -> Operation {
        Operation::new(
            client,
            client_type,
            operation_type,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            Decimal::from_str(amount).unwrap(),
            currency,
        )
    }
}
