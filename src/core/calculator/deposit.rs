//! Deposit commission
//!
//! A flat percentage of the deposited amount, looked up by client type. Reads
//! nothing but configuration and writes nothing.

use super::{percentage_commission, CommissionCalculator};
use crate::core::traits::ConfigProvider;
use crate::types::{CommissionError, Operation};
use rust_decimal::Decimal;
use tracing::debug;

pub struct DepositCalculator<'a> {
    config: &'a dyn ConfigProvider,
}

impl<'a> DepositCalculator<'a> {
    pub fn new(config: &'a dyn ConfigProvider) -> Self {
        DepositCalculator { config }
    }
}

impl CommissionCalculator for DepositCalculator<'_> {
    fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        let decimal_places = self.config.decimal_places(&operation.currency);
        let percentage = self.config.deposit_commission(operation.client_type);

        let commission = percentage_commission(operation.amount, percentage, decimal_places)?;
        debug!(
            client = %operation.client_id,
            amount = %operation.amount,
            %percentage,
            %commission,
            "deposit commission"
        );
        Ok(commission)
    }
}
