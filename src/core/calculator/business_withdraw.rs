//! Business withdraw commission: a flat percentage with no allowance.

use super::{percentage_commission, CommissionCalculator};
use crate::core::traits::ConfigProvider;
use crate::types::{ClientType, CommissionError, Operation};
use rust_decimal::Decimal;
use tracing::debug;

pub struct BusinessWithdrawCalculator<'a> {
    config: &'a dyn ConfigProvider,
}

impl<'a> BusinessWithdrawCalculator<'a> {
    pub fn new(config: &'a dyn ConfigProvider) -> Self {
        BusinessWithdrawCalculator { config }
    }
}

impl CommissionCalculator for BusinessWithdrawCalculator<'_> {
    fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        let decimal_places = self.config.decimal_places(&operation.currency);
        let percentage = self
            .config
            .withdraw_commission(ClientType::Business)
            .percentage;

        let commission = percentage_commission(operation.amount, percentage, decimal_places)?;
        debug!(
            client = %operation.client_id,
            amount = %operation.amount,
            %percentage,
            %commission,
            "business withdraw commission"
        );
        Ok(commission)
    }
}
