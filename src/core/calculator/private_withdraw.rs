//! Private withdraw commission
//!
//! Private clients get a weekly free allowance: the first `max_transactions`
//! withdrawals of an ISO week are free up to a combined `max_amount` in the default
//! currency. Only the part of a withdrawal above the remaining allowance is charged.
//!
//! # Algorithm
//!
//! 1. Select the weekly window: the most recent history records sharing the
//!    operation's ISO week and ISO year. The scan stops at the first record outside
//!    that week, which relies on the history being kept newest first.
//! 2. Compute the eligible free amount. It is zero when the window already holds
//!    `max_transactions` records or when its base-currency total has reached
//!    `max_amount`. Otherwise the remainder of `max_amount` is converted into the
//!    operation's currency.
//! 3. Charge the percentage on `amount - eligible`, clamped to `[0, amount]`.
//! 4. Record the withdrawal, converted to the default currency, at the front of the
//!    client's history.
//!
//! Steps 1 to 4 run inside [`TransactionHistory::append_with`], so a store that
//! serializes calls per client never grants the same allowance twice.

use super::{percentage_commission, CommissionCalculator};
use crate::core::math;
use crate::core::traits::{ConfigProvider, ExchangeRateProvider, TransactionHistory};
use crate::types::{ClientType, CommissionError, Operation, TransactionRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::{debug, error};

/// Records of the same ISO week as `date`, taken from the front of a newest-first
/// history
pub fn weekly_transactions(
    history: &[TransactionRecord],
    date: NaiveDate,
) -> impl Iterator<Item = &TransactionRecord> {
    let week = date.iso_week();
    history
        .iter()
        .take_while(move |record| record.date.iso_week() == week)
}

pub struct PrivateWithdrawCalculator<'a> {
    config: &'a dyn ConfigProvider,
    exchange: &'a dyn ExchangeRateProvider,
    history: &'a dyn TransactionHistory,
}

impl<'a> PrivateWithdrawCalculator<'a> {
    pub fn new(
        config: &'a dyn ConfigProvider,
        exchange: &'a dyn ExchangeRateProvider,
        history: &'a dyn TransactionHistory,
    ) -> Self {
        PrivateWithdrawCalculator {
            config,
            exchange,
            history,
        }
    }

    /// Free amount still available this week, in the operation's currency
    fn eligible_free_amount(
        &self,
        operation: &Operation,
        history: &[TransactionRecord],
    ) -> Result<Decimal, CommissionError> {
        let rule = self.config.withdraw_commission(ClientType::Private);
        let Some(allowance) = &rule.free_per_week else {
            return Ok(Decimal::ZERO);
        };

        let weekly: Vec<&TransactionRecord> =
            weekly_transactions(history, operation.date).collect();
        if weekly.len() >= allowance.max_transactions as usize {
            return Ok(Decimal::ZERO);
        }

        let base_places = self.config.decimal_places(self.config.default_currency());
        let base_precision = math::working_precision(base_places);

        let mut total = Decimal::ZERO;
        for record in &weekly {
            total = math::add(total, record.base_currency_amount, base_precision)?;
        }

        if math::compare(total, allowance.max_amount, base_precision)? != Ordering::Less {
            return Ok(Decimal::ZERO);
        }

        let remaining = math::subtract(allowance.max_amount, total, base_precision)?;
        self.exchange
            .convert_from_base_currency(remaining, &operation.currency)
    }

    /// Commission for the operation against a snapshot of the client's history
    fn commission(
        &self,
        operation: &Operation,
        history: &[TransactionRecord],
    ) -> Result<Decimal, CommissionError> {
        let decimal_places = self.config.decimal_places(&operation.currency);
        let precision = math::working_precision(decimal_places);
        let percentage = self
            .config
            .withdraw_commission(ClientType::Private)
            .percentage;

        let eligible = self.eligible_free_amount(operation, history)?;
        let applicable = if math::compare(eligible, Decimal::ZERO, precision)? != Ordering::Greater
        {
            operation.amount
        } else if math::compare(eligible, operation.amount, precision)? != Ordering::Less {
            Decimal::ZERO
        } else {
            math::subtract(operation.amount, eligible, precision)?
        };

        let commission = percentage_commission(applicable, percentage, decimal_places)?;
        debug!(
            client = %operation.client_id,
            amount = %operation.amount,
            %eligible,
            %applicable,
            %commission,
            "private withdraw commission"
        );
        Ok(commission)
    }
}

impl CommissionCalculator for PrivateWithdrawCalculator<'_> {
    fn calculate(&self, operation: &Operation) -> Result<Decimal, CommissionError> {
        let client = operation.client_id.as_str();
        let mut outcome: Option<Result<Decimal, CommissionError>> = None;

        let stored = self.history.append_with(client, &mut |history: &[TransactionRecord]| {
            let calculated = self.commission(operation, history).and_then(|commission| {
                let base_amount = self
                    .exchange
                    .convert_to_base_currency(operation.amount, &operation.currency)?;
                Ok((commission, base_amount))
            });

            match calculated {
                Ok((commission, base_amount)) => {
                    outcome = Some(Ok(commission));
                    Some(TransactionRecord::from_operation(
                        operation,
                        commission,
                        base_amount,
                    ))
                }
                Err(e) => {
                    outcome = Some(Err(e));
                    None
                }
            }
        });

        match (outcome, stored) {
            (Some(Ok(commission)), Err(e)) => {
                error!(
                    client,
                    date = %operation.date,
                    amount = %operation.amount,
                    currency = %operation.currency,
                    %commission,
                    error = %e,
                    "withdrawal not recorded in history, needs reconciliation"
                );
                Ok(commission)
            }
            (Some(result), _) => result,
            (None, Err(e)) => Err(e),
            (None, Ok(())) => Err(CommissionError::history_unavailable(
                client,
                "store returned without reading the history",
            )),
        }
    }
}
