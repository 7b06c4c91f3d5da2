//! Collaborator interfaces consumed by the calculators
//!
//! The calculators only see configuration, exchange rates and transaction history
//! through these traits, so tests and alternative deployments can swap the
//! implementations without touching the commission rules.

use crate::types::{ClientType, CommissionError, TransactionRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Weekly free allowance for private withdrawals
#[derive(Debug, Clone, PartialEq)]
pub struct FreeAllowance {
    /// Amount free of commission per week, in the default currency
    pub max_amount: Decimal,

    /// Number of withdrawals per week that can use the allowance
    pub max_transactions: u32,
}

/// Withdraw commission rule for one client type
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawCommission {
    /// Commission percentage (0.3 means 0.3%)
    pub percentage: Decimal,

    /// Weekly free allowance, if the client type has one
    pub free_per_week: Option<FreeAllowance>,
}

/// Read-only, already validated calculator configuration
pub trait ConfigProvider: Send + Sync {
    /// Base currency all allowance accounting is normalized to
    fn default_currency(&self) -> &str;

    /// Decimal places for a currency, falling back to the default currency's
    fn decimal_places(&self, currency: &str) -> u32;

    /// Deposit commission percentage for a client type
    fn deposit_commission(&self, client_type: ClientType) -> Decimal;

    /// Withdraw commission rule for a client type
    fn withdraw_commission(&self, client_type: ClientType) -> &WithdrawCommission;
}

/// Currency conversion against the default currency
pub trait ExchangeRateProvider: Send + Sync {
    /// Rate table: currency code to units per one unit of the base currency
    fn rates(&self) -> &HashMap<String, Decimal>;

    /// Convert `amount` of `currency` into the default currency
    fn convert_to_base_currency(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, CommissionError>;

    /// Convert `amount` of the default currency into `currency`
    fn convert_from_base_currency(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal, CommissionError>;
}

/// Per-client transaction history, most recent first
///
/// Implementations must keep each client's records in non-increasing date order;
/// the weekly allowance scan stops at the first record outside the current week.
pub trait TransactionHistory: Send + Sync {
    /// The client's records, most recent first
    fn history(&self, client_id: &str) -> Result<Vec<TransactionRecord>, CommissionError>;

    /// Put a record at the front of the client's history
    fn append(&self, client_id: &str, record: TransactionRecord) -> Result<(), CommissionError>;

    /// Read the client's history and append the record `f` returns, if any
    ///
    /// Stores that can guarantee it override this so no other call for the same
    /// client runs between the read and the append. This default composes
    /// `history` and `append` and offers no such guarantee.
    fn append_with(
        &self,
        client_id: &str,
        f: &mut dyn FnMut(&[TransactionRecord]) -> Option<TransactionRecord>,
    ) -> Result<(), CommissionError> {
        let history = self.history(client_id)?;
        match f(&history) {
            Some(record) => self.append(client_id, record),
            None => Ok(()),
        }
    }
}
