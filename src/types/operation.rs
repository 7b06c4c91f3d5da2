//! Operation types for the commission engine
//!
//! An `Operation` is the immutable input to every commission calculation:
//! one deposit or withdrawal made by one client on one date.

use super::error::CommissionError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Client identifier
///
/// Opaque to the engine; only compared for equality.
pub type ClientId = String;

/// Client categories with distinct commission rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    /// Natural person; withdrawals get a weekly free allowance
    Private,

    /// Legal entity; flat withdraw percentage
    Business,
}

/// Operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Funds paid into the account
    Deposit,

    /// Funds paid out of the account
    Withdraw,
}

impl ClientType {
    /// Every client type, in configuration order
    pub const ALL: [ClientType; 2] = [ClientType::Private, ClientType::Business];

    /// Lower-case name used in input files and configuration keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Private => "private",
            ClientType::Business => "business",
        }
    }
}

impl OperationType {
    /// Lower-case name used in input files
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
        }
    }
}

impl FromStr for ClientType {
    type Err = CommissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(ClientType::Private),
            "business" => Ok(ClientType::Business),
            _ => Err(CommissionError::unsupported_operation("client type", s)),
        }
    }
}

impl FromStr for OperationType {
    type Err = CommissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(OperationType::Deposit),
            "withdraw" => Ok(OperationType::Withdraw),
            _ => Err(CommissionError::unsupported_operation("operation type", s)),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client operation
///
/// The amount is a non-negative magnitude in `currency`, kept at the precision it
/// was provided with. The currency code is always lower case.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// The client performing the operation
    pub client_id: ClientId,

    /// Category of the client
    pub client_type: ClientType,

    /// Deposit or withdraw
    pub operation_type: OperationType,

    /// Calendar date; only its ISO week matters to the engine
    pub date: NaiveDate,

    /// Amount in `currency`
    pub amount: Decimal,

    /// Lower-case currency code
    pub currency: String,
}

impl Operation {
    /// Create an operation, normalizing the currency code to lower case
    pub fn new(
        client_id: impl Into<ClientId>,
        client_type: ClientType,
        operation_type: OperationType,
        date: NaiveDate,
        amount: Decimal,
        currency: &str,
    ) -> Self {
        Operation {
            client_id: client_id.into(),
            client_type,
            operation_type,
            date,
            amount,
            currency: currency.trim().to_lowercase(),
        }
    }
}

/// An operation tagged with the input line it was read from
///
/// The line number orders results when operations are processed out of order.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedOperation {
    /// 1-based line number in the input file
    pub line: u64,

    /// The parsed operation
    pub operation: Operation,
}
