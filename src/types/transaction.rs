//! Transaction history records
//!
//! A `TransactionRecord` is written once per private withdrawal, after its commission
//! is computed, and is what later calculations read back to account for the weekly
//! free allowance.

use super::operation::{ClientId, ClientType, Operation, OperationType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Persisted history entry
///
/// Never mutated after creation. `base_currency_amount` is the operation amount
/// converted to the default currency at the time of recording, so weekly totals
/// can be summed across currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The client that performed the operation
    pub client_id: ClientId,

    /// Category of the client
    pub client_type: ClientType,

    /// Operation kind (only withdrawals are recorded today)
    pub operation_type: OperationType,

    /// Operation date
    pub date: NaiveDate,

    /// Original amount in `currency`
    pub amount: Decimal,

    /// Lower-case currency code of `amount`
    pub currency: String,

    /// Commission charged, in `currency`
    pub commission: Decimal,

    /// `amount` converted to the default currency
    pub base_currency_amount: Decimal,
}

impl TransactionRecord {
    /// Build a record from the operation it describes
    pub fn from_operation(
        operation: &Operation,
        commission: Decimal,
        base_currency_amount: Decimal,
    ) -> Self {
        TransactionRecord {
            client_id: operation.client_id.clone(),
            client_type: operation.client_type,
            operation_type: operation.operation_type,
            date: operation.date,
            amount: operation.amount,
            currency: operation.currency.clone(),
            commission,
            base_currency_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_operation_copies_fields() {
        let operation = Operation::new(
            "4",
            ClientType::Private,
            OperationType::Withdraw,
            NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(),
            Decimal::new(120000, 2),
            "EUR",
        );

        let record =
            TransactionRecord::from_operation(&operation, Decimal::new(60, 2), Decimal::new(120000, 2));

        assert_eq!(record.client_id, "4");
        assert_eq!(record.client_type, ClientType::Private);
        assert_eq!(record.operation_type, OperationType::Withdraw);
        assert_eq!(record.date, operation.date);
        assert_eq!(record.amount.to_string(), "1200.00");
        assert_eq!(record.currency, "eur");
        assert_eq!(record.commission.to_string(), "0.60");
        assert_eq!(record.base_currency_amount.to_string(), "1200.00");
    }

    #[test]
    fn test_record_serializes_with_lowercase_enums() {
        let operation = Operation::new(
            "1",
            ClientType::Private,
            OperationType::Withdraw,
            NaiveDate::from_ymd_opt(2016, 1, 6).unwrap(),
            Decimal::new(30000, 0),
            "jpy",
        );
        let record =
            TransactionRecord::from_operation(&operation, Decimal::ZERO, Decimal::new(23161, 2));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"client_type\":\"private\""));
        assert!(json.contains("\"operation_type\":\"withdraw\""));
        assert!(json.contains("\"date\":\"2016-01-06\""));

        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
