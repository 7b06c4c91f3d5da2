//! CSV format handling for operation input and commission output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain operations
//! - Commission output serialization
//!
//! Input rows carry no header and six positional columns:
//!
//! ```text
//! date,client_id,client_type,operation_type,amount,currency
//! 2014-12-31,4,private,withdraw,1200.00,EUR
//! ```
//!
//! All functions are pure (no I/O beyond the writer they are handed) for easy testing.

use crate::types::{ClientType, CommissionError, Operation, OperationType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Number of columns in an input row
pub const FIELD_COUNT: usize = 6;

/// Date format of the first column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV record structure for deserialization
///
/// Fields are kept as raw strings; [`convert_csv_record`] does the validation so
/// every rejection carries a readable message.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub date: String,
    pub client_id: String,
    pub client_type: String,
    pub operation_type: String,
    pub amount: String,
    pub currency: String,
}

/// Reject rows that do not have exactly [`FIELD_COUNT`] columns
///
/// The readers run with a flexible field count, so short and long rows reach this
/// check instead of failing the whole file.
pub fn check_field_count(found: usize) -> Result<(), CommissionError> {
    if found != FIELD_COUNT {
        return Err(CommissionError::parse(
            None,
            format!("expected {} fields, found {}", FIELD_COUNT, found),
        ));
    }
    Ok(())
}

/// Convert a CsvRecord to an Operation
///
/// # Errors
///
/// - `ParseError` for a malformed date, an empty client id or currency
/// - `UnsupportedOperation` for an unknown client or operation type
/// - `InvalidAmount` for an amount that is not a decimal number or is negative
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, CommissionError> {
    let date = NaiveDate::parse_from_str(csv_record.date.trim(), DATE_FORMAT).map_err(|e| {
        CommissionError::parse(None, format!("invalid date '{}': {}", csv_record.date, e))
    })?;

    let client_id = csv_record.client_id.trim();
    if client_id.is_empty() {
        return Err(CommissionError::parse(None, "client id is empty"));
    }

    let currency = csv_record.currency.trim();
    if currency.is_empty() {
        return Err(CommissionError::parse(None, "currency is empty"));
    }

    let client_type = ClientType::from_str(&csv_record.client_type)?;
    let operation_type = OperationType::from_str(&csv_record.operation_type)?;

    let amount = Decimal::from_str(csv_record.amount.trim())
        .map_err(|_| CommissionError::invalid_amount(&csv_record.amount, currency))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CommissionError::invalid_amount(&csv_record.amount, currency));
    }

    Ok(Operation::new(
        client_id,
        client_type,
        operation_type,
        date,
        amount.abs(),
        currency,
    ))
}

/// Streaming commission writer
///
/// Writes one commission per line, exactly as many fractional digits as the
/// decimal carries.
pub struct CommissionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CommissionWriter<W> {
    pub fn new(output: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        Self { writer }
    }

    /// Write a single commission
    pub fn write(&mut self, commission: &Decimal) -> Result<(), CommissionError> {
        self.writer
            .write_record([commission.to_string()])
            .map_err(|e| CommissionError::IoError {
                message: format!("Failed to write commission: {}", e),
            })
    }

    pub fn flush(&mut self) -> Result<(), CommissionError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write commissions to CSV format, one per line, in the given order
pub fn write_commissions<'a, I>(commissions: I, output: &mut dyn Write) -> Result<(), CommissionError>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    let mut writer = CommissionWriter::new(output);
    for commission in commissions {
        writer.write(commission)?;
    }
    writer.flush()
}
