//! Error types for the commission engine
//!
//! This module defines all error types that can occur while loading configuration,
//! reading operations and calculating commissions.
//!
//! # Error Categories
//!
//! - **Arithmetic Errors**: invalid precision, division by zero, overflow
//! - **Conversion Errors**: negative amounts, currencies without an exchange rate
//! - **Input Errors**: file not found, malformed CSV rows, unsupported operation types
//! - **Collaborator Errors**: invalid configuration, rate fetch failures, history store failures

use thiserror::Error;

/// Main error type for the commission engine
///
/// Every failure is surfaced to the caller as one of these variants; nothing in the
/// calculation path catches or retries them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommissionError {
    /// A precision outside the supported range was passed to the decimal engine
    ///
    /// This is a programmer error and is fatal to the call.
    #[error("Invalid precision {precision}: must be between 0 and {max}")]
    InvalidPrecision {
        /// The rejected precision
        precision: i32,
        /// Largest supported precision
        max: u32,
    },

    /// The divisor compares equal to zero at the working precision
    #[error("Division by zero is not allowed")]
    DivisionByZero,

    /// The result does not fit the decimal representation
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// Negative or malformed amount
    #[error("Invalid amount '{amount}' for currency '{currency}'")]
    InvalidAmount {
        /// The rejected amount
        amount: String,
        /// Currency the amount is denominated in
        currency: String,
    },

    /// No usable exchange rate for the currency
    ///
    /// Fatal to the calculation; batch callers may skip the operation.
    #[error("Failed to convert currency: no exchange rate for '{currency}'")]
    UnknownCurrency {
        /// The currency code that has no rate
        currency: String,
    },

    /// Operation type or client type has no calculator
    #[error("Unsupported {field} '{value}'")]
    UnsupportedOperation {
        /// Which field was rejected ("operation type" or "client type")
        field: String,
        /// The rejected value
        value: String,
    },

    /// The transaction history store could not be read or written
    #[error("History store unavailable for client {client}: {message}")]
    HistoryUnavailable {
        /// Client whose history was requested
        client: String,
        /// Description of the store failure
        message: String,
    },

    /// Configuration is missing a value or holds an invalid one
    #[error("Invalid configuration: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Exchange rates could not be fetched or decoded
    #[error("Failed to get exchange rates: {message}")]
    RateFetchError {
        /// Description of the fetch failure
        message: String,
    },

    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed row is skipped
    /// and processing continues with the next row.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for CommissionError {
    fn from(error: std::io::Error) -> Self {
        CommissionError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CommissionError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        CommissionError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CommissionError {
    fn from(error: serde_yaml::Error) -> Self {
        CommissionError::ConfigError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CommissionError {
    /// Create an InvalidPrecision error
    pub fn invalid_precision(precision: i32, max: u32) -> Self {
        CommissionError::InvalidPrecision { precision, max }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        CommissionError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, currency: &str) -> Self {
        CommissionError::InvalidAmount {
            amount: amount.to_string(),
            currency: currency.to_string(),
        }
    }

    /// Create an UnknownCurrency error
    pub fn unknown_currency(currency: &str) -> Self {
        CommissionError::UnknownCurrency {
            currency: currency.to_string(),
        }
    }

    /// Create an UnsupportedOperation error
    pub fn unsupported_operation(field: &str, value: &str) -> Self {
        CommissionError::UnsupportedOperation {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a HistoryUnavailable error
    pub fn history_unavailable(client: &str, message: impl ToString) -> Self {
        CommissionError::HistoryUnavailable {
            client: client.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a ConfigError
    pub fn config(message: impl ToString) -> Self {
        CommissionError::ConfigError {
            message: message.to_string(),
        }
    }

    /// Create a RateFetchError
    pub fn rate_fetch(message: impl ToString) -> Self {
        CommissionError::RateFetchError {
            message: message.to_string(),
        }
    }

    /// Create a ParseError for a given input line
    pub fn parse(line: Option<u64>, message: impl ToString) -> Self {
        CommissionError::ParseError {
            line,
            message: message.to_string(),
        }
    }
}
