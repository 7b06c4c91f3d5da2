//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `operation`: operation input and client/operation enums
//! - `transaction`: persisted history records
//! - `error`: Error types for the commission engine

pub mod error;
pub mod operation;
pub mod transaction;

pub use error::CommissionError;
pub use operation::{ClientId, ClientType, Operation, OperationType, SequencedOperation};
pub use transaction::TransactionRecord;
