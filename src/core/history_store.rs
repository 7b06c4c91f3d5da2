//! In-memory transaction history
//!
//! This module provides the `MemoryHistoryStore` used by the synchronous strategy.
//! Each client owns a deque of records with the newest record at the front, which is
//! the order the weekly allowance scan relies on.
//!
//! # Atomicity
//!
//! `append_with` holds the store lock while the calculator reads the history and
//! produces the new record, so a read followed by an append can never interleave
//! with another calculation.

use crate::core::traits::TransactionHistory;
use crate::types::{ClientId, CommissionError, TransactionRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Transaction history kept in process memory
///
/// Records are only ever pushed to the front of a client's deque; nothing is
/// evicted.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    /// Map of client ID to records, newest first
    clients: Mutex<HashMap<ClientId, VecDeque<TransactionRecord>>>,
}

impl MemoryHistoryStore {
    /// Create a new empty history store
    pub fn new() -> Self {
        MemoryHistoryStore {
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn lock(
        &self,
        client_id: &str,
    ) -> Result<MutexGuard<'_, HashMap<ClientId, VecDeque<TransactionRecord>>>, CommissionError>
    {
        self.clients
            .lock()
            .map_err(|e| CommissionError::history_unavailable(client_id, e))
    }

    /// Number of records stored for a client
    pub fn record_count(&self, client_id: &str) -> usize {
        self.clients
            .lock()
            .map(|clients| clients.get(client_id).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }
}

impl TransactionHistory for MemoryHistoryStore {
    fn history(&self, client_id: &str) -> Result<Vec<TransactionRecord>, CommissionError> {
        let clients = self.lock(client_id)?;
        Ok(clients
            .get(client_id)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn append(&self, client_id: &str, record: TransactionRecord) -> Result<(), CommissionError> {
        let mut clients = self.lock(client_id)?;
        clients
            .entry(client_id.to_string())
            .or_default()
            .push_front(record);
        Ok(())
    }

    fn append_with(
        &self,
        client_id: &str,
        f: &mut dyn FnMut(&[TransactionRecord]) -> Option<TransactionRecord>,
    ) -> Result<(), CommissionError> {
        let mut clients = self.lock(client_id)?;
        let records = clients.entry(client_id.to_string()).or_default();

        if let Some(record) = f(records.make_contiguous()) {
            records.push_front(record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientType, Operation, OperationType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(client: &str, day: u32) -> TransactionRecord {
        let operation = Operation::new(
            client,
            ClientType::Private,
            OperationType::Withdraw,
            NaiveDate::from_ymd_opt(2016, 1, day).unwrap(),
            Decimal::new(10000, 2),
            "eur",
        );
        TransactionRecord::from_operation(&operation, Decimal::ZERO, Decimal::new(10000, 2))
    }

    #[test]
    fn test_unknown_client_has_empty_history() {
        let store = MemoryHistoryStore::new();
        assert!(store.history("42").unwrap().is_empty());
        assert_eq!(store.record_count("42"), 0);
    }

    #[test]
    fn test_append_puts_newest_first() {
        let store = MemoryHistoryStore::new();

        store.append("1", record("1", 4)).unwrap();
        store.append("1", record("1", 5)).unwrap();
        store.append("1", record("1", 6)).unwrap();

        let days: Vec<u32> = store
            .history("1")
            .unwrap()
            .iter()
            .map(|r| chrono::Datelike::day(&r.date))
            .collect();
        assert_eq!(days, vec![6, 5, 4]);
    }

    #[test]
    fn test_histories_are_kept_per_client() {
        let store = MemoryHistoryStore::new();

        store.append("1", record("1", 4)).unwrap();
        store.append("2", record("2", 5)).unwrap();

        assert_eq!(store.record_count("1"), 1);
        assert_eq!(store.record_count("2"), 1);
        assert_eq!(store.history("2").unwrap()[0].client_id, "2");
    }

    #[test]
    fn test_append_with_sees_current_history() {
        let store = MemoryHistoryStore::new();
        store.append("1", record("1", 4)).unwrap();

        let mut seen = 0;
        store
            .append_with("1", &mut |history: &[TransactionRecord]| {
                seen = history.len();
                Some(record("1", 5))
            })
            .unwrap();

        assert_eq!(seen, 1);
        assert_eq!(store.record_count("1"), 2);
        assert_eq!(store.history("1").unwrap()[0].date.to_string(), "2016-01-05");
    }

    #[test]
    fn test_append_with_none_leaves_history_untouched() {
        let store = MemoryHistoryStore::new();
        store.append("1", record("1", 4)).unwrap();

        store.append_with("1", &mut |_| None).unwrap();

        assert_eq!(store.record_count("1"), 1);
    }
}
