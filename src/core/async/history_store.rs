//! Thread-safe transaction history for concurrent processing
//!
//! This module provides the `ConcurrentHistoryStore` struct, which keeps each
//! client's withdrawal records in a `DashMap` so calculations for different clients
//! can run on different threads.
//!
//! # Thread Safety
//!
//! `append_with` holds the client's entry guard while the weekly allowance is read
//! and the new record is appended. Two calculations for the same client therefore
//! never observe the same history snapshot, and the free allowance cannot be granted
//! twice. Calculations for other clients only block when their keys share a shard.

use crate::core::traits::TransactionHistory;
use crate::types::{ClientId, CommissionError, TransactionRecord};
use dashmap::DashMap;
use std::collections::VecDeque;

/// Thread-safe transaction history
///
/// Records are kept newest first per client.
#[derive(Debug, Default)]
pub struct ConcurrentHistoryStore {
    /// Concurrent map of client ID to records, newest first
    clients: DashMap<ClientId, VecDeque<TransactionRecord>>,
}

impl ConcurrentHistoryStore {
    /// Create a new empty ConcurrentHistoryStore
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Number of records stored for a client
    pub fn record_count(&self, client_id: &str) -> usize {
        self.clients
            .get(client_id)
            .map_or(0, |records| records.len())
    }

    /// Number of clients with at least one record
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl TransactionHistory for ConcurrentHistoryStore {
    fn history(&self, client_id: &str) -> Result<Vec<TransactionRecord>, CommissionError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn append(&self, client_id: &str, record: TransactionRecord) -> Result<(), CommissionError> {
        self.clients
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
        // The guard keeps the entry's shard write-locked until the append is done
        let mut records = self.clients.entry(client_id.to_string()).or_default();

        if let Some(record) = f(records.make_contiguous()) {
            records.push_front(record);
        }
        Ok(())
    }
}
