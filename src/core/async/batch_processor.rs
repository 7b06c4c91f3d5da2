//! Batch processing with client-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which calculates the
//! commissions of a batch of operations concurrently while keeping every client's
//! operations in input order.
//!
//! # Design
//!
//! A batch is partitioned by client ID. Each client's operations run sequentially
//! in one tokio task, and different clients run in parallel. Because the weekly
//! allowance only depends on the client's own history, this yields the same
//! commissions as processing the whole batch in order.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<CommissionEngine<ConcurrentHistoryStore>>  (shared calculator)
//! ```
//!
//! Results are returned sorted by input line, so callers can write them out in
//! the order the operations were read.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::error;

use super::ConcurrentHistoryStore;
use crate::core::engine::CommissionEngine;
use crate::types::{ClientId, CommissionError, SequencedOperation};

/// Result of calculating a single operation
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The operation that was processed
    pub input: SequencedOperation,

    /// The commission, or why it could not be calculated
    pub result: Result<Decimal, CommissionError>,
}

/// Batch processor with client-based partitioning
///
/// Cheap to clone; every clone shares the same engine and history.
#[derive(Clone)]
pub struct BatchProcessor {
    /// Shared commission engine backed by the concurrent history store
    engine: Arc<CommissionEngine<ConcurrentHistoryStore>>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Arc-wrapped engine shared by all tasks
    pub fn new(engine: Arc<CommissionEngine<ConcurrentHistoryStore>>) -> Self {
        Self { engine }
    }

    /// Partition a batch of operations by client ID
    ///
    /// # Guarantees
    ///
    /// - Each operation appears in exactly one sub-batch
    /// - Operations for each client keep their original order
    pub fn partition_by_client(
        &self,
        batch: Vec<SequencedOperation>,
    ) -> HashMap<ClientId, Vec<SequencedOperation>> {
        let mut client_batches: HashMap<ClientId, Vec<SequencedOperation>> = HashMap::new();

        for input in batch {
            client_batches
                .entry(input.operation.client_id.clone())
                .or_default()
                .push(input);
        }

        client_batches
    }

    /// Calculate all operations of a single client sequentially
    ///
    /// Failures are captured in the results and do not stop the remaining
    /// operations.
    pub async fn process_client_operations(
        &self,
        operations: Vec<SequencedOperation>,
    ) -> Vec<ProcessingResult> {
        operations
            .into_iter()
            .map(|input| {
                let result = self.engine.calculate(&input.operation);
                ProcessingResult { input, result }
            })
            .collect()
    }

    /// Calculate a batch of operations with client-based partitioning
    ///
    /// This method:
    /// 1. Partitions the batch by client ID
    /// 2. Spawns a tokio task per client
    /// 3. Waits for all tasks to complete
    /// 4. Returns all results ordered by input line
    ///
    /// A panicking task is logged and its operations produce no result.
    pub async fn process_batch(&self, batch: Vec<SequencedOperation>) -> Vec<ProcessingResult> {
        let client_batches = self.partition_by_client(batch);

        let mut tasks = Vec::with_capacity(client_batches.len());
        for (client_id, operations) in client_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move {
                processor.process_client_operations(operations).await
            });
            tasks.push((client_id, task));
        }

        let mut results = Vec::new();
        for (client_id, task) in tasks {
            match task.await {
                Ok(client_results) => results.extend(client_results),
                Err(e) => error!(client = %client_id, error = %e, "client task failed"),
            }
        }

        results.sort_by_key(|result| result.input.line);
        results
    }
}
