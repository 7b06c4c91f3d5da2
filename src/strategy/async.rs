//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. It processes operations in batches using thread-based
//! parallelism with client-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (client partitioning + tasks)
//!         └── CommissionEngine<ConcurrentHistoryStore>
//! ```
//!
//! # Ordering
//!
//! - Batches are processed one after another, so a client whose operations span
//!   several batches still sees them in input order
//! - Within a batch, clients run in parallel and each client's operations run in order
//! - Each batch's results come back sorted by input line and are written before the
//!   next batch is read, so the output matches the sequential strategy line for line

use crate::core::r#async::{BatchProcessor, ConcurrentHistoryStore};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::CommissionWriter;
use crate::strategy::{ProcessingContext, ProcessingStrategy, ProcessingSummary};
use crate::types::CommissionError;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
///
/// Controls how operations are batched and the number of worker threads
/// for parallel processing within each batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values are replaced by the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid max concurrent batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Operations are read in batches and processed batch by batch. Within each batch
/// they are partitioned by client ID and processed in parallel across the
/// runtime's worker threads. All tasks share one `ConcurrentHistoryStore`, whose
/// per-client entry lock makes each private withdrawal's read and append atomic.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
    context: ProcessingContext,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig, context: ProcessingContext) -> Self {
        Self { config, context }
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write commissions to output
    ///
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Creates an engine over a `ConcurrentHistoryStore` and a BatchProcessor
    /// 3. Reads operations in batches from CSV using AsyncReader
    /// 4. Processes each batch and writes its commissions in input order
    ///
    /// Fatal errors (file not found, runtime or output errors) are returned
    /// immediately. Row and calculation errors are logged and the row is skipped.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CommissionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .enable_all()
            .build()
            .map_err(|e| CommissionError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let engine = Arc::new(self.context.engine(ConcurrentHistoryStore::new()));
            let processor = BatchProcessor::new(engine);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => CommissionError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => CommissionError::IoError {
                        message: format!("Failed to open file '{}': {}", input_path.display(), e),
                    },
                })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut writer = CommissionWriter::new(output);
            let mut summary = ProcessingSummary::default();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for result in processor.process_batch(batch).await {
                    match result.result {
                        Ok(commission) => {
                            writer.write(&commission)?;
                            summary.processed += 1;
                        }
                        Err(e) => {
                            warn!(line = result.input.line, error = %e, "skipping operation");
                            summary.skipped += 1;
                        }
                    }
                }
            }

            writer.flush()?;
            summary.skipped += reader.rejected();
            info!(
                processed = summary.processed,
                skipped = summary.skipped,
                "processing complete"
            );
            Ok(())
        })
    }
}
