//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates processing by coordinating between
//! the SyncReader (for CSV input) and a CommissionEngine over a
//! `MemoryHistoryStore` (for the commission rules).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Commission calculation to `CommissionEngine`
//! - CSV output to `csv_format::CommissionWriter`
//!
//! Commissions are written as soon as they are calculated, so memory usage is
//! bounded by the weekly history kept per client rather than by the file size.

use crate::core::MemoryHistoryStore;
use crate::io::csv_format::CommissionWriter;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingContext, ProcessingStrategy, ProcessingSummary};
use crate::types::CommissionError;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use commission_engine::config::CalculatorConfig;
/// use commission_engine::rates::RateTable;
/// use commission_engine::strategy::{ProcessingContext, ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let context = ProcessingContext::new(Arc::new(CalculatorConfig::default()), RateTable::default());
/// let strategy = SyncProcessingStrategy::new(context);
/// let mut output = std::io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    context: ProcessingContext,
}

impl SyncProcessingStrategy {
    pub fn new(context: ProcessingContext) -> Self {
        Self { context }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process operations from input file and write commissions to output
    ///
    /// 1. Creates a CommissionEngine with a fresh in-memory history
    /// 2. Streams operations from the CSV file through a SyncReader
    /// 3. Calculates each commission and writes it immediately
    ///
    /// Fatal errors (file not found, output errors) are returned immediately.
    /// Row and calculation errors are logged and the row is skipped.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), CommissionError> {
        let engine = self.context.engine(MemoryHistoryStore::new());
        let reader = SyncReader::new(input_path)?;
        let mut writer = CommissionWriter::new(output);
        let mut summary = ProcessingSummary::default();

        for result in reader {
            let input = match result {
                Ok(input) => input,
                Err(e) => {
                    warn!(error = %e, "skipping row");
                    summary.skipped += 1;
                    continue;
                }
            };

            match engine.calculate(&input.operation) {
                Ok(commission) => {
                    writer.write(&commission)?;
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!(line = input.line, error = %e, "skipping operation");
                    summary.skipped += 1;
                }
            }
        }

        writer.flush()?;
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            "processing complete"
        );
        Ok(())
    }
}
