//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over operations from a CSV file.
//! Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - tokio for async runtime and concurrency primitives
//! - Batch reading for efficient processing
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of SequencedOperations
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::CsvRecord;
use crate::io::sync_reader::{at_line, parse_row};
use crate::types::{CommissionError, SequencedOperation};
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::io::AsyncRead;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over operations.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncReader<R>,
    record: StringRecord,
    line_num: u64,
    rejected: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_reader(reader);

        Self {
            csv_reader,
            record: StringRecord::new(),
            line_num: 0,
            rejected: 0,
        }
    }

    /// Number of rows rejected so far
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Read a batch of operations
    ///
    /// Reads up to `batch_size` valid operations. Invalid rows are logged with
    /// their line number and skipped. Returns an empty vector at end of file.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<SequencedOperation> {
        let mut batch = Vec::with_capacity(batch_size);

        while batch.len() < batch_size {
            match self.csv_reader.read_record(&mut self.record).await {
                Ok(false) => break,
                Ok(true) => {
                    self.line_num += 1;
                    let line = self
                        .record
                        .position()
                        .map(|pos| pos.line())
                        .unwrap_or(self.line_num);
                    let parsed = self
                        .record
                        .deserialize::<CsvRecord>(None)
                        .map_err(|e| CommissionError::parse(Some(line), e));

                    match parse_row(line, self.record.len(), parsed) {
                        Ok(input) => batch.push(input),
                        Err(e) => {
                            self.rejected += 1;
                            warn!(error = %e, "skipping row");
                        }
                    }
                }
                Err(e) => {
                    self.line_num += 1;
                    self.rejected += 1;
                    let error = at_line(self.line_num, CommissionError::parse(None, e));
                    warn!(error = %error, "skipping row");
                }
            }
        }

        batch
    }
}
