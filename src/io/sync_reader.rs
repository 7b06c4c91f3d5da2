//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over operations from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read records sequentially, checks their
//! field count and delegates conversion to the csv_format module. It keeps
//! streaming behavior by processing records one at a time without loading the
//! entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<SequencedOperation, CommissionError>` for each CSV row:
//!
//! ```no_run
//! use commission_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(input) => println!("line {}: {:?}", input.line, input.operation),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Row errors are yielded as `ParseError` carrying the input line number

use crate::io::csv_format::{check_field_count, convert_csv_record, CsvRecord};
use crate::types::{CommissionError, SequencedOperation};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over operations, with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    record: StringRecord,
    line_num: u64,
}

/// Attach a line number to a row-level error
///
/// Errors that already are parse errors keep their message; everything else is
/// wrapped with its display text.
pub(crate) fn at_line(line: u64, error: CommissionError) -> CommissionError {
    match error {
        CommissionError::ParseError { message, .. } => CommissionError::parse(Some(line), message),
        other => CommissionError::parse(Some(line), other),
    }
}

/// Build a sequenced operation from one raw row
pub(crate) fn parse_row(
    line: u64,
    fields: usize,
    record: Result<CsvRecord, CommissionError>,
) -> Result<SequencedOperation, CommissionError> {
    check_field_count(fields)
        .and_then(|_| record)
        .and_then(convert_csv_record)
        .map(|operation| SequencedOperation { line, operation })
        .map_err(|e| at_line(line, e))
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Treat the first row as data (the format has no header)
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts so bad rows can be reported individually
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// * `FileNotFound` if the path does not exist
    /// * `IoError` if the file could not be opened
    pub fn new(path: &Path) -> Result<Self, CommissionError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CommissionError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => CommissionError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), e),
            },
        })?;

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            record: StringRecord::new(),
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<SequencedOperation, CommissionError>;

    /// Get the next operation from the CSV file
    ///
    /// Blank lines are skipped by the csv reader and do not produce items.
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                self.line_num += 1;
                let line = self
                    .record
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(self.line_num);
                let parsed = self.record.deserialize::<CsvRecord>(None).map_err(Into::into);
                Some(parse_row(line, self.record.len(), parsed))
            }
            Err(e) => {
                self.line_num += 1;
                let line = e.position().map(|pos| pos.line()).unwrap_or(self.line_num);
                Some(Err(at_line(line, e.into())))
            }
        }
    }
}
