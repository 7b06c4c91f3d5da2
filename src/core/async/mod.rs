//! Concurrent implementations of core components
//!
//! This module provides the thread-safe pieces used by the async processing
//! strategy:
//!
//! - **ConcurrentHistoryStore**: Per-client transaction history in a `DashMap`
//! - **BatchProcessor**: Partitions a batch by client and calculates each client's
//!   operations in its own tokio task
//!
//! # Thread Safety
//!
//! Operations for different clients proceed in parallel. Operations for the same
//! client are serialized twice over: the batch processor runs them in one task, and
//! the history store holds the client's entry while the weekly allowance is read
//! and updated.

pub mod batch_processor;
pub mod history_store;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use history_store::ConcurrentHistoryStore;
