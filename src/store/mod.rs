//! Store Module
//!
//! Transactional access to the key-value store the shell talks to.
//!
//! ## Responsibilities
//! - Open one transaction per shell command
//! - Point reads, writes and deletes inside a transaction
//! - Ordered range reads starting at a key (the building block of `seek`)
//! - Atomic commit, explicit rollback
//!
//! ## Implementations
//! - [`TikvStore`]: TiKV cluster reached through its placement driver
//! - [`MemoryStore`]: ordered in-process map with fault injection, used by
//!   tests and benchmarks in place of a live cluster

mod memory;
mod tikv;

use async_trait::async_trait;

use crate::error::Result;
use crate::kv::KeyValue;

pub use memory::{FailPoint, MemoryStore, MemoryTransaction, StoreStats};
pub use tikv::{TikvStore, TikvTransaction};

/// Handle to a transactional key-value store
///
/// Created once at startup and shared read-only for the process lifetime.
#[async_trait]
pub trait Store: Send + Sync {
    type Txn: Transaction;

    /// Begin a new transaction
    async fn begin(&self) -> Result<Self::Txn>;
}

/// A single begin-to-commit unit of work
///
/// Writes are buffered until [`commit`](Transaction::commit); reads observe
/// committed data overlaid with the transaction's own pending writes.
#[async_trait]
pub trait Transaction: Send {
    /// Read a key
    ///
    /// Returns `None` if the key does not exist.
    async fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Set a key to a value
    async fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key (no-op if absent)
    async fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Read at most `limit` pairs with `key >= start`, in ascending key order
    async fn scan(&mut self, start: &[u8], limit: u32) -> Result<Vec<KeyValue>>;

    /// Commit all pending writes atomically
    async fn commit(&mut self) -> Result<()>;

    /// Discard pending writes and release the transaction
    async fn rollback(&mut self) -> Result<()>;
}
