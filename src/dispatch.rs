//! Dispatcher Module
//!
//! Executes validated commands against the store.
//!
//! ## Transaction Model
//! Every command runs in exactly one transaction:
//! - `put`, `puts`, `del`: all writes, then a single commit. If any write or
//!   the commit fails the transaction is rolled back, so none of the writes
//!   become visible.
//! - `get`, `seek`: read, then roll back to release the transaction.
//!
//! Sequences of commands are never atomic together.

use crate::command::Command;
use crate::config::DEFAULT_SCAN_BATCH_SIZE;
use crate::error::{Result, ShellError};
use crate::kv::KeyValue;
use crate::output::Output;
use crate::scanner::Scanner;
use crate::store::{Store, Transaction};

/// Routes commands to the store
pub struct Dispatcher<S: Store> {
    store: S,

    /// Upper bound on the page size used by `seek`
    scan_batch_size: u32,
}

impl<S: Store> Dispatcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }

    /// Set the scanner page size (clamped to at least 1)
    pub fn with_scan_batch_size(mut self, size: u32) -> Self {
        self.scan_batch_size = size.max(1);
        self
    }

    /// Validate and execute a command by name
    pub async fn dispatch(&self, name: &str, args: Vec<Vec<u8>>) -> Result<Output> {
        let command = Command::parse(name, args)?;
        self.execute(command).await
    }

    /// Execute a validated command
    pub async fn execute(&self, command: Command) -> Result<Output> {
        let kind = command.kind();
        tracing::debug!("Executing {} (writes: {})", kind, kind.is_mutating());

        let result = match command {
            Command::Put { key, value } => self.puts(&[(key, value)]).await,
            Command::Puts { pairs } => self.puts(&pairs).await,
            Command::Get { key } => self.get(key).await,
            Command::Seek { start, limit } => self.seek(&start, limit).await,
            Command::Del { keys } => self.del(&keys).await,
        };

        if let Err(ref e) = result {
            if e.is_store_error() {
                tracing::warn!("{} failed: {}", kind, e);
            }
        }
        result
    }

    /// Set all pairs in one transaction
    async fn puts(&self, pairs: &[(Vec<u8>, Vec<u8>)]) -> Result<Output> {
        let mut txn = self.store.begin().await?;
        let written = set_all(&mut txn, pairs).await;
        finish(&mut txn, written).await?;
        Ok(Output::Empty)
    }

    /// Delete all keys in one transaction
    async fn del(&self, keys: &[Vec<u8>]) -> Result<Output> {
        let mut txn = self.store.begin().await?;
        let deleted = delete_all(&mut txn, keys).await;
        finish(&mut txn, deleted).await?;
        Ok(Output::Empty)
    }

    async fn get(&self, key: Vec<u8>) -> Result<Output> {
        let mut txn = self.store.begin().await?;
        let read = txn.get(&key).await;
        release(&mut txn).await;

        match read? {
            Some(value) => Ok(Output::Single(KeyValue { key, value })),
            None => Err(ShellError::KeyNotFound(key)),
        }
    }

    async fn seek(&self, start: &[u8], limit: usize) -> Result<Output> {
        let mut txn = self.store.begin().await?;
        let collected = collect(&mut txn, start, limit, self.page_size(limit)).await;
        release(&mut txn).await;
        Ok(Output::Many(collected?))
    }

    /// No point fetching pages larger than the number of entries wanted
    fn page_size(&self, limit: usize) -> u32 {
        u32::try_from(limit)
            .unwrap_or(u32::MAX)
            .min(self.scan_batch_size)
            .max(1)
    }
}

async fn set_all<T: Transaction>(txn: &mut T, pairs: &[(Vec<u8>, Vec<u8>)]) -> Result<()> {
    for (key, value) in pairs {
        txn.set(key, value).await?;
    }
    Ok(())
}

async fn delete_all<T: Transaction>(txn: &mut T, keys: &[Vec<u8>]) -> Result<()> {
    for key in keys {
        txn.delete(key).await?;
    }
    Ok(())
}

async fn collect<T: Transaction>(
    txn: &mut T,
    start: &[u8],
    limit: usize,
    page_size: u32,
) -> Result<Vec<KeyValue>> {
    let mut scanner = Scanner::open(txn, start, page_size).await?;
    let mut collected = Vec::new();

    while collected.len() < limit {
        let Some(kv) = scanner.current() else {
            break;
        };
        collected.push(kv.clone());
        // Advancing past the last wanted entry could fetch another page
        if collected.len() == limit {
            break;
        }
        scanner.next().await?;
    }

    scanner.close();
    Ok(collected)
}

/// Commit after successful writes, roll back otherwise
async fn finish<T: Transaction>(txn: &mut T, written: Result<()>) -> Result<()> {
    let committed = match written {
        Ok(()) => txn.commit().await,
        Err(e) => Err(e),
    };

    if committed.is_err() {
        release(txn).await;
    }
    committed
}

/// Roll back, logging rather than returning any failure
async fn release<T: Transaction>(txn: &mut T) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
