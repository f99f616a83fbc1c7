//! Scanner
//!
//! Lazy, forward-only cursor over a transaction.
//!
//! ## Paging
//! The store is read in pages of `batch_size` pairs. When the buffered page
//! is used up the next one is requested starting at the successor of the
//! last key seen (`last_key ++ 0x00`), so keys are never repeated. A short
//! page means the end of the keyspace has been reached.
//!
//! The scanner borrows its transaction mutably, so it cannot outlive it and
//! is released on every exit path of the caller's scope.

use std::collections::VecDeque;

use crate::error::Result;
use crate::kv::KeyValue;
use crate::store::Transaction;

/// Forward-only cursor positioned at the first key >= a start key
pub struct Scanner<'a, T: Transaction + ?Sized> {
    txn: &'a mut T,
    batch_size: u32,

    /// Start key of the next page to fetch
    next_start: Vec<u8>,

    /// Fetched pairs not yet consumed; the front is the current entry
    buffer: VecDeque<KeyValue>,

    /// Set once a short page has been returned
    exhausted: bool,
}

impl<'a, T: Transaction + ?Sized> Scanner<'a, T> {
    /// Position a cursor at the first key >= `start`
    pub async fn open(txn: &'a mut T, start: &[u8], batch_size: u32) -> Result<Self> {
        let mut scanner = Self {
            txn,
            batch_size: batch_size.max(1),
            next_start: start.to_vec(),
            buffer: VecDeque::new(),
            exhausted: false,
        };
        scanner.fill().await?;
        Ok(scanner)
    }

    /// True while the cursor points at an entry
    pub fn valid(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// The entry under the cursor
    pub fn current(&self) -> Option<&KeyValue> {
        self.buffer.front()
    }

    /// Advance to the next entry, fetching a new page when needed
    pub async fn next(&mut self) -> Result<()> {
        self.buffer.pop_front();
        if self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        Ok(())
    }

    /// Release the cursor
    pub fn close(self) {
        tracing::trace!(
            "Scanner closed with {} buffered entries",
            self.buffer.len()
        );
    }

    async fn fill(&mut self) -> Result<()> {
        let page = self.txn.scan(&self.next_start, self.batch_size).await?;
        tracing::trace!("Scanner fetched {} entries", page.len());

        if page.len() < self.batch_size as usize {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.next_start = successor(&last.key);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

/// Smallest key strictly greater than `key`
fn successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);
    next
}
