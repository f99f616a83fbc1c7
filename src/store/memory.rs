//! In-memory store
//!
//! BTreeMap-based store with buffered, atomically committed transactions.
//! Faults can be injected at every transaction step so callers can observe
//! how they behave when the store fails part-way through a command.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, ShellError};
use crate::kv::KeyValue;

use super::{Store, Transaction};

/// A transaction step that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    Get,
    /// Fail every `set` after the first `after` succeed within a transaction
    Set { after: usize },
    Delete,
    Scan,
    Commit,
}

/// Transaction counters, for asserting what a command did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub begins: u64,
    pub commits: u64,
    pub rollbacks: u64,
}

/// Shared state behind every handle and transaction
#[derive(Default)]
struct Inner {
    /// Committed data, ordered by key
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,

    /// Active fault injections
    failpoints: Mutex<Vec<FailPoint>>,

    begins: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
}

impl Inner {
    fn fails(&self, matcher: impl Fn(&FailPoint) -> bool) -> bool {
        self.failpoints.lock().iter().any(matcher)
    }
}

/// In-process transactional store
///
/// Cloning yields another handle onto the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with committed pairs
    pub fn with_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        {
            let mut data = store.inner.data.write();
            for (key, value) in pairs {
                data.insert(key.into(), value.into());
            }
        }
        store
    }

    /// Make a transaction step fail until cleared
    pub fn fail_on(&self, point: FailPoint) {
        self.inner.failpoints.lock().push(point);
    }

    /// Remove all injected faults
    pub fn clear_failpoints(&self) {
        self.inner.failpoints.lock().clear();
    }

    /// Committed value of a key, bypassing transactions
    pub fn committed(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.data.read().get(key).cloned()
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }

    /// Snapshot of the transaction counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            begins: self.inner.begins.load(Ordering::Relaxed),
            commits: self.inner.commits.load(Ordering::Relaxed),
            rollbacks: self.inner.rollbacks.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Txn = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction> {
        if self.inner.fails(|fp| *fp == FailPoint::Begin) {
            return Err(injected("begin"));
        }
        self.inner.begins.fetch_add(1, Ordering::Relaxed);

        Ok(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            writes: BTreeMap::new(),
            sets: 0,
            state: TxnState::Active,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnState {
    Active,
    Committed,
    RolledBack,
}

/// Transaction over a [`MemoryStore`]
///
/// Pending writes live in `writes` (`None` marks a delete) and reach the
/// shared map only on commit, under a single write lock.
pub struct MemoryTransaction {
    inner: Arc<Inner>,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    sets: usize,
    state: TxnState,
}

impl MemoryTransaction {
    fn ensure_active(&self) -> Result<()> {
        match self.state {
            TxnState::Active => Ok(()),
            TxnState::Committed => Err(ShellError::Store(
                "transaction already committed".to_string(),
            )),
            TxnState::RolledBack => Err(ShellError::Store(
                "transaction already rolled back".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_active()?;
        if self.inner.fails(|fp| *fp == FailPoint::Get) {
            return Err(injected("get"));
        }

        if let Some(pending) = self.writes.get(key) {
            return Ok(pending.clone());
        }
        Ok(self.inner.data.read().get(key).cloned())
    }

    async fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_active()?;
        let sets = self.sets;
        if self
            .inner
            .fails(|fp| matches!(fp, FailPoint::Set { after } if sets >= *after))
        {
            return Err(injected("set"));
        }

        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        self.sets += 1;
        Ok(())
    }

    async fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.ensure_active()?;
        if self.inner.fails(|fp| *fp == FailPoint::Delete) {
            return Err(injected("delete"));
        }

        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    async fn scan(&mut self, start: &[u8], limit: u32) -> Result<Vec<KeyValue>> {
        self.ensure_active()?;
        if self.inner.fails(|fp| *fp == FailPoint::Scan) {
            return Err(injected("scan"));
        }

        let limit = limit as usize;
        let range = (Bound::Included(start), Bound::Unbounded);

        // Pending deletes can hide committed keys, so read that many extra.
        let deletes = self
            .writes
            .range::<[u8], _>(range)
            .filter(|(_, pending)| pending.is_none())
            .count();

        let mut view: BTreeMap<Vec<u8>, Vec<u8>> = self
            .inner
            .data
            .read()
            .range::<[u8], _>(range)
            .take(limit + deletes)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (key, pending) in self.writes.range::<[u8], _>(range) {
            match pending {
                Some(value) => {
                    view.insert(key.clone(), value.clone());
                }
                None => {
                    view.remove(key);
                }
            }
        }

        Ok(view.into_iter().take(limit).map(KeyValue::from).collect())
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        if self.inner.fails(|fp| *fp == FailPoint::Commit) {
            return Err(injected("commit"));
        }

        {
            let mut data = self.inner.data.write();
            for (key, pending) in std::mem::take(&mut self.writes) {
                match pending {
                    Some(value) => {
                        data.insert(key, value);
                    }
                    None => {
                        data.remove(&key);
                    }
                }
            }
        }

        self.state = TxnState::Committed;
        self.inner.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.state {
            TxnState::Committed => Err(ShellError::Store(
                "cannot roll back a committed transaction".to_string(),
            )),
            TxnState::RolledBack => Ok(()),
            TxnState::Active => {
                self.writes.clear();
                self.state = TxnState::RolledBack;
                self.inner.rollbacks.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }
}

fn injected(step: &str) -> ShellError {
    ShellError::Store(format!("injected failure on {}", step))
}
