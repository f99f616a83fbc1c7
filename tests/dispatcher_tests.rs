//! Tests for Dispatcher
//!
//! These tests verify:
//! - Read-after-write across commands
//! - One transaction per command, committed once
//! - Batch atomicity when the store fails part-way
//! - Seek bounds, ordering and limits
//! - Malformed commands never reach the store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tikv_shell::store::{FailPoint, MemoryStore, MemoryTransaction, Store, StoreStats, Transaction};
use tikv_shell::{Dispatcher, ErrorKind, KeyValue, Output, Result, ShellError};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (MemoryStore, Dispatcher<MemoryStore>) {
    let store = MemoryStore::new();
    let dispatcher = Dispatcher::new(store.clone());
    (store, dispatcher)
}

fn args(fields: &[&str]) -> Vec<Vec<u8>> {
    fields.iter().map(|f| f.as_bytes().to_vec()).collect()
}

async fn run(dispatcher: &Dispatcher<MemoryStore>, line: &[&str]) -> tikv_shell::Result<Output> {
    dispatcher.dispatch(line[0], args(&line[1..])).await
}

/// Memory store whose transactions count their scans and can fail every
/// scan after the first
#[derive(Clone)]
struct PagedStore {
    inner: MemoryStore,
    scans: Arc<AtomicUsize>,
    fail_after_first_scan: bool,
}

impl PagedStore {
    fn new(inner: MemoryStore, fail_after_first_scan: bool) -> Self {
        Self {
            inner,
            scans: Arc::new(AtomicUsize::new(0)),
            fail_after_first_scan,
        }
    }

    fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

struct PagedTxn {
    inner: MemoryTransaction,
    scans: Arc<AtomicUsize>,
    fail_after_first_scan: bool,
}

#[async_trait]
impl Store for PagedStore {
    type Txn = PagedTxn;

    async fn begin(&self) -> Result<PagedTxn> {
        Ok(PagedTxn {
            inner: self.inner.begin().await?,
            scans: Arc::clone(&self.scans),
            fail_after_first_scan: self.fail_after_first_scan,
        })
    }
}

#[async_trait]
impl Transaction for PagedTxn {
    async fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn scan(&mut self, start: &[u8], limit: u32) -> Result<Vec<KeyValue>> {
        let previous = self.scans.fetch_add(1, Ordering::SeqCst);
        if self.fail_after_first_scan && previous > 0 {
            return Err(ShellError::Store("second scan".to_string()));
        }
        self.inner.scan(start, limit).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }
}

fn ten_keys() -> MemoryStore {
    MemoryStore::with_pairs((0..10).map(|i| (format!("k{}", i), format!("{}", i))))
}

fn keys(output: &Output) -> Vec<&[u8]> {
    output.records().iter().map(|kv| kv.key.as_slice()).collect()
}

// =============================================================================
// Put / Get Tests
// =============================================================================

#[tokio::test]
async fn test_put_then_get() {
    let (_store, dispatcher) = setup();

    let out = run(&dispatcher, &["put", "alice", "100"]).await.unwrap();
    assert_eq!(out, Output::Empty);

    let out = run(&dispatcher, &["get", "alice"]).await.unwrap();
    assert_eq!(out, Output::Single(KeyValue::new("alice", "100")));
}

#[tokio::test]
async fn test_put_overwrites() {
    let (store, dispatcher) = setup();

    run(&dispatcher, &["put", "k", "v1"]).await.unwrap();
    run(&dispatcher, &["put", "k", "v2"]).await.unwrap();

    assert_eq!(store.committed(b"k"), Some(b"v2".to_vec()));
}

#[tokio::test]
async fn test_put_uses_one_committed_transaction() {
    let (store, dispatcher) = setup();

    run(&dispatcher, &["put", "k", "v"]).await.unwrap();

    assert_eq!(
        store.stats(),
        StoreStats {
            begins: 1,
            commits: 1,
            rollbacks: 0
        }
    );
}

#[tokio::test]
async fn test_command_name_is_case_insensitive() {
    let (store, dispatcher) = setup();

    run(&dispatcher, &["PUT", "k", "v"]).await.unwrap();

    assert_eq!(store.committed(b"k"), Some(b"v".to_vec()));
}

#[tokio::test]
async fn test_get_missing_key_is_store_error() {
    let (_store, dispatcher) = setup();

    let err = run(&dispatcher, &["get", "ghost"]).await.unwrap_err();

    assert!(matches!(err, ShellError::KeyNotFound(ref key) if key == b"ghost"));
    assert_eq!(err.kind(), ErrorKind::Store);
    assert_eq!(err.to_string(), "key not found: ghost");
}

#[tokio::test]
async fn test_get_releases_its_transaction() {
    let store = MemoryStore::with_pairs([("k", "v")]);
    let dispatcher = Dispatcher::new(store.clone());

    run(&dispatcher, &["get", "k"]).await.unwrap();

    let stats = store.stats();
    assert_eq!(stats.begins, 1);
    assert_eq!(stats.commits, 0);
    assert_eq!(stats.rollbacks, 1);
}

#[tokio::test]
async fn test_get_surfaces_store_failure() {
    let store = MemoryStore::with_pairs([("k", "v")]);
    let dispatcher = Dispatcher::new(store.clone());
    store.fail_on(FailPoint::Get);

    let err = run(&dispatcher, &["get", "k"]).await.unwrap_err();

    assert!(matches!(err, ShellError::Store(_)));
    assert_eq!(store.stats().rollbacks, 1);
}

// =============================================================================
// Puts Tests
// =============================================================================

#[tokio::test]
async fn test_puts_writes_all_pairs() {
    let (store, dispatcher) = setup();

    run(&dispatcher, &["puts", "k1", "v1", "k2", "v2"]).await.unwrap();

    let out = run(&dispatcher, &["get", "k1"]).await.unwrap();
    assert_eq!(out, Output::Single(KeyValue::new("k1", "v1")));
    let out = run(&dispatcher, &["get", "k2"]).await.unwrap();
    assert_eq!(out, Output::Single(KeyValue::new("k2", "v2")));

    // Only the batch commits; the reads are rolled back
    assert_eq!(store.stats().commits, 1);
}

#[tokio::test]
async fn test_puts_is_atomic_when_a_set_fails() {
    let (store, dispatcher) = setup();
    store.fail_on(FailPoint::Set { after: 1 });

    let err = run(&dispatcher, &["puts", "k1", "v1", "k2", "v2"]).await.unwrap_err();
    assert!(err.is_store_error());

    store.clear_failpoints();
    assert!(run(&dispatcher, &["get", "k1"]).await.is_err());
    assert!(run(&dispatcher, &["get", "k2"]).await.is_err());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_puts_is_atomic_when_commit_fails() {
    let (store, dispatcher) = setup();
    store.fail_on(FailPoint::Commit);

    let err = run(&dispatcher, &["puts", "k1", "v1", "k2", "v2"]).await.unwrap_err();
    assert!(err.is_store_error());

    assert!(store.is_empty());
    let stats = store.stats();
    assert_eq!(stats.commits, 0);
    assert_eq!(stats.rollbacks, 1);
}

#[tokio::test]
async fn test_begin_failure_is_store_error() {
    let (store, dispatcher) = setup();
    store.fail_on(FailPoint::Begin);

    let err = run(&dispatcher, &["put", "k", "v"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(store.is_empty());
}

// =============================================================================
// Del Tests
// =============================================================================

#[tokio::test]
async fn test_del_removes_all_keys() {
    let store = MemoryStore::with_pairs([("k1", "v1"), ("k2", "v2"), ("k3", "v3")]);
    let dispatcher = Dispatcher::new(store.clone());

    let out = run(&dispatcher, &["del", "k1", "k2"]).await.unwrap();
    assert_eq!(out, Output::Empty);

    assert!(matches!(
        run(&dispatcher, &["get", "k1"]).await,
        Err(ShellError::KeyNotFound(_))
    ));
    assert!(matches!(
        run(&dispatcher, &["get", "k2"]).await,
        Err(ShellError::KeyNotFound(_))
    ));
    assert_eq!(store.committed(b"k3"), Some(b"v3".to_vec()));
}

#[tokio::test]
async fn test_del_missing_key_is_ok() {
    let (_store, dispatcher) = setup();

    assert_eq!(run(&dispatcher, &["del", "ghost"]).await.unwrap(), Output::Empty);
}

#[tokio::test]
async fn test_del_is_atomic_when_a_delete_fails() {
    let store = MemoryStore::with_pairs([("k1", "v1"), ("k2", "v2")]);
    let dispatcher = Dispatcher::new(store.clone());
    store.fail_on(FailPoint::Delete);

    assert!(run(&dispatcher, &["del", "k1", "k2"]).await.is_err());

    assert_eq!(store.len(), 2);
}

// =============================================================================
// Seek Tests
// =============================================================================

#[tokio::test]
async fn test_seek_returns_ascending_keys_from_start() {
    let store = MemoryStore::with_pairs([
        ("bob", "200"),
        ("alice", "100"),
        ("aaron", "50"),
        ("carol", "300"),
    ]);
    let dispatcher = Dispatcher::new(store);

    let out = run(&dispatcher, &["seek", "alice", "10"]).await.unwrap();

    assert_eq!(keys(&out), vec![&b"alice"[..], &b"bob"[..], &b"carol"[..]]);
}

#[tokio::test]
async fn test_seek_respects_limit() {
    let store = MemoryStore::with_pairs((0..20).map(|i| (format!("key{:02}", i), "v")));
    let dispatcher = Dispatcher::new(store);

    let out = run(&dispatcher, &["seek", "key05", "3"]).await.unwrap();

    assert_eq!(keys(&out), vec![&b"key05"[..], &b"key06"[..], &b"key07"[..]]);
}

#[tokio::test]
async fn test_seek_zero_limit_is_empty() {
    let store = MemoryStore::with_pairs([("a", "1"), ("b", "2")]);
    let dispatcher = Dispatcher::new(store);

    let out = run(&dispatcher, &["seek", "a", "0"]).await.unwrap();

    assert_eq!(out, Output::Many(Vec::new()));
}

#[tokio::test]
async fn test_seek_past_last_key_is_empty() {
    let store = MemoryStore::with_pairs([("a", "1"), ("b", "2")]);
    let dispatcher = Dispatcher::new(store);

    let out = run(&dispatcher, &["seek", "z", "5"]).await.unwrap();

    assert!(out.records().is_empty());
}

#[tokio::test]
async fn test_seek_pages_across_batches() {
    let store = MemoryStore::with_pairs((0..50).map(|i| (format!("k{:03}", i), format!("{}", i))));
    let dispatcher = Dispatcher::new(store.clone()).with_scan_batch_size(7);

    let out = run(&dispatcher, &["seek", "k010", "25"]).await.unwrap();

    let expected: Vec<Vec<u8>> = (10..35).map(|i| format!("k{:03}", i).into_bytes()).collect();
    let got: Vec<Vec<u8>> = out.records().iter().map(|kv| kv.key.clone()).collect();
    assert_eq!(got, expected);

    // Read-only: released, never committed
    assert_eq!(store.stats().commits, 0);
    assert_eq!(store.stats().rollbacks, 1);
}

#[tokio::test]
async fn test_seek_stops_reading_once_limit_is_reached() {
    let store = PagedStore::new(ten_keys(), false);
    let dispatcher = Dispatcher::new(store.clone());

    let out = dispatcher.dispatch("seek", args(&["k0", "3"])).await.unwrap();

    assert_eq!(keys(&out), vec![&b"k0"[..], &b"k1"[..], &b"k2"[..]]);
    assert_eq!(store.scans(), 1);
}

#[tokio::test]
async fn test_seek_with_full_result_ignores_later_page_failures() {
    let store = PagedStore::new(ten_keys(), true);
    let dispatcher = Dispatcher::new(store.clone());

    let out = dispatcher.dispatch("seek", args(&["k0", "3"])).await.unwrap();

    assert_eq!(keys(&out), vec![&b"k0"[..], &b"k1"[..], &b"k2"[..]]);
    assert_eq!(store.inner.stats().rollbacks, 1);
}

#[tokio::test]
async fn test_seek_limit_spanning_pages_stops_at_limit() {
    let store = PagedStore::new(ten_keys(), false);
    let dispatcher = Dispatcher::new(store.clone()).with_scan_batch_size(2);

    let out = dispatcher.dispatch("seek", args(&["k0", "4"])).await.unwrap();

    assert_eq!(keys(&out).len(), 4);
    assert_eq!(store.scans(), 2);
}

#[tokio::test]
async fn test_seek_surfaces_scan_failure() {
    let store = MemoryStore::with_pairs([("a", "1")]);
    let dispatcher = Dispatcher::new(store.clone());
    store.fail_on(FailPoint::Scan);

    let err = run(&dispatcher, &["seek", "a", "1"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert_eq!(store.stats().rollbacks, 1);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_commands_never_begin_a_transaction() {
    let (store, dispatcher) = setup();

    let malformed: &[&[&str]] = &[
        &["put", "onlykey"],
        &["puts", "a", "b", "c"],
        &["puts"],
        &["get"],
        &["seek", "a"],
        &["seek", "a", "many"],
        &["del"],
    ];
    for line in malformed {
        let err = run(&dispatcher, line).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument, "line {:?}", line);
    }

    assert_eq!(store.stats(), StoreStats::default());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unknown_command_never_begins_a_transaction() {
    let (store, dispatcher) = setup();

    let err = run(&dispatcher, &["flush", "all"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert_eq!(store.stats(), StoreStats::default());
}
