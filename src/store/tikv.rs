//! TiKV store
//!
//! Transactional client connected through the cluster's placement driver.

use async_trait::async_trait;
use tikv_client::{CheckLevel, TransactionClient, TransactionOptions};

use crate::error::Result;
use crate::kv::KeyValue;

use super::{Store, Transaction};

/// Connection to a TiKV cluster
pub struct TikvStore {
    client: TransactionClient,
}

impl TikvStore {
    /// Connect to the cluster through its placement driver endpoints
    pub async fn connect(pd_endpoints: &[String]) -> Result<Self> {
        tracing::debug!("Connecting to placement driver at {:?}", pd_endpoints);
        let client = TransactionClient::new(pd_endpoints.to_vec()).await?;
        tracing::info!("Connected to TiKV cluster via {}", pd_endpoints.join(","));
        Ok(Self { client })
    }
}

#[async_trait]
impl Store for TikvStore {
    type Txn = TikvTransaction;

    async fn begin(&self) -> Result<TikvTransaction> {
        // Dropping an unfinished transaction logs a warning instead of panicking.
        let options = TransactionOptions::new_optimistic().drop_check(CheckLevel::Warn);
        let inner = self.client.begin_with_options(options).await?;
        Ok(TikvTransaction { inner })
    }
}

/// Optimistic TiKV transaction
pub struct TikvTransaction {
    inner: tikv_client::Transaction,
}

#[async_trait]
impl Transaction for TikvTransaction {
    async fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.get(key.to_vec()).await?)
    }

    async fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.put(key.to_vec(), value.to_vec()).await?;
        Ok(())
    }

    async fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.inner.delete(key.to_vec()).await?;
        Ok(())
    }

    async fn scan(&mut self, start: &[u8], limit: u32) -> Result<Vec<KeyValue>> {
        let pairs = self.inner.scan(start.to_vec().., limit).await?;
        Ok(pairs
            .map(|pair| KeyValue::new(Vec::<u8>::from(pair.0), pair.1))
            .collect())
    }

    async fn commit(&mut self) -> Result<()> {
        let commit_ts = self.inner.commit().await?;
        tracing::trace!("Committed at {:?}", commit_ts);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}
