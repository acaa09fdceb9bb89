//! Mock key-value store with switchable failures for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::StoreError;

use super::memory::MemoryKeyValueStore;
use super::r#trait::{KeyValueStore, Transaction};

/// Memory store whose reads and writes can be made to fail on demand
#[derive(Debug, Default)]
pub struct MockKeyValueStore {
    pub inner: MemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    transactions: AtomicUsize,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every call
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Transactions committed so far
    pub fn transaction_count(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::transport("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MockKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.get_many(keys).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.set_members(key).await
    }

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.is_member(key, member).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.exists(key).await
    }

    async fn execute(&self, transaction: Transaction) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.execute(transaction).await?;
        self.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
