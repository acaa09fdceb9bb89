//! Key-value store contract backing the token and session stores.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::StoreError;

/// A single write inside a [`Transaction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Set a string value with a time-to-live in seconds
    SetEx {
        key: String,
        value: String,
        ttl_seconds: u64,
    },
    /// Add a member to a set
    SetAdd { key: String, member: String },
    /// Remove a member from a set
    SetRemove { key: String, member: String },
    /// Reset the time-to-live of an existing key
    Expire { key: String, ttl_seconds: i64 },
    /// Delete keys of any type
    Delete { keys: Vec<String> },
}

/// Ordered batch of writes applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    ops: Vec<StoreOp>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ex(mut self, key: impl Into<String>, value: impl Into<String>, ttl_seconds: u64) -> Self {
        self.ops.push(StoreOp::SetEx {
            key: key.into(),
            value: value.into(),
            ttl_seconds,
        });
        self
    }

    pub fn set_add(mut self, key: impl Into<String>, member: impl Into<String>) -> Self {
        self.ops.push(StoreOp::SetAdd {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn set_remove(mut self, key: impl Into<String>, member: impl Into<String>) -> Self {
        self.ops.push(StoreOp::SetRemove {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    pub fn expire(mut self, key: impl Into<String>, ttl_seconds: i64) -> Self {
        self.ops.push(StoreOp::Expire {
            key: key.into(),
            ttl_seconds,
        });
        self
    }

    /// Deletes `keys`; an empty list adds nothing
    pub fn delete<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if !keys.is_empty() {
            self.ops.push(StoreOp::Delete { keys });
        }
        self
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<StoreOp> {
        self.ops
    }
}

/// Minimal string + set key-value store
///
/// Reads are independent round trips. Every multi-key mutation goes through
/// [`KeyValueStore::execute`] so an entry and its owner index are created and
/// destroyed together.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a string value
    ///
    /// # Returns
    /// * `Ok(None)` - Key absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Fetch many string values in one round trip, positionally aligned with `keys`
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// All members of a set; empty when the set does not exist
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Apply every op in `transaction` atomically
    async fn execute(&self, transaction: Transaction) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        (**self).get_many(keys).await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        (**self).set_members(key).await
    }

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        (**self).is_member(key, member).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key).await
    }

    async fn execute(&self, transaction: Transaction) -> Result<(), StoreError> {
        (**self).execute(transaction).await
    }
}
