//! In-process key-value store with Redis-like TTL semantics.
//!
//! Used by tests and single-node development setups. Expiry is measured with
//! `tokio::time::Instant` so paused-clock tests can advance past a TTL.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::errors::StoreError;

use super::r#trait::{KeyValueStore, StoreOp, Transaction};

#[derive(Debug, Clone)]
enum Value {
    String(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Transactions between sweeps of expired keys
const SWEEP_INTERVAL: u64 = 1024;

/// Memory-backed [`KeyValueStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    transactions: Arc<AtomicU64>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time-to-live of a live key; `None` if absent or persistent
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|entry| entry.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn wrong_type(key: &str) -> StoreError {
        StoreError::transport(format!(
            "WRONGTYPE operation against key {} holding the wrong kind of value",
            key
        ))
    }

    /// Keys an operation may modify
    fn touched_keys(op: &StoreOp) -> Vec<&str> {
        match op {
            StoreOp::SetEx { key, .. }
            | StoreOp::SetAdd { key, .. }
            | StoreOp::SetRemove { key, .. }
            | StoreOp::Expire { key, .. } => vec![key.as_str()],
            StoreOp::Delete { keys } => keys.iter().map(String::as_str).collect(),
        }
    }

    fn apply(map: &mut HashMap<String, Entry>, op: StoreOp, now: Instant) -> Result<(), StoreError> {
        // Expired keys behave as absent for every op
        let live = |map: &HashMap<String, Entry>, key: &str| {
            map.get(key).map_or(false, |entry| entry.is_live(now))
        };

        match op {
            StoreOp::SetEx {
                key,
                value,
                ttl_seconds,
            } => {
                if ttl_seconds == 0 {
                    return Err(StoreError::transport("invalid expire time in 'setex' command"));
                }
                map.insert(
                    key,
                    Entry {
                        value: Value::String(value),
                        expires_at: Some(now + Duration::from_secs(ttl_seconds)),
                    },
                );
            }
            StoreOp::SetAdd { key, member } => {
                if !live(map, &key) {
                    map.insert(
                        key.clone(),
                        Entry {
                            value: Value::Set(HashSet::new()),
                            expires_at: None,
                        },
                    );
                }
                match map.get_mut(&key).map(|entry| &mut entry.value) {
                    Some(Value::Set(members)) => {
                        members.insert(member);
                    }
                    _ => return Err(Self::wrong_type(&key)),
                }
            }
            StoreOp::SetRemove { key, member } => {
                if !live(map, &key) {
                    return Ok(());
                }
                let now_empty = match map.get_mut(&key).map(|entry| &mut entry.value) {
                    Some(Value::Set(members)) => {
                        members.remove(&member);
                        members.is_empty()
                    }
                    _ => return Err(Self::wrong_type(&key)),
                };
                if now_empty {
                    map.remove(&key);
                }
            }
            StoreOp::Expire { key, ttl_seconds } => {
                if !live(map, &key) {
                    return Ok(());
                }
                if ttl_seconds <= 0 {
                    map.remove(&key);
                } else if let Some(entry) = map.get_mut(&key) {
                    entry.expires_at = Some(now + Duration::from_secs(ttl_seconds as u64));
                }
            }
            StoreOp::Delete { keys } => {
                for key in keys {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key).filter(|entry| entry.is_live(now)) {
            None => Ok(None),
            Some(Entry {
                value: Value::String(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        // MGET reports non-string keys as nil
        Ok(keys
            .iter()
            .map(|key| match entries.get(key).filter(|entry| entry.is_live(now)) {
                Some(Entry {
                    value: Value::String(value),
                    ..
                }) => Some(value.clone()),
                _ => None,
            })
            .collect())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key).filter(|entry| entry.is_live(now)) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        match entries.get(key).filter(|entry| entry.is_live(now)) {
            None => Ok(false),
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => Ok(members.contains(member)),
            Some(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries.get(key).map_or(false, |entry| entry.is_live(now)))
    }

    async fn execute(&self, transaction: Transaction) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        // Prior state of every touched key, restored if any op fails
        let mut undo: HashMap<String, Option<Entry>> = HashMap::new();
        for op in transaction.into_ops() {
            for key in Self::touched_keys(&op) {
                if undo.contains_key(key) {
                    continue;
                }
                // Expired keys are dropped here; they read as absent anyway
                let prior = match entries.remove(key) {
                    Some(entry) if entry.is_live(now) => {
                        entries.insert(key.to_string(), entry.clone());
                        Some(entry)
                    }
                    _ => None,
                };
                undo.insert(key.to_string(), prior);
            }

            if let Err(err) = Self::apply(&mut entries, op, now) {
                for (key, prior) in undo {
                    match prior {
                        Some(entry) => {
                            entries.insert(key, entry);
                        }
                        None => {
                            entries.remove(&key);
                        }
                    }
                }
                return Err(err);
            }
        }

        if self.transactions.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            entries.retain(|_, entry| entry.is_live(now));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_ex_and_get() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_ex("k", "v", 10))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert!(store.exists("k").await.unwrap());
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(
                Transaction::new()
                    .set_ex("k", "v", 5)
                    .set_add("s", "k")
                    .expire("s", 10),
            )
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.set_members("s").await.unwrap(), vec!["k".to_string()]);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(store.set_members("s").await.unwrap().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_many_aligns_with_keys() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_ex("a", "1", 10).set_ex("c", "3", 10).set_add("s", "x"))
            .await
            .unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string(), "s".to_string()];
        assert_eq!(
            store.get_many(&keys).await.unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_removing_last_member_drops_set() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_add("s", "a").expire("s", 10))
            .await
            .unwrap();
        assert!(store.is_member("s", "a").await.unwrap());

        store
            .execute(Transaction::new().set_remove("s", "a"))
            .await
            .unwrap();
        assert!(!store.exists("s").await.unwrap());
        assert!(!store.is_member("s", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_transaction_applies_nothing() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_ex("str", "v", 10))
            .await
            .unwrap();

        let result = store
            .execute(
                Transaction::new()
                    .set_ex("other", "v", 10)
                    .set_add("str", "member"),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Transport { .. })));
        assert!(!store.exists("other").await.unwrap());
        assert_eq!(store.get("str").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_failed_transaction_restores_overwritten_and_deleted_keys() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(
                Transaction::new()
                    .set_ex("a", "old", 10)
                    .set_ex("b", "kept", 10)
                    .set_ex("str", "v", 10),
            )
            .await
            .unwrap();

        let result = store
            .execute(
                Transaction::new()
                    .set_ex("a", "new", 10)
                    .set_ex("a", "newer", 10)
                    .delete(vec!["b".to_string()])
                    .set_add("str", "member"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("a").await.unwrap(), Some("old".to_string()));
        assert_eq!(store.get("b").await.unwrap(), Some("kept".to_string()));
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_keys_are_swept() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_ex("short", "v", 1))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        for i in 0..SWEEP_INTERVAL {
            store
                .execute(Transaction::new().set_ex(format!("k{}", i % 4), "v", 60))
                .await
                .unwrap();
        }
        assert!(!store.entries.read().await.contains_key("short"));
    }

    #[tokio::test]
    async fn test_expire_on_missing_key_is_noop() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().expire("missing", 10))
            .await
            .unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.ttl("missing").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_reports_remaining_time() {
        let store = MemoryKeyValueStore::new();
        store
            .execute(Transaction::new().set_ex("k", "v", 30))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.ttl("k").await, Some(Duration::from_secs(20)));
    }
}
