//! Redis implementation of the key-value store
//!
//! Reads map to single commands. A `Transaction` becomes one atomic
//! pipeline (MULTI ... EXEC), so a token entry and its owner index, or a
//! session and its owner index, are always written together.

use async_trait::async_trait;
use redis::{AsyncCommands, Pipeline, RedisError};
use tracing::{debug, error};

use vc_core::errors::StoreError;
use vc_core::repositories::{KeyValueStore, StoreOp, Transaction};

use super::redis_client::RedisClient;

/// Key-value store backed by Redis
#[derive(Debug, Clone)]
pub struct RedisKeyValueStore {
    client: RedisClient,
}

impl RedisKeyValueStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

/// Builds the MULTI/EXEC pipeline for `transaction`, in operation order
pub(crate) fn build_pipeline(transaction: Transaction) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();

    for op in transaction.into_ops() {
        match op {
            StoreOp::SetEx {
                key,
                value,
                ttl_seconds,
            } => {
                pipe.set_ex(key, value, ttl_seconds).ignore();
            }
            StoreOp::SetAdd { key, member } => {
                pipe.sadd(key, member).ignore();
            }
            StoreOp::SetRemove { key, member } => {
                pipe.srem(key, member).ignore();
            }
            StoreOp::Expire { key, ttl_seconds } => {
                pipe.expire(key, ttl_seconds).ignore();
            }
            StoreOp::Delete { keys } => {
                pipe.del(keys).ignore();
            }
        }
    }
    pipe
}

fn store_error(operation: &str, err: RedisError) -> StoreError {
    error!("Redis {} failed: {}", operation, err);
    StoreError::transport(err.to_string())
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        debug!("Getting key '{}'", key);
        self.client
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.get::<_, Option<String>>(key).await })
            })
            .await
            .map_err(|e| store_error("GET", e))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        // MGET with no keys is a Redis error
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Getting {} keys", keys.len());

        self.client
            .execute_with_retry(|mut conn| {
                let keys = keys.to_vec();
                Box::pin(async move {
                    redis::cmd("MGET")
                        .arg(keys)
                        .query_async::<_, Vec<Option<String>>>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| store_error("MGET", e))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        debug!("Listing members of '{}'", key);
        self.client
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.smembers::<_, Vec<String>>(key).await })
            })
            .await
            .map_err(|e| store_error("SMEMBERS", e))
    }

    async fn is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.client
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                let member = member.to_string();
                Box::pin(async move { conn.sismember::<_, _, bool>(key, member).await })
            })
            .await
            .map_err(|e| store_error("SISMEMBER", e))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.client
            .execute_with_retry(|mut conn| {
                let key = key.to_string();
                Box::pin(async move { conn.exists::<_, bool>(key).await })
            })
            .await
            .map_err(|e| store_error("EXISTS", e))
    }

    async fn execute(&self, transaction: Transaction) -> Result<(), StoreError> {
        if transaction.is_empty() {
            return Ok(());
        }
        debug!("Executing transaction with {} operations", transaction.ops().len());
        let pipe = build_pipeline(transaction);

        self.client
            .execute_with_retry(|mut conn| {
                let pipe = pipe.clone();
                Box::pin(async move { pipe.query_async::<_, ()>(&mut conn).await })
            })
            .await
            .map_err(|e| store_error("MULTI/EXEC", e))
    }
}
