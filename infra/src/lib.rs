//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the VetClinic backend.
//! It provides the Redis implementation of the key-value store that the
//! token manager and the session store persist to.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client with retry logic, and `RedisKeyValueStore`
//!   which runs every multi-key write as a single MULTI/EXEC transaction

use vc_core::errors::StoreError;

/// Cache module - Redis client and key-value store
pub mod cache;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services

    pub use vc_shared::config::cache::CacheConfig;
}

pub use cache::{RedisClient, RedisKeyValueStore};

/// Connect the Redis key-value store using `REDIS_*` environment variables
///
/// A `.env` file is loaded first when present.
pub async fn initialize() -> Result<RedisKeyValueStore, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    dotenvy::dotenv().ok();
    let config = config::CacheConfig::from_env();
    let client = RedisClient::new(config).await?;

    tracing::info!("Infrastructure services initialized successfully");
    Ok(RedisKeyValueStore::new(client))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(err: InfrastructureError) -> Self {
        StoreError::transport(err.to_string())
    }
}
