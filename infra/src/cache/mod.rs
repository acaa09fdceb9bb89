//! Cache module for Redis-backed storage
//!
//! This module provides the Redis client with connection management and
//! retry logic, and the key-value store the core services persist tokens
//! and sessions through.

pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
pub use redis_store::RedisKeyValueStore;

// Re-export commonly used types
pub use vc_shared::config::cache::CacheConfig;
