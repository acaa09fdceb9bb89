//! Tests for the Redis client and store
