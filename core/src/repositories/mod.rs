//! Storage seam for tokens and sessions.

pub mod kv;

pub use kv::{KeyValueStore, MemoryKeyValueStore, StoreOp, Transaction};

#[cfg(test)]
pub use kv::MockKeyValueStore;
