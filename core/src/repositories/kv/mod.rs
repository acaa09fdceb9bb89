pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod keys;
pub mod memory;

pub use memory::MemoryKeyValueStore;
pub use r#trait::{KeyValueStore, StoreOp, Transaction};

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockKeyValueStore;
