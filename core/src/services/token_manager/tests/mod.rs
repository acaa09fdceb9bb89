//! Tests for the stateful token store


use std::sync::Arc;

use crate::repositories::MockKeyValueStore;
use crate::services::token::TokenFactory;
use crate::services::token_manager::TokenManager;

pub(super) const TEST_SECRET: &[u8] = b"token-manager-test-secret";

pub(super) fn manager() -> (TokenManager<Arc<MockKeyValueStore>>, Arc<MockKeyValueStore>) {
    let store = Arc::new(MockKeyValueStore::new());
    let manager = TokenManager::new(store.clone(), TokenFactory::new(TEST_SECRET));
    (manager, store)
}
