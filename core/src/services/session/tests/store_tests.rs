//! Unit tests for session persistence

use std::sync::Arc;

use chrono::Duration;
use vc_shared::SessionConfig;

use crate::repositories::kv::keys::{session_key, user_sessions_key};
use crate::repositories::{KeyValueStore, MockKeyValueStore};
use crate::services::session::SessionStore;

fn session_store(lifetime: Duration) -> (SessionStore<Arc<MockKeyValueStore>>, Arc<MockKeyValueStore>) {
    let store = Arc::new(MockKeyValueStore::new());
    (SessionStore::new(store.clone(), lifetime), store)
}

#[tokio::test(start_paused = true)]
async fn test_create_writes_session_and_index() {
    let (sessions, store) = session_store(Duration::hours(2));
    let session = sessions.new_session("owner-1", "refresh-token", "Pixel 8", "VetClinic/2.0", "10.0.0.7");

    sessions.create(&session).await.unwrap();

    assert!(store.exists(&session_key(&session.id)).await.unwrap());
    assert!(store
        .is_member(&user_sessions_key("owner-1"), &session.id)
        .await
        .unwrap());
    assert_eq!(
        store.inner.ttl(&session_key(&session.id)).await,
        Some(std::time::Duration::from_secs(7200))
    );
    assert_eq!(
        store.inner.ttl(&user_sessions_key("owner-1")).await,
        Some(std::time::Duration::from_secs(7200))
    );
    assert_eq!(store.transaction_count(), 1);
}

#[tokio::test]
async fn test_lifetime_comes_from_config() {
    let store = Arc::new(MockKeyValueStore::new());
    let sessions = SessionStore::from_config(store, &SessionConfig::default());
    assert_eq!(sessions.lifetime(), Duration::days(30));

    let session = sessions.new_session("owner-1", "rt", "", "", "");
    assert_eq!(session.expires_at - session.created_at, Duration::days(30));
}

#[tokio::test]
async fn test_out_of_range_config_lifetime_keeps_default() {
    let store = Arc::new(MockKeyValueStore::new());
    let config = SessionConfig { lifetime: i64::MAX };
    let sessions = SessionStore::from_config(store, &config);
    assert_eq!(sessions.lifetime(), Duration::days(30));
}

#[tokio::test]
async fn test_get_by_id_round_trip() {
    let (sessions, _store) = session_store(Duration::hours(1));
    let session = sessions.new_session("owner-1", "refresh-token", "iPad", "Safari", "192.168.1.2");
    sessions.create(&session).await.unwrap();

    assert_eq!(sessions.get_by_id(&session.id).await.unwrap(), session);

    let err = sessions.get_by_id("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_by_owner_and_id_checks_ownership() {
    let (sessions, _store) = session_store(Duration::hours(1));
    let session = sessions.new_session("owner-1", "rt", "", "", "");
    sessions.create(&session).await.unwrap();

    assert!(sessions.get_by_owner_and_id("owner-1", &session.id).await.is_ok());
    let err = sessions
        .get_by_owner_and_id("owner-2", &session.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_by_owner_id_skips_missing_entries() {
    let (sessions, store) = session_store(Duration::hours(1));
    let first = sessions.new_session("owner-1", "rt-1", "", "", "");
    let second = sessions.new_session("owner-1", "rt-2", "", "", "");
    sessions.create(&first).await.unwrap();
    sessions.create(&second).await.unwrap();

    // Entry gone but index member left behind
    store
        .execute(crate::repositories::Transaction::new().delete([session_key(&first.id)]))
        .await
        .unwrap();

    let live = sessions.get_by_owner_id("owner-1").await.unwrap();
    assert_eq!(live, vec![second]);
    assert!(sessions.get_by_owner_id("owner-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_owner_session() {
    let (sessions, store) = session_store(Duration::hours(1));
    let keep = sessions.new_session("owner-1", "rt-1", "", "", "");
    let revoked = sessions.new_session("owner-1", "rt-2", "", "", "");
    sessions.create(&keep).await.unwrap();
    sessions.create(&revoked).await.unwrap();

    sessions.delete_owner_session("owner-1", &revoked.id).await.unwrap();

    assert!(sessions.get_by_id(&revoked.id).await.unwrap_err().is_not_found());
    assert!(!store
        .is_member(&user_sessions_key("owner-1"), &revoked.id)
        .await
        .unwrap());
    assert!(sessions.get_by_id(&keep.id).await.is_ok());
}

#[tokio::test]
async fn test_cannot_delete_another_owners_session() {
    let (sessions, _store) = session_store(Duration::hours(1));
    let session = sessions.new_session("owner-1", "rt", "", "", "");
    sessions.create(&session).await.unwrap();

    let err = sessions
        .delete_owner_session("owner-2", &session.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(sessions.get_by_id(&session.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_all_owner_sessions() {
    let (sessions, store) = session_store(Duration::hours(1));
    for n in 0..3 {
        let session = sessions.new_session("owner-1", &format!("rt-{}", n), "", "", "");
        sessions.create(&session).await.unwrap();
    }
    let other = sessions.new_session("owner-2", "rt", "", "", "");
    sessions.create(&other).await.unwrap();

    assert_eq!(sessions.delete_all_owner_sessions("owner-1").await.unwrap(), 3);
    assert!(sessions.get_by_owner_id("owner-1").await.unwrap().is_empty());
    assert!(!store.exists(&user_sessions_key("owner-1")).await.unwrap());
    assert!(sessions.get_by_id(&other.id).await.is_ok());

    assert_eq!(sessions.delete_all_owner_sessions("owner-1").await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sessions_expire_with_store_ttl() {
    let (sessions, _store) = session_store(Duration::minutes(1));
    let session = sessions.new_session("owner-1", "rt", "", "", "");
    sessions.create(&session).await.unwrap();

    tokio::time::advance(std::time::Duration::from_secs(60)).await;

    assert!(sessions.get_by_id(&session.id).await.unwrap_err().is_not_found());
    assert!(sessions.get_by_owner_id("owner-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_outage_is_transient() {
    let (sessions, store) = session_store(Duration::hours(1));
    let session = sessions.new_session("owner-1", "rt", "", "", "");
    store.set_fail_writes(true);

    let err = sessions.create(&session).await.unwrap_err();
    assert!(err.is_transient());

    store.set_fail_reads(true);
    let err = sessions.get_by_id(&session.id).await.unwrap_err();
    assert!(err.is_transient());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_create_requires_owner() {
    let (sessions, store) = session_store(Duration::hours(1));
    let session = sessions.new_session("", "rt", "", "", "");

    assert!(sessions.create(&session).await.is_err());
    assert!(store.inner.is_empty().await);
}
