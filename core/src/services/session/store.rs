//! Login session persistence

use chrono::Duration;
use vc_shared::config::auth::DEFAULT_SESSION_LIFETIME_SECONDS;
use vc_shared::SessionConfig;

use crate::domain::entities::session::Session;
use crate::domain::entities::token::lifetime_from_seconds;
use crate::errors::{DomainError, DomainResult, ResultExt, StoreError};
use crate::repositories::kv::keys::{session_key, ttl_seconds, user_sessions_key};
use crate::repositories::{KeyValueStore, Transaction};

/// Stores sessions under `session:<id>` with a per-owner id set in
/// `user_sessions:<owner>`
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    lifetime: Duration,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Creates a session store
    ///
    /// # Arguments
    ///
    /// * `store` - Key-value store holding sessions and owner indices
    /// * `lifetime` - Session lifetime, applied as the store TTL
    pub fn new(store: S, lifetime: Duration) -> Self {
        Self { store, lifetime }
    }

    pub fn from_config(store: S, config: &SessionConfig) -> Self {
        let lifetime = lifetime_from_seconds(
            "SESSION_LIFETIME",
            config.lifetime,
            Duration::seconds(DEFAULT_SESSION_LIFETIME_SECONDS),
        );
        Self::new(store, lifetime)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Builds a session for `owner_id` expiring after this store's lifetime
    pub fn new_session(
        &self,
        owner_id: &str,
        refresh_token: &str,
        device_info: &str,
        user_agent: &str,
        ip_address: &str,
    ) -> Session {
        Session::new(owner_id, refresh_token, self.lifetime)
            .with_device_info(device_info)
            .with_user_agent(user_agent)
            .with_ip_address(ip_address)
    }

    /// Persists `session` and adds it to its owner's index in one transaction
    pub async fn create(&self, session: &Session) -> DomainResult<()> {
        if session.user_id.is_empty() || session.id.is_empty() {
            return Err(DomainError::Validation {
                message: "Session requires an owner and an id".to_string(),
            });
        }
        let payload = serde_json::to_string(session)
            .map_err(StoreError::from)
            .context("create session")?;
        let ttl = ttl_seconds(self.lifetime);
        let index = user_sessions_key(&session.user_id);

        self.store
            .execute(
                Transaction::new()
                    .set_ex(session_key(&session.id), payload, ttl)
                    .set_add(index.clone(), session.id.clone())
                    .expire(index, ttl as i64),
            )
            .await
            .context("create session")?;

        tracing::info!(
            owner_id = %session.user_id,
            session_id = %session.id,
            event = "session_created",
            "Created login session"
        );
        Ok(())
    }

    /// Fetches a session by id
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::NotFound)` - Session absent or expired
    pub async fn get_by_id(&self, session_id: &str) -> DomainResult<Session> {
        let raw = self
            .store
            .get(&session_key(session_id))
            .await
            .context("get session")?
            .ok_or_else(|| not_found(session_id))?;
        decode(&raw)
    }

    /// Fetches a session only if it belongs to `owner_id`
    pub async fn get_by_owner_and_id(&self, owner_id: &str, session_id: &str) -> DomainResult<Session> {
        let owned = self
            .store
            .is_member(&user_sessions_key(owner_id), session_id)
            .await
            .context("get owner session")?;
        if !owned {
            return Err(not_found(session_id));
        }
        self.get_by_id(session_id).await
    }

    /// All live sessions of `owner_id`
    ///
    /// Index members whose session already expired are skipped.
    pub async fn get_by_owner_id(&self, owner_id: &str) -> DomainResult<Vec<Session>> {
        let ids = self
            .store
            .set_members(&user_sessions_key(owner_id))
            .await
            .context("list sessions")?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| session_key(id)).collect();
        let values = self.store.get_many(&keys).await.context("list sessions")?;

        let sessions = values
            .into_iter()
            .flatten()
            .map(|raw| decode(&raw))
            .collect::<DomainResult<Vec<_>>>()?;

        tracing::debug!(
            owner_id = owner_id,
            indexed = ids.len(),
            live = sessions.len(),
            "Loaded owner sessions"
        );
        Ok(sessions)
    }

    /// Deletes one session of `owner_id`
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::NotFound)` - The session is not in the owner's index
    pub async fn delete_owner_session(&self, owner_id: &str, session_id: &str) -> DomainResult<()> {
        let index = user_sessions_key(owner_id);
        let owned = self
            .store
            .is_member(&index, session_id)
            .await
            .context("delete session")?;
        if !owned {
            return Err(not_found(session_id));
        }

        self.store
            .execute(
                Transaction::new()
                    .delete([session_key(session_id)])
                    .set_remove(index, session_id),
            )
            .await
            .context("delete session")?;

        tracing::info!(
            owner_id = owner_id,
            session_id = session_id,
            event = "session_deleted",
            "Deleted login session"
        );
        Ok(())
    }

    /// Deletes every session of `owner_id` together with the index
    ///
    /// # Returns
    ///
    /// Number of sessions that were indexed
    pub async fn delete_all_owner_sessions(&self, owner_id: &str) -> DomainResult<usize> {
        let index = user_sessions_key(owner_id);
        let ids = self
            .store
            .set_members(&index)
            .await
            .context("delete all sessions")?;
        if ids.is_empty() {
            return Ok(0);
        }

        let removed = ids.len();
        let keys = ids
            .iter()
            .map(|id| session_key(id))
            .chain(std::iter::once(index));
        self.store
            .execute(Transaction::new().delete(keys))
            .await
            .context("delete all sessions")?;

        tracing::info!(
            owner_id = owner_id,
            removed = removed,
            event = "sessions_deleted",
            "Deleted all login sessions"
        );
        Ok(removed)
    }
}

fn not_found(session_id: &str) -> DomainError {
    DomainError::NotFound {
        resource: format!("session {}", session_id),
    }
}

fn decode(raw: &str) -> DomainResult<Session> {
    serde_json::from_str(raw)
        .map_err(StoreError::from)
        .context("decode session")
}
