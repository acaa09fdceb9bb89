//! Stateful token store for store-backed token kinds

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;

use crate::domain::entities::token::{StoredToken, TokenClaims, TokenConfig, TokenKind};
use crate::errors::{DomainResult, ResultExt, StoreError, TokenError};
use crate::repositories::kv::keys::{token_key, ttl_seconds, user_tokens_key};
use crate::repositories::{KeyValueStore, Transaction};
use crate::services::token::TokenFactory;

use super::lifetimes::TokenLifetimes;

/// A stored entry located through the owner+kind index
struct IndexedEntry {
    key: String,
    token: StoredToken,
}

/// Issues, validates and revokes tokens that need server-side state
///
/// Self-verifying kinds pass straight through to the token variant and never
/// touch the store. Every other kind is persisted as a [`StoredToken`] under
/// `token:<owner>_<kind>_<timestamp>` and indexed in `user_tokens:<owner>:<kind>`.
pub struct TokenManager<S: KeyValueStore> {
    store: S,
    factory: TokenFactory,
    lifetimes: TokenLifetimes,
    last_timestamp: AtomicI64,
}

impl<S: KeyValueStore> TokenManager<S> {
    /// Creates a new token manager
    ///
    /// # Arguments
    ///
    /// * `store` - Key-value store holding entries and indices
    /// * `factory` - Builds the token variant for each kind
    pub fn new(store: S, factory: TokenFactory) -> Self {
        Self {
            store,
            factory,
            lifetimes: TokenLifetimes::default(),
            last_timestamp: AtomicI64::new(0),
        }
    }

    /// Replaces the per-kind default lifetimes
    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    /// Issuance config for `owner_id` with the configured lifetime of `kind`
    pub fn config_for(&self, kind: TokenKind, owner_id: &str) -> TokenConfig {
        TokenConfig::new(owner_id, self.lifetimes.for_kind(kind))
    }

    /// Nanosecond timestamp, strictly increasing across calls on this instance
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
        let mut previous = self.last_timestamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(previous.saturating_add(1));
            match self.last_timestamp.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }

    /// Generates a token of `kind` and persists it when the kind needs state
    ///
    /// Entry and index are written in one transaction: the entry lives for the
    /// token lifetime (at least one second), the index for twice that.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The token value to hand to the user
    /// * `Err(DomainError)` - Empty owner, random source failure, or store failure
    pub async fn generate_token(&self, kind: TokenKind, config: TokenConfig) -> DomainResult<String> {
        self.generate_inner(kind, config)
            .await
            .with_context(|| format!("generate {} token", kind))
    }

    async fn generate_inner(&self, kind: TokenKind, config: TokenConfig) -> DomainResult<String> {
        if config.owner_id.is_empty() {
            return Err(TokenError::MissingOwner.into());
        }
        let lifetime = config.lifetime;
        let owner_id = config.owner_id.clone();

        let mut token = self.factory.create_token(kind, config)?;
        let value = token.generate()?;
        if kind.is_self_verifying() {
            return Ok(value);
        }

        let expires_at = token.expires_at().ok_or_else(|| TokenError::GenerationFailed {
            reason: "token has no expiry after generation".to_string(),
        })?;
        let stored = StoredToken {
            token_string: value.clone(),
            token_type: kind,
            user_id: owner_id.clone(),
            expires_at,
        };
        let payload = serde_json::to_string(&stored).map_err(StoreError::from)?;

        let key = token_key(&owner_id, kind, self.next_timestamp());
        let index = user_tokens_key(&owner_id, kind);
        let ttl = ttl_seconds(lifetime);

        self.store
            .execute(
                Transaction::new()
                    .set_ex(key.clone(), payload, ttl)
                    .set_add(index.clone(), key.clone())
                    .expire(index, (ttl * 2) as i64),
            )
            .await?;

        tracing::info!(
            owner_id = %owner_id,
            kind = %kind,
            ttl_seconds = ttl,
            event = "token_issued",
            "Stored new token"
        );
        tracing::debug!(key = %key, "Token entry written");

        Ok(value)
    }

    /// Validates `token` as a `kind` token belonging to `owner_id`
    ///
    /// Store-backed kinds are looked up only within the owner's index.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenClaims)` - Claims of the matching token
    /// * `Err(DomainError)` - `NotFound` when no entry matches, `Expired` when
    ///   the matching entry is past its expiry, or a store failure
    pub async fn validate_token(
        &self,
        owner_id: &str,
        token: &str,
        kind: TokenKind,
    ) -> DomainResult<TokenClaims> {
        self.validate_token_at(owner_id, token, kind, Utc::now()).await
    }

    pub async fn validate_token_at(
        &self,
        owner_id: &str,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> DomainResult<TokenClaims> {
        self.validate_inner(owner_id, token, kind, now)
            .await
            .map(|(_, claims)| claims)
            .with_context(|| format!("validate {} token", kind))
    }

    async fn validate_inner(
        &self,
        owner_id: &str,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> DomainResult<(Option<IndexedEntry>, TokenClaims)> {
        let validator = self.factory.validator(kind)?;
        if kind.is_self_verifying() {
            let claims = validator.validate_at(token, now)?;
            // An empty owner accepts any holder, matching the signing service
            if !owner_id.is_empty() && claims.owner_id() != owner_id {
                tracing::warn!(
                    owner_id = owner_id,
                    kind = %kind,
                    event = "token_owner_mismatch",
                    "Signed token belongs to another owner"
                );
                return Err(TokenError::NotFound.into());
            }
            return Ok((None, claims));
        }

        if token.is_empty() {
            return Err(TokenError::EmptyToken.into());
        }
        if owner_id.is_empty() {
            return Err(TokenError::MissingOwner.into());
        }
        validator.check_format(token)?;

        let entry = self
            .find_entry(owner_id, kind, token)
            .await?
            .ok_or(TokenError::NotFound)?;
        if entry.token.is_expired_at(now) {
            tracing::warn!(
                owner_id = owner_id,
                kind = %kind,
                event = "token_expired",
                "Presented token matched an expired entry"
            );
            return Err(TokenError::Expired.into());
        }

        let claims = entry.token.to_claims();
        Ok((Some(entry), claims))
    }

    /// Scans the owner's index for an entry whose value matches `token`
    async fn find_entry(
        &self,
        owner_id: &str,
        kind: TokenKind,
        token: &str,
    ) -> DomainResult<Option<IndexedEntry>> {
        let entries = self.load_entries(owner_id, kind).await?;
        Ok(entries.into_iter().find(|entry| {
            entry.token.user_id == owner_id
                && entry.token.token_type == kind
                && constant_time_eq(entry.token.token_string.as_bytes(), token.as_bytes())
        }))
    }

    /// Live entries referenced by the owner's index, in one batched read
    async fn load_entries(&self, owner_id: &str, kind: TokenKind) -> DomainResult<Vec<IndexedEntry>> {
        let index = user_tokens_key(owner_id, kind);
        let keys = self.store.set_members(&index).await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.store.get_many(&keys).await?;
        tracing::debug!(
            index = %index,
            members = keys.len(),
            "Loaded token index"
        );

        let mut entries = Vec::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(values) {
            // Entry expired before its index member; skip it
            let Some(value) = value else { continue };
            let token: StoredToken = serde_json::from_str(&value).map_err(StoreError::from)?;
            entries.push(IndexedEntry { key, token });
        }
        Ok(entries)
    }

    /// Revokes a single token
    ///
    /// # Returns
    ///
    /// * `Err(DomainError)` - `NotFound` when no entry matches
    pub async fn invalidate_token(&self, owner_id: &str, kind: TokenKind, token: &str) -> DomainResult<()> {
        self.invalidate_inner(owner_id, kind, token)
            .await
            .with_context(|| format!("invalidate {} token", kind))
    }

    async fn invalidate_inner(&self, owner_id: &str, kind: TokenKind, token: &str) -> DomainResult<()> {
        if token.is_empty() {
            return Err(TokenError::EmptyToken.into());
        }
        if owner_id.is_empty() {
            return Err(TokenError::MissingOwner.into());
        }
        let entry = self
            .find_entry(owner_id, kind, token)
            .await?
            .ok_or(TokenError::NotFound)?;
        self.remove_entry(owner_id, kind, &entry).await
    }

    async fn remove_entry(&self, owner_id: &str, kind: TokenKind, entry: &IndexedEntry) -> DomainResult<()> {
        let index = user_tokens_key(owner_id, kind);
        self.store
            .execute(
                Transaction::new()
                    .delete([entry.key.clone()])
                    .set_remove(index, entry.key.clone()),
            )
            .await?;

        tracing::info!(
            owner_id = owner_id,
            kind = %kind,
            event = "token_revoked",
            "Revoked token"
        );
        Ok(())
    }

    /// Revokes every token of `kind` for `owner_id`
    ///
    /// # Returns
    ///
    /// Number of index members removed
    pub async fn invalidate_all_user_tokens(&self, owner_id: &str, kind: TokenKind) -> DomainResult<usize> {
        self.invalidate_all_inner(owner_id, kind)
            .await
            .with_context(|| format!("invalidate all {} tokens", kind))
    }

    async fn invalidate_all_inner(&self, owner_id: &str, kind: TokenKind) -> DomainResult<usize> {
        if owner_id.is_empty() {
            return Err(TokenError::MissingOwner.into());
        }
        let index = user_tokens_key(owner_id, kind);
        let keys = self.store.set_members(&index).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed = keys.len();
        self.store
            .execute(Transaction::new().delete(keys.into_iter().chain(std::iter::once(index))))
            .await?;

        tracing::info!(
            owner_id = owner_id,
            kind = %kind,
            removed = removed,
            event = "tokens_revoked",
            "Revoked all tokens of kind"
        );
        Ok(removed)
    }

    /// Live stored tokens of `kind` for `owner_id`
    pub async fn list_user_tokens(&self, owner_id: &str, kind: TokenKind) -> DomainResult<Vec<StoredToken>> {
        let now = Utc::now();
        let entries = self
            .load_entries(owner_id, kind)
            .await
            .with_context(|| format!("list {} tokens", kind))?;
        Ok(entries
            .into_iter()
            .map(|entry| entry.token)
            .filter(|token| !token.is_expired_at(now))
            .collect())
    }

    /// Validates a store-backed token and revokes it in the same call
    ///
    /// Plain [`validate_token`](Self::validate_token) never consumes; flows
    /// that need single-use codes call this instead.
    pub async fn consume_token(
        &self,
        owner_id: &str,
        token: &str,
        kind: TokenKind,
    ) -> DomainResult<TokenClaims> {
        self.consume_inner(owner_id, token, kind)
            .await
            .with_context(|| format!("consume {} token", kind))
    }

    async fn consume_inner(&self, owner_id: &str, token: &str, kind: TokenKind) -> DomainResult<TokenClaims> {
        if kind.is_self_verifying() {
            return Err(TokenError::InvalidTokenType {
                kind: kind.to_string(),
            }
            .into());
        }
        let (entry, claims) = self.validate_inner(owner_id, token, kind, Utc::now()).await?;
        let entry = entry.ok_or(TokenError::NotFound)?;
        self.remove_entry(owner_id, kind, &entry).await?;
        Ok(claims)
    }
}
