//! Login session flows built on the signing service and the session store

use std::sync::Arc;

use constant_time_eq::constant_time_eq;

use crate::domain::entities::session::Session;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::KeyValueStore;
use crate::services::jwt::JwtService;
use crate::services::session::SessionStore;

use super::types::{LoginResult, SessionMetadata};

/// Session service used by the login, refresh and logout handlers
pub struct AuthSessionService<S: KeyValueStore> {
    /// Issues and verifies access and refresh tokens
    jwt_service: Arc<JwtService>,
    /// Persists login sessions
    sessions: Arc<SessionStore<S>>,
}

impl<S: KeyValueStore> AuthSessionService<S> {
    /// Create a new session service
    ///
    /// # Arguments
    ///
    /// * `jwt_service` - Signing service for the token pair
    /// * `sessions` - Store for login sessions
    pub fn new(jwt_service: Arc<JwtService>, sessions: Arc<SessionStore<S>>) -> Self {
        Self {
            jwt_service,
            sessions,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Issue a token pair for an authenticated user and open a session
    /// holding the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(LoginResult)` - The new session and its token pair
    /// * `Err(DomainError)` - Token issuance or session persistence failed
    pub async fn login(&self, owner_id: &str, metadata: SessionMetadata) -> DomainResult<LoginResult> {
        let tokens = self.jwt_service.generate_token_pair(owner_id)?;
        let session = self.sessions.new_session(
            owner_id,
            &tokens.refresh_token,
            &metadata.device_info,
            &metadata.user_agent,
            &metadata.ip_address,
        );
        self.sessions.create(&session).await?;

        tracing::info!(
            owner_id = owner_id,
            session_id = %session.id,
            event = "login",
            "User logged in"
        );
        Ok(LoginResult { session, tokens })
    }

    /// Mint a new access token for an existing session
    ///
    /// The refresh token must be valid, belong to `owner_id`, and be the one
    /// stored on the owner's session `session_id`.
    pub async fn refresh_session(
        &self,
        owner_id: &str,
        session_id: &str,
        refresh_token: &str,
    ) -> DomainResult<String> {
        let claims = self.jwt_service.validate_refresh_token(refresh_token)?;
        if claims.user_id != owner_id {
            tracing::warn!(
                owner_id = owner_id,
                session_id = session_id,
                event = "refresh_owner_mismatch",
                "Refresh token presented for another owner"
            );
            return Err(TokenError::NotFound.into());
        }

        let session = self.sessions.get_by_owner_and_id(owner_id, session_id).await?;
        if !constant_time_eq(session.refresh_token.as_bytes(), refresh_token.as_bytes()) {
            tracing::warn!(
                owner_id = owner_id,
                session_id = session_id,
                event = "refresh_token_mismatch",
                "Refresh token does not match the session"
            );
            return Err(TokenError::NotFound.into());
        }

        self.jwt_service.generate_access_token(owner_id)
    }

    /// Close one session
    pub async fn logout(&self, owner_id: &str, session_id: &str) -> DomainResult<()> {
        self.sessions.delete_owner_session(owner_id, session_id).await
    }

    /// Close every session of the owner, returning how many were open
    pub async fn logout_all(&self, owner_id: &str) -> DomainResult<usize> {
        self.sessions.delete_all_owner_sessions(owner_id).await
    }

    pub async fn list_sessions(&self, owner_id: &str) -> DomainResult<Vec<Session>> {
        self.sessions.get_by_owner_id(owner_id).await
    }
}
