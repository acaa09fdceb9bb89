//! Login session endpoints
//!
//! Refresh is authenticated by the refresh token in the body, since the
//! caller's access token has usually expired by then. The other endpoints
//! require a valid access token.

use std::sync::Arc;

use actix_web::{web, HttpResponse, Scope};
use vc_core::repositories::KeyValueStore;
use vc_core::services::jwt::JwtService;

use crate::app::AppState;
use crate::dto::sessions::{
    LogoutAllResponse, LogoutRequest, LogoutResponse, RefreshRequest, RefreshResponse,
    SessionResponse,
};
use crate::handlers::error::ApiError;
use crate::middleware::auth::{AuthContext, JwtAuth};

/// Routes mounted under `/sessions`
pub fn scope<S: KeyValueStore + 'static>(jwt_service: Arc<JwtService>) -> Scope {
    let auth = JwtAuth::new(jwt_service);

    web::scope("/sessions")
        .service(web::resource("/refresh").route(web::post().to(refresh::<S>)))
        .service(
            web::resource("")
                .wrap(auth.clone())
                .route(web::get().to(list_sessions::<S>)),
        )
        .service(
            web::resource("/logout")
                .wrap(auth.clone())
                .route(web::post().to(logout::<S>)),
        )
        .service(
            web::resource("/logout-all")
                .wrap(auth)
                .route(web::post().to(logout_all::<S>)),
        )
}

/// Handler for POST /api/v1/sessions/refresh
///
/// # Request Body
///
/// ```json
/// {
///     "session_id": "5f0c...",
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
/// - 401 Unauthorized: refresh token invalid, expired, or not the one held by the session
/// - 404 Not Found: session does not exist for this owner
/// - 503 Service Unavailable: session store unreachable
pub async fn refresh<S: KeyValueStore + 'static>(
    state: web::Data<AppState<S>>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let claims = state.jwt_service.validate_refresh_token(&request.refresh_token)?;

    let access_token = state
        .auth_service
        .refresh_session(&claims.user_id, &request.session_id, &request.refresh_token)
        .await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.config().access_token_lifetime.num_seconds(),
    }))
}

/// Handler for GET /api/v1/sessions
pub async fn list_sessions<S: KeyValueStore + 'static>(
    state: web::Data<AppState<S>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let sessions: Vec<SessionResponse> = state
        .auth_service
        .list_sessions(&auth.user_id)
        .await?
        .into_iter()
        .map(SessionResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(sessions))
}

/// Handler for POST /api/v1/sessions/logout
///
/// Closes one of the caller's sessions. A session belonging to another
/// owner is reported as not found.
pub async fn logout<S: KeyValueStore + 'static>(
    state: web::Data<AppState<S>>,
    auth: AuthContext,
    body: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    state
        .auth_service
        .logout(&auth.user_id, &body.session_id)
        .await?;

    Ok(HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Handler for POST /api/v1/sessions/logout-all
pub async fn logout_all<S: KeyValueStore + 'static>(
    state: web::Data<AppState<S>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let sessions_closed = state.auth_service.logout_all(&auth.user_id).await?;

    Ok(HttpResponse::Ok().json(LogoutAllResponse {
        message: "Logged out from all sessions".to_string(),
        sessions_closed,
    }))
}
