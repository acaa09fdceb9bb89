//! Application state and factory
//!
//! This module builds the shared services from configuration and registers
//! every route on an Actix-web application.

use std::sync::Arc;

use actix_web::web;
use vc_core::repositories::KeyValueStore;
use vc_core::services::auth::AuthSessionService;
use vc_core::services::jwt::{JwtService, JwtServiceConfig};
use vc_core::services::session::SessionStore;
use vc_shared::config::AuthConfig;

use crate::routes;

/// Services shared by all handlers
pub struct AppState<S: KeyValueStore> {
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthSessionService<S>>,
}

impl<S: KeyValueStore> AppState<S> {
    /// Build the signing service and session service over `store`
    pub fn new(config: &AuthConfig, store: S) -> Self {
        let jwt_service = Arc::new(JwtService::new(JwtServiceConfig::from(&config.jwt)));
        let sessions = Arc::new(SessionStore::from_config(store, &config.session));
        let auth_service = Arc::new(AuthSessionService::new(jwt_service.clone(), sessions));

        Self {
            jwt_service,
            auth_service,
        }
    }
}

/// Registers the application data and all routes
///
/// Used by the server bootstrap and by the HTTP tests.
pub fn configure_app<S: KeyValueStore + 'static>(
    cfg: &mut web::ServiceConfig,
    state: web::Data<AppState<S>>,
) {
    let jwt_service = state.jwt_service.clone();
    cfg.app_data(state)
        .route("/health", web::get().to(routes::health::health_check))
        .service(
            web::scope("/api/v1").service(routes::sessions::scope::<S>(jwt_service)),
        );
}
