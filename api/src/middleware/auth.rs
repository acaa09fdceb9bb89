//! Bearer token authentication middleware for protecting API endpoints.
//!
//! The middleware reads the `Authorization` header, validates the access
//! token with the signing service, and injects an `AuthContext` into the
//! request. Rejections are answered with 401 and the shared error body.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use vc_core::{
    domain::entities::token::Claims,
    errors::TokenError,
    services::jwt::JwtService,
};

use crate::handlers::error::ApiError;

/// Authenticated caller, injected into requests by `JwtAuth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Owner the access token was issued to
    pub user_id: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            expires_at: claims.expires_at(),
        }
    }
}

/// Access token authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    jwt_service: Arc<JwtService>,
}

impl JwtAuth {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            jwt_service: Arc::clone(&self.jwt_service),
        }))
    }
}

/// Access token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    jwt_service: Arc<JwtService>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let jwt_service = Arc::clone(&self.jwt_service);

        Box::pin(async move {
            match authenticate(&req, &jwt_service) {
                Ok(auth_context) => {
                    req.extensions_mut().insert(auth_context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Validates the bearer token of `req` as an access token
fn authenticate(req: &ServiceRequest, jwt_service: &JwtService) -> Result<AuthContext, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| TokenError::MalformedHeader {
            reason: "missing Authorization header".to_string(),
        })?
        .to_str()
        .map_err(|_| TokenError::MalformedHeader {
            reason: "Authorization header is not valid ASCII".to_string(),
        })?;

    let token = JwtService::extract_token(header)?;
    let claims = jwt_service.validate_access_token(token)?;
    Ok(AuthContext::from_claims(&claims))
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result: Result<Self, Self::Error> = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                ApiError::from(TokenError::MalformedHeader {
                    reason: "authentication required".to_string(),
                })
                .into()
            });

        ready(result)
    }
}
