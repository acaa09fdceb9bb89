use actix_web::{web, App, HttpServer};
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;

use vc_api::app::{configure_app, AppState};
use vc_api::telemetry::init_tracing;
use vc_infra::cache::{RedisClient, RedisKeyValueStore};
use vc_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = ?config.environment, "Starting VetClinic API Server");

    if config.auth.jwt.is_using_default_secret() {
        if config.environment.is_production() {
            error!("JWT_SECRET must be set in production");
            return Err(std::io::Error::other("JWT_SECRET must be set in production"));
        }
        warn!("Using the built-in development JWT secret");
    }

    let client = RedisClient::new(config.cache.clone())
        .await
        .map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(&config.auth, RedisKeyValueStore::new(client)));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(|cfg| configure_app(cfg, state.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
