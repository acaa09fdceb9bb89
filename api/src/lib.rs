//! # VetClinic API
//!
//! HTTP layer over the token and session core: bearer authentication,
//! access token refresh, logout and session listing.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
