//! # DevConnect API Server
//!
//! Actix-web application: routes, session extractors, error mapping and
//! state wiring. The binary in `main.rs` only loads configuration and binds.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
pub mod views;

use actix_web::web;

use crate::middleware::error::AppError;

/// Register JSON body limits and all routes.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(1 << 20)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .configure(handlers::configure_routes);
}
