//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and shared handles
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and their conversion into domain values
//! - `extract.rs`: JSON body extractor with API-shaped rejections
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use stocktrack_infra::Config;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Pick the store backend described by `config`.
pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    match config.database_url.as_deref() {
        Some(url) => services::connect(url, config.database_max_connections).await,
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory inventory store");
            Ok(AppServices::in_memory())
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(routes::system::not_found)
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_tracing))
                .layer(axum::middleware::map_response(
                    middleware::method_not_allowed_as_json,
                )),
        )
}
