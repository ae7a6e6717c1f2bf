use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::ServiceInfo;
use crate::app::errors::json_error;
use crate::app::services::AppServices;

/// Service metadata.
pub async fn index(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    (StatusCode::OK, Json(ServiceInfo::new(services.started_at())))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "OK" })))
}

pub async fn not_found(uri: axum::http::Uri) -> axum::response::Response {
    tracing::warn!(path = %uri.path(), "no route");
    json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("The requested URL {} was not found on this server.", uri.path()),
    )
}
