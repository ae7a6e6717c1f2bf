use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use stocktrack_core::ItemId;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/restock", put(restock_item))
}

fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse::<ItemId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid inventory item id '{raw}'")))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::info!(?query, "request for inventory list");

    let filter = query.into_filter()?;
    let items = services.store().list(&filter).await?;

    tracing::info!(count = items.len(), "returning inventory items");
    Ok((StatusCode::OK, Json(items)).into_response())
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<dto::InventoryItemRequest>,
) -> Result<Response, ApiError> {
    tracing::info!("request to create an inventory item");

    let fields = body.into_fields()?;
    let item = services.store().create(fields).await?;

    tracing::info!(id = %item.id, product_id = item.product_id, "inventory item created");
    let location = format!("/inventory/{}", item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)).into_response())
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    tracing::info!(%id, "request to retrieve an inventory item");

    let item = services.store().get(id).await?;
    Ok((StatusCode::OK, Json(item)).into_response())
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<dto::InventoryItemRequest>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    tracing::info!(%id, "request to update an inventory item");

    let changes = body.into_changes()?;
    let item = services.store().update(id, changes).await?;

    tracing::info!(%id, "inventory item updated");
    Ok((StatusCode::OK, Json(item)).into_response())
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    tracing::info!(%id, "request to delete an inventory item");

    let removed = services.store().delete(id).await?;

    tracing::info!(%id, removed, "inventory item delete complete");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn restock_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    tracing::info!(%id, "request to restock an inventory item");

    let item = services.store().restock(id).await?;

    tracing::info!(%id, quantity = item.quantity, "inventory item restock complete");
    Ok((StatusCode::OK, Json(item)).into_response())
}
