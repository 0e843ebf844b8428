use crate::{
    entities::{consumption_log, item},
    errors::ServiceError,
    handlers::UserContext,
    services::items::{ItemChanges, ItemFilter, NewItem, NewTransaction, TransactionOutcome},
    ApiCreated, ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Bulk import body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportItemsRequest {
    pub items: Vec<NewItem>,
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ItemFilter
    ),
    responses(
        (status = 200, description = "Items listed", body = ApiResponse<Vec<item::Model>>),
        (status = 401, description = "Missing or invalid user", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: UserContext,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Vec<item::Model>> {
    let items = state.services.items.list_items(user.user_id, filter).await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<item::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid user", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<NewItem>,
) -> ApiCreated<item::Model> {
    let created = state.services.items.create_item(user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    post,
    path = "/api/v1/items/import",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = ImportItemsRequest,
    responses(
        (status = 201, description = "Items imported", body = ApiResponse<Vec<item::Model>>),
        (status = 400, description = "Invalid row in batch", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn import_items(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<ImportItemsRequest>,
) -> ApiCreated<Vec<item::Model>> {
    let created = state
        .services
        .items
        .import_items(user.user_id, payload.items)
        .await?;
    let message = format!("Imported {} item(s)", created.len());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(created, message)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item fetched", body = ApiResponse<item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<item::Model> {
    let item = state.services.items.get_item(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = ItemChanges,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<item::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemChanges>,
) -> ApiResult<item::Model> {
    let updated = state
        .services
        .items
        .update_item(user.user_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item, its events and its logs deleted"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.items.delete_item(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/items/:id/transactions",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Transactions listed, newest first", body = ApiResponse<Vec<consumption_log::Model>>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<consumption_log::Model>> {
    let logs = state
        .services
        .items
        .list_transactions(user.user_id, id)
        .await?;
    Ok(Json(ApiResponse::success(logs)))
}

#[utoipa::path(
    post,
    path = "/api/v1/items/:id/transactions",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = NewTransaction,
    responses(
        (status = 201, description = "Stock moved", body = ApiResponse<TransactionOutcome>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Consumption exceeds stock on hand", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn record_transaction(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewTransaction>,
) -> ApiCreated<TransactionOutcome> {
    let outcome = state
        .services
        .items
        .record_transaction(user.user_id, id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}
