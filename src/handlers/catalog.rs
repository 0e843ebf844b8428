use crate::{
    entities::{category, location},
    errors::ServiceError,
    handlers::UserContext,
    services::catalog::{CategoryChanges, NewCategory, NewLocation},
    ApiCreated, ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    responses(
        (status = 200, description = "Categories listed", body = ApiResponse<Vec<category::Model>>)
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Vec<category::Model>> {
    let categories = state.services.catalog.list_categories(user.user_id).await?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<category::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<NewCategory>,
) -> ApiCreated<category::Model> {
    let created = state
        .services
        .catalog
        .create_category(user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryChanges,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<category::Model>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryChanges>,
) -> ApiResult<category::Model> {
    let updated = state
        .services
        .catalog
        .update_category(user.user_id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category still has items", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .catalog
        .delete_category(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    responses(
        (status = 200, description = "Locations listed", body = ApiResponse<Vec<location::Model>>)
    ),
    tag = "catalog"
)]
pub async fn list_locations(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Vec<location::Model>> {
    let locations = state.services.catalog.list_locations(user.user_id).await?;
    Ok(Json(ApiResponse::success(locations)))
}

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = NewLocation,
    responses(
        (status = 201, description = "Location created", body = ApiResponse<location::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn create_location(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<NewLocation>,
) -> ApiCreated<location::Model> {
    let created = state
        .services
        .catalog
        .create_location(user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/locations/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Location ID")
    ),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Location still has items", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn delete_location(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .catalog
        .delete_location(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
