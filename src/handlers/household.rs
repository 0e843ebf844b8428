use crate::{
    entities::user_settings,
    errors::ServiceError,
    handlers::UserContext,
    services::household::{FamilyMemberView, NewFamilyMember, SettingsChanges},
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
    path = "/api/v1/family-members",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    responses(
        (status = 200, description = "Family members with BMR", body = ApiResponse<Vec<FamilyMemberView>>)
    ),
    tag = "household"
)]
pub async fn list_members(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<Vec<FamilyMemberView>> {
    let members = state.services.household.list_members(user.user_id).await?;
    Ok(Json(ApiResponse::success(members)))
}

#[utoipa::path(
    post,
    path = "/api/v1/family-members",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = NewFamilyMember,
    responses(
        (status = 201, description = "Family member added", body = ApiResponse<FamilyMemberView>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "household"
)]
pub async fn add_member(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<NewFamilyMember>,
) -> ApiCreated<FamilyMemberView> {
    let member = state
        .services
        .household
        .add_member(user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/family-members/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Family member ID")
    ),
    responses(
        (status = 204, description = "Family member removed"),
        (status = 404, description = "Family member not found", body = crate::errors::ErrorResponse)
    ),
    tag = "household"
)]
pub async fn remove_member(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .household
        .remove_member(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    responses(
        (status = 200, description = "Settings, created with defaults on first access", body = ApiResponse<user_settings::Model>)
    ),
    tag = "household"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<user_settings::Model> {
    let settings = state.services.household.get_settings(user.user_id).await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = SettingsChanges,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<user_settings::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "household"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<SettingsChanges>,
) -> ApiResult<user_settings::Model> {
    let settings = state
        .services
        .household
        .update_settings(user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(settings)))
}
