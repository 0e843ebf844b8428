use crate::{
    entities::calendar_event,
    errors::ServiceError,
    handlers::UserContext,
    services::calendar::{EventQuery, NewCalendarEvent},
    ApiCreated, ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        EventQuery
    ),
    responses(
        (status = 200, description = "Events listed in date order", body = ApiResponse<Vec<calendar_event::Model>>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn list_events(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<EventQuery>,
) -> ApiResult<Vec<calendar_event::Model>> {
    let events = state
        .services
        .calendar
        .list_events(user.user_id, query)
        .await?;
    Ok(Json(ApiResponse::success(events)))
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    params(("x-user-id" = String, Header, description = "Acting user id (UUID)")),
    request_body = NewCalendarEvent,
    responses(
        (status = 201, description = "Event scheduled", body = ApiResponse<calendar_event::Model>),
        (status = 400, description = "Invalid event, or a derivable type linked to an item", body = crate::errors::ErrorResponse),
        (status = 404, description = "Linked item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: UserContext,
    Json(payload): Json<NewCalendarEvent>,
) -> ApiCreated<calendar_event::Model> {
    let created = state
        .services
        .calendar
        .create_event(user.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    post,
    path = "/api/v1/events/:id/complete",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Calendar event ID")
    ),
    responses(
        (status = 200, description = "Event completed", body = ApiResponse<calendar_event::Model>),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn complete_event(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> ApiResult<calendar_event::Model> {
    let completed = state
        .services
        .calendar
        .complete_event(user.user_id, id)
        .await?;
    Ok(Json(ApiResponse::success(completed)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/events/:id",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)"),
        ("id" = Uuid, Path, description = "Calendar event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "calendar"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .calendar
        .delete_event(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
