use crate::{
    handlers::UserContext, services::dashboard::DashboardStats, ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(
        ("x-user-id" = String, Header, description = "Acting user id (UUID)")
    ),
    responses(
        (status = 200, description = "Dashboard computed", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Missing or invalid user", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: UserContext,
) -> ApiResult<DashboardStats> {
    let stats = state
        .services
        .dashboard
        .compute_dashboard_stats(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(stats)))
}
