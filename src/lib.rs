//! Stockpile library
//!
//! Household preparedness inventory: supplies, storage locations, consumption
//! logs, lifecycle reminders derived from item fields, and readiness dashboards.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services =
            handlers::AppServices::new(db.clone(), event_sender.clone(), config.dashboard.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Result type for endpoints answering `201 Created`
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let dashboard = Router::new().route("/dashboard", get(handlers::dashboard::get_dashboard));

    let items = Router::new()
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route("/items/import", post(handlers::items::import_items))
        .route(
            "/items/:id",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        )
        .route(
            "/items/:id/transactions",
            get(handlers::items::list_transactions).post(handlers::items::record_transaction),
        );

    let calendar = Router::new()
        .route(
            "/events",
            get(handlers::calendar::list_events).post(handlers::calendar::create_event),
        )
        .route(
            "/events/:id/complete",
            post(handlers::calendar::complete_event),
        )
        .route(
            "/events/:id",
            axum::routing::delete(handlers::calendar::delete_event),
        );

    let catalog = Router::new()
        .route(
            "/categories",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        )
        .route(
            "/locations",
            get(handlers::catalog::list_locations).post(handlers::catalog::create_location),
        )
        .route(
            "/locations/:id",
            axum::routing::delete(handlers::catalog::delete_location),
        );

    let household = Router::new()
        .route(
            "/family-members",
            get(handlers::household::list_members).post(handlers::household::add_member),
        )
        .route(
            "/family-members/:id",
            axum::routing::delete(handlers::household::remove_member),
        )
        .route(
            "/settings",
            get(handlers::household::get_settings).put(handlers::household::update_settings),
        );

    Router::new()
        .merge(dashboard)
        .merge(items)
        .merge(calendar)
        .merge(catalog)
        .merge(household)
        .route("/health", get(handlers::health::health_check))
}

/// Full application router: versioned API plus the OpenAPI document.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .with_state(state)
}
