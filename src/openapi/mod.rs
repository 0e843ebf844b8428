use axum::response::Json;
use utoipa::OpenApi;

use crate::{
    entities::{calendar_event, category, consumption_log, family_member, item, location, user_settings},
    errors::ErrorResponse,
    handlers,
    services::{
        calendar::{EventQuery, NewCalendarEvent},
        catalog::{CategoryChanges, NewCategory, NewLocation},
        dashboard::{
            CategoryGoalProgress, DashboardStats, FoodSupply, LowStockItem, MaintenanceDue,
            SupplyGoalProgress, SupplyKind, SupplyTotals, UpcomingEvent, UpcomingExpiration,
        },
        household::{FamilyMemberView, NewFamilyMember, SettingsChanges},
        items::{ItemChanges, ItemFilter, NewItem, NewTransaction, TransactionOutcome},
        nutrition::ActivityLevel,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockpile API",
        version = "0.1.0",
        description = r#"
# Stockpile

Household preparedness inventory: supplies across storage locations, stock
movements with an audit trail, reminders derived from expiration, maintenance
and rotation fields, and a readiness dashboard.

## User context

Every endpoint except `/health` acts on behalf of the user named in the
`x-user-id` header (a UUID). A missing or malformed header yields `401`.

## Errors

Failures share one body shape:

```json
{
  "error": "Not Found",
  "message": "Not found: Item 550e8400-e29b-41d4-a716-446655440000 not found",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
"#
    ),
    paths(
        handlers::dashboard::get_dashboard,
        handlers::items::list_items,
        handlers::items::create_item,
        handlers::items::import_items,
        handlers::items::get_item,
        handlers::items::update_item,
        handlers::items::delete_item,
        handlers::items::list_transactions,
        handlers::items::record_transaction,
        handlers::calendar::list_events,
        handlers::calendar::create_event,
        handlers::calendar::complete_event,
        handlers::calendar::delete_event,
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_locations,
        handlers::catalog::create_location,
        handlers::catalog::delete_location,
        handlers::household::list_members,
        handlers::household::add_member,
        handlers::household::remove_member,
        handlers::household::get_settings,
        handlers::household::update_settings,
        handlers::health::health_check,
    ),
    components(
        schemas(
            ErrorResponse,
            item::Model,
            category::Model,
            location::Model,
            calendar_event::Model,
            calendar_event::EventType,
            consumption_log::Model,
            consumption_log::TransactionKind,
            family_member::Model,
            user_settings::Model,
            NewItem,
            ItemChanges,
            ItemFilter,
            NewTransaction,
            TransactionOutcome,
            handlers::items::ImportItemsRequest,
            EventQuery,
            NewCalendarEvent,
            NewCategory,
            CategoryChanges,
            NewLocation,
            NewFamilyMember,
            FamilyMemberView,
            SettingsChanges,
            ActivityLevel,
            DashboardStats,
            SupplyTotals,
            FoodSupply,
            CategoryGoalProgress,
            SupplyGoalProgress,
            SupplyKind,
            LowStockItem,
            UpcomingExpiration,
            MaintenanceDue,
            UpcomingEvent,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "dashboard", description = "Readiness summary"),
        (name = "items", description = "Supplies and stock movements"),
        (name = "calendar", description = "Expiration, maintenance and rotation reminders"),
        (name = "catalog", description = "Categories and storage locations"),
        (name = "household", description = "Family members and settings"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDocV1;

/// Serves the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
