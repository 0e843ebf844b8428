pub mod calendar;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod household;
pub mod items;

use crate::config::DashboardConfig;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{
    calendar::CalendarService, catalog::CatalogService, dashboard::DashboardService,
    event_sync::EventSyncService, household::HouseholdService, items::ItemService,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Header carrying the acting user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<ItemService>,
    pub event_sync: Arc<EventSyncService>,
    pub calendar: Arc<CalendarService>,
    pub catalog: Arc<CatalogService>,
    pub household: Arc<HouseholdService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        event_sender: EventSender,
        dashboard_config: DashboardConfig,
    ) -> Self {
        let event_sync = EventSyncService::new(db_pool.clone(), Some(event_sender.clone()));
        let items = ItemService::new(
            db_pool.clone(),
            event_sync.clone(),
            Some(event_sender.clone()),
        );

        Self {
            items: Arc::new(items),
            event_sync: Arc::new(event_sync),
            calendar: Arc::new(CalendarService::new(
                db_pool.clone(),
                Some(event_sender),
            )),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            household: Arc::new(HouseholdService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(db_pool, dashboard_config)),
        }
    }
}

/// The user every request acts on behalf of, taken from the `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ServiceError::Unauthorized("missing x-user-id header".into()))?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| ServiceError::Unauthorized("invalid x-user-id header".into()))?;

        Ok(Self { user_id })
    }
}
