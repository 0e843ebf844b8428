#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use stockpile::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::{category, item, location},
    events::{self, EventSender},
    handlers::{AppServices, USER_ID_HEADER},
    services::{
        catalog::{NewCategory, NewLocation},
        items::NewItem,
    },
    AppState,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub user_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // A single long-lived connection keeps the in-memory database alive.
        let pool = db::establish_connection_with_config(&DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout: Duration::from_secs(3600),
            ..Default::default()
        })
        .await
        .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = stockpile::app_router(state.clone());

        Self {
            router,
            state,
            user_id: Uuid::new_v4(),
            _event_task: event_task,
        }
    }

    pub fn services(&self) -> &AppServices {
        &self.state.services
    }

    /// Sends a request as the harness user.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request_as(Some(self.user_id), method, path, body).await
    }

    /// Sends a request as `user`, or without the user header when `None`.
    pub async fn request_as(
        &self,
        user: Option<Uuid>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user_id) = user {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn seed_category(&self, name: &str, target_quantity: f64) -> category::Model {
        self.seed_category_for(self.user_id, name, target_quantity).await
    }

    pub async fn seed_category_for(
        &self,
        user_id: Uuid,
        name: &str,
        target_quantity: f64,
    ) -> category::Model {
        self.services()
            .catalog
            .create_category(
                user_id,
                NewCategory {
                    name: name.to_string(),
                    color: "#22c55e".to_string(),
                    icon: "package".to_string(),
                    target_quantity,
                },
            )
            .await
            .expect("seed category")
    }

    pub async fn seed_location(&self, name: &str) -> location::Model {
        self.seed_location_for(self.user_id, name).await
    }

    pub async fn seed_location_for(&self, user_id: Uuid, name: &str) -> location::Model {
        self.services()
            .catalog
            .create_location(
                user_id,
                NewLocation {
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .expect("seed location")
    }

    pub async fn seed_item(&self, input: NewItem) -> item::Model {
        self.services()
            .items
            .create_item(self.user_id, input)
            .await
            .expect("seed item")
    }
}

/// A minimal valid item payload.
pub fn new_item(category: &category::Model, location: &location::Model, name: &str) -> NewItem {
    NewItem {
        category_id: category.id,
        location_id: location.id,
        name: name.to_string(),
        quantity: 1.0,
        unit: "each".to_string(),
        expiration_date: None,
        maintenance_interval: None,
        last_maintenance_date: None,
        rotation_schedule: None,
        last_rotation_date: None,
        min_quantity: 0.0,
        target_quantity: 0.0,
        calories_per_unit: None,
        notes: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
