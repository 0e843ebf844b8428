use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        calendar_event::{self, EventType},
        item,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Inclusive lower bound on the event date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the event date
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_completed: bool,
    pub item_id: Option<Uuid>,
}

/// A manually scheduled event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewCalendarEvent {
    pub event_type: EventType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub date: NaiveDate,
    pub item_id: Option<Uuid>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl NewCalendarEvent {
    fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }
}

#[derive(Clone)]
pub struct CalendarService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl CalendarService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    async fn find_owned(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<calendar_event::Model, ServiceError> {
        calendar_event::Entity::find_by_id(event_id)
            .filter(calendar_event::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Calendar event", event_id))
    }

    /// Events in date order, optionally bounded and filtered.
    pub async fn list_events(
        &self,
        user_id: Uuid,
        query: EventQuery,
    ) -> Result<Vec<calendar_event::Model>, ServiceError> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(ServiceError::InvalidInput(
                    "`from` must not be after `to`".into(),
                ));
            }
        }

        let mut condition = Condition::all().add(calendar_event::Column::UserId.eq(user_id));
        if let Some(from) = query.from {
            condition = condition.add(calendar_event::Column::Date.gte(from));
        }
        if let Some(to) = query.to {
            condition = condition.add(calendar_event::Column::Date.lte(to));
        }
        if !query.include_completed {
            condition = condition.add(calendar_event::Column::Completed.eq(false));
        }
        if let Some(item_id) = query.item_id {
            condition = condition.add(calendar_event::Column::ItemId.eq(item_id));
        }

        let events = calendar_event::Entity::find()
            .filter(condition)
            .order_by_asc(calendar_event::Column::Date)
            .order_by_asc(calendar_event::Column::Title)
            .all(&*self.db)
            .await?;
        Ok(events)
    }

    /// Schedules a manual event.
    ///
    /// Derivable types may not be linked to an item: those events are owned
    /// by the synchronizer, which would otherwise rewrite or delete them.
    #[instrument(skip(self, input), fields(event_type = input.event_type.as_str()))]
    pub async fn create_event(
        &self,
        user_id: Uuid,
        input: NewCalendarEvent,
    ) -> Result<calendar_event::Model, ServiceError> {
        let input = input.normalized();
        input.validate()?;
        let db = &*self.db;

        if let Some(item_id) = input.item_id {
            if input.event_type.is_derivable() {
                return Err(ServiceError::InvalidInput(format!(
                    "{} events for an item are scheduled from the item's fields",
                    input.event_type.as_str()
                )));
            }

            item::Entity::find_by_id(item_id)
                .filter(item::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Item", item_id))?;
        }

        let created = calendar_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            item_id: Set(input.item_id),
            r#type: Set(input.event_type.as_str().to_string()),
            title: Set(input.title),
            date: Set(input.date),
            completed: Set(false),
            completed_at: Set(None),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::CalendarEventCreated {
                    user_id,
                    event_id: created.id,
                    event_type: input.event_type,
                    date: created.date,
                })
                .await;
        }
        Ok(created)
    }

    /// Marks an event done. Completing an already completed event is a no-op
    /// that keeps the original completion time.
    #[instrument(skip(self))]
    pub async fn complete_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<calendar_event::Model, ServiceError> {
        let existing = self.find_owned(user_id, event_id).await?;
        if existing.completed {
            return Ok(existing);
        }

        let mut active: calendar_event::ActiveModel = existing.into();
        active.completed = Set(true);
        active.completed_at = Set(Some(Utc::now()));
        let completed = active.update(&*self.db).await?;

        info!(%event_id, "Calendar event completed");
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::CalendarEventCompleted { user_id, event_id })
                .await;
        }
        Ok(completed)
    }

    pub async fn delete_event(&self, user_id: Uuid, event_id: Uuid) -> Result<(), ServiceError> {
        self.find_owned(user_id, event_id).await?;
        calendar_event::Entity::delete_by_id(event_id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}
