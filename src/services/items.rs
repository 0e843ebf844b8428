use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        calendar_event, category,
        consumption_log::{self, TransactionKind},
        item, location,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        event_sync::{reconcile_on, EventSyncService},
        not_blank,
    },
};

/// Payload for creating or importing an item
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewItem {
    pub category_id: Uuid,
    pub location_id: Uuid,
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    #[validate(length(min = 1, max = 50), custom = "not_blank")]
    pub unit: String,
    pub expiration_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub maintenance_interval: Option<i32>,
    pub last_maintenance_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub rotation_schedule: Option<i32>,
    pub last_rotation_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min_quantity: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub target_quantity: f64,
    #[validate(range(min = 0.0))]
    pub calories_per_unit: Option<f64>,
    pub notes: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update. For nullable fields an explicit `null` clears the value
/// and an absent field leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ItemChanges {
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub expiration_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub maintenance_interval: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub last_maintenance_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub rotation_schedule: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub last_rotation_date: Option<Option<NaiveDate>>,
    pub min_quantity: Option<f64>,
    pub target_quantity: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub calories_per_unit: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl ItemChanges {
    fn validate_values(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError("name must not be empty".into()));
            }
        }
        if let Some(unit) = &self.unit {
            if unit.trim().is_empty() {
                return Err(ServiceError::ValidationError("unit must not be empty".into()));
            }
        }
        for (field, value) in [
            ("quantity", self.quantity),
            ("min_quantity", self.min_quantity),
            ("target_quantity", self.target_quantity),
            ("calories_per_unit", self.calories_per_unit.flatten()),
        ] {
            if matches!(value, Some(v) if v < 0.0 || !v.is_finite()) {
                return Err(ServiceError::ValidationError(format!(
                    "{} must be a non-negative number",
                    field
                )));
            }
        }
        for (field, value) in [
            ("maintenance_interval", self.maintenance_interval.flatten()),
            ("rotation_schedule", self.rotation_schedule.flatten()),
        ] {
            if matches!(value, Some(days) if days < 1) {
                return Err(ServiceError::ValidationError(format!(
                    "{} must be at least 1 day",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    /// Substring match on the item name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    #[validate(range(min = 0.000001))]
    pub quantity: f64,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Item state after a stock movement together with its audit row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionOutcome {
    pub item: item::Model,
    pub log: consumption_log::Model,
}

/// Item CRUD, stock movements and bulk import. Every write that touches
/// lifecycle fields is followed by event reconciliation.
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DatabaseConnection>,
    event_sync: EventSyncService,
    event_sender: Option<EventSender>,
}

impl ItemService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sync: EventSyncService,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            db,
            event_sync,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }

    /// Fails unless every referenced category and location belongs to the user.
    async fn ensure_references<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        category_ids: &HashSet<Uuid>,
        location_ids: &HashSet<Uuid>,
    ) -> Result<(), ServiceError> {
        if !category_ids.is_empty() {
            let found = category::Entity::find()
                .filter(category::Column::UserId.eq(user_id))
                .filter(category::Column::Id.is_in(category_ids.iter().copied()))
                .count(conn)
                .await?;
            if found as usize != category_ids.len() {
                return Err(ServiceError::InvalidInput(
                    "Unknown category for this user".into(),
                ));
            }
        }
        if !location_ids.is_empty() {
            let found = location::Entity::find()
                .filter(location::Column::UserId.eq(user_id))
                .filter(location::Column::Id.is_in(location_ids.iter().copied()))
                .count(conn)
                .await?;
            if found as usize != location_ids.len() {
                return Err(ServiceError::InvalidInput(
                    "Unknown location for this user".into(),
                ));
            }
        }
        Ok(())
    }

    fn active_model(user_id: Uuid, input: NewItem) -> item::ActiveModel {
        item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            category_id: Set(input.category_id),
            location_id: Set(input.location_id),
            name: Set(input.name.trim().to_string()),
            quantity: Set(input.quantity),
            unit: Set(input.unit.trim().to_string()),
            expiration_date: Set(input.expiration_date),
            maintenance_interval: Set(input.maintenance_interval),
            last_maintenance_date: Set(input.last_maintenance_date),
            rotation_schedule: Set(input.rotation_schedule),
            last_rotation_date: Set(input.last_rotation_date),
            min_quantity: Set(input.min_quantity),
            target_quantity: Set(input.target_quantity),
            calories_per_unit: Set(input.calories_per_unit),
            notes: Set(input.notes),
            ..Default::default()
        }
    }

    async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(item_id)
            .filter(item::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Item", item_id))
    }

    /// Creates an item and its derived calendar events.
    ///
    /// The item row is committed before reconciliation runs; a reconciliation
    /// failure is returned to the caller with the item already stored.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_item(
        &self,
        user_id: Uuid,
        input: NewItem,
    ) -> Result<item::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db;

        Self::ensure_references(
            db,
            user_id,
            &HashSet::from([input.category_id]),
            &HashSet::from([input.location_id]),
        )
        .await?;

        let created = Self::active_model(user_id, input).insert(db).await.map_err(|e| {
            error!("Failed to insert item: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.event_sync.reconcile_item_events(&created).await?;

        counter!("stockpile_items.created", 1);
        info!(item_id = %created.id, "Item created");
        self.emit(Event::ItemCreated {
            user_id,
            item_id: created.id,
        })
        .await;

        Ok(created)
    }

    /// Applies a partial update and re-derives the item's calendar events.
    #[instrument(skip(self, changes))]
    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<item::Model, ServiceError> {
        changes.validate_values()?;
        let db = &*self.db;

        let existing = Self::find_owned(db, user_id, item_id).await?;

        let category_ids: HashSet<Uuid> = changes.category_id.into_iter().collect();
        let location_ids: HashSet<Uuid> = changes.location_id.into_iter().collect();
        Self::ensure_references(db, user_id, &category_ids, &location_ids).await?;

        let mut active: item::ActiveModel = existing.into();
        if let Some(v) = changes.category_id {
            active.category_id = Set(v);
        }
        if let Some(v) = changes.location_id {
            active.location_id = Set(v);
        }
        if let Some(v) = changes.name {
            active.name = Set(v.trim().to_string());
        }
        if let Some(v) = changes.quantity {
            active.quantity = Set(v);
        }
        if let Some(v) = changes.unit {
            active.unit = Set(v.trim().to_string());
        }
        if let Some(v) = changes.expiration_date {
            active.expiration_date = Set(v);
        }
        if let Some(v) = changes.maintenance_interval {
            active.maintenance_interval = Set(v);
        }
        if let Some(v) = changes.last_maintenance_date {
            active.last_maintenance_date = Set(v);
        }
        if let Some(v) = changes.rotation_schedule {
            active.rotation_schedule = Set(v);
        }
        if let Some(v) = changes.last_rotation_date {
            active.last_rotation_date = Set(v);
        }
        if let Some(v) = changes.min_quantity {
            active.min_quantity = Set(v);
        }
        if let Some(v) = changes.target_quantity {
            active.target_quantity = Set(v);
        }
        if let Some(v) = changes.calories_per_unit {
            active.calories_per_unit = Set(v);
        }
        if let Some(v) = changes.notes {
            active.notes = Set(v);
        }

        let updated = active.update(db).await.map_err(|e| {
            error!("Failed to update item {}: {}", item_id, e);
            ServiceError::DatabaseError(e)
        })?;

        self.event_sync.reconcile_item_events(&updated).await?;

        info!(%item_id, "Item updated");
        self.emit(Event::ItemUpdated { user_id, item_id }).await;

        Ok(updated)
    }

    /// Removes an item together with its calendar events and consumption logs.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        Self::find_owned(&txn, user_id, item_id).await?;

        let events = calendar_event::Entity::delete_many()
            .filter(calendar_event::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
        let logs = consumption_log::Entity::delete_many()
            .filter(consumption_log::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
        item::Entity::delete_by_id(item_id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit item deletion: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        counter!("stockpile_items.deleted", 1);
        info!(
            %item_id,
            events_removed = events.rows_affected,
            logs_removed = logs.rows_affected,
            "Item deleted"
        );
        self.emit(Event::ItemDeleted { user_id, item_id }).await;
        Ok(())
    }

    pub async fn get_item(&self, user_id: Uuid, item_id: Uuid) -> Result<item::Model, ServiceError> {
        Self::find_owned(&*self.db, user_id, item_id).await
    }

    pub async fn list_items(
        &self,
        user_id: Uuid,
        filter: ItemFilter,
    ) -> Result<Vec<item::Model>, ServiceError> {
        let mut condition = Condition::all().add(item::Column::UserId.eq(user_id));
        if let Some(category_id) = filter.category_id {
            condition = condition.add(item::Column::CategoryId.eq(category_id));
        }
        if let Some(location_id) = filter.location_id {
            condition = condition.add(item::Column::LocationId.eq(location_id));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(item::Column::Name.contains(search));
        }

        let items = item::Entity::find()
            .filter(condition)
            .order_by_asc(item::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Moves stock in or out and writes the audit row in the same transaction.
    #[instrument(skip(self, input), fields(kind = %input.kind, quantity = input.quantity))]
    pub async fn record_transaction(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        input: NewTransaction,
    ) -> Result<TransactionOutcome, ServiceError> {
        input.validate()?;
        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let current = Self::find_owned(&txn, user_id, item_id).await?;
        let old_quantity = current.quantity;
        let new_quantity = match input.kind {
            TransactionKind::Consumption => old_quantity - input.quantity,
            TransactionKind::Addition => old_quantity + input.quantity,
        };

        if new_quantity < 0.0 {
            warn!(
                %item_id,
                available = old_quantity,
                requested = input.quantity,
                "Rejected consumption beyond stock"
            );
            return Err(ServiceError::InsufficientStock(format!(
                "{} has {} {} on hand, cannot consume {}",
                current.name, old_quantity, current.unit, input.quantity
            )));
        }

        let mut active: item::ActiveModel = current.into();
        active.quantity = Set(new_quantity);
        let item = active.update(&txn).await?;

        let log = consumption_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            item_id: Set(item_id),
            quantity: Set(input.quantity),
            r#type: Set(input.kind.to_string()),
            note: Set(input.note),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit stock transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        counter!("stockpile_items.transactions", 1);
        self.emit(Event::ItemQuantityChanged {
            user_id,
            item_id,
            kind: input.kind,
            old_quantity,
            new_quantity,
        })
        .await;

        Ok(TransactionOutcome { item, log })
    }

    /// Audit trail for one item, newest first.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<consumption_log::Model>, ServiceError> {
        let db = &*self.db;
        Self::find_owned(db, user_id, item_id).await?;

        let logs = consumption_log::Entity::find()
            .filter(consumption_log::Column::ItemId.eq(item_id))
            .filter(consumption_log::Column::UserId.eq(user_id))
            .order_by_desc(consumption_log::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(logs)
    }

    /// Inserts a batch of items and reconciles their events, all in one
    /// transaction. Any invalid row rejects the whole batch.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn import_items(
        &self,
        user_id: Uuid,
        inputs: Vec<NewItem>,
    ) -> Result<Vec<item::Model>, ServiceError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        for (index, input) in inputs.iter().enumerate() {
            input.validate().map_err(|e| {
                ServiceError::ValidationError(format!("row {}: {}", index + 1, e))
            })?;
        }

        let txn = self.db.begin().await?;

        let category_ids: HashSet<Uuid> = inputs.iter().map(|i| i.category_id).collect();
        let location_ids: HashSet<Uuid> = inputs.iter().map(|i| i.location_id).collect();
        Self::ensure_references(&txn, user_id, &category_ids, &location_ids).await?;

        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(Self::active_model(user_id, input).insert(&txn).await?);
        }

        let results = reconcile_on(&txn, &created).await.map_err(|e| {
            error!("Event reconciliation failed during import: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit import: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.event_sync.report(&results).await;
        counter!("stockpile_items.imported", created.len() as u64);
        info!(count = created.len(), "Items imported");
        self.emit(Event::ItemsImported {
            user_id,
            count: created.len(),
        })
        .await;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_null_fields_are_distinguished() {
        let changes: ItemChanges =
            serde_json::from_str(r#"{"expiration_date": null, "name": "Rice"}"#).unwrap();
        assert_eq!(changes.expiration_date, Some(None));
        assert_eq!(changes.maintenance_interval, None);
        assert_eq!(changes.name.as_deref(), Some("Rice"));

        let changes: ItemChanges =
            serde_json::from_str(r#"{"rotation_schedule": 30}"#).unwrap();
        assert_eq!(changes.rotation_schedule, Some(Some(30)));
    }

    #[test]
    fn changes_reject_negative_and_zero_intervals() {
        let changes = ItemChanges {
            quantity: Some(-1.0),
            ..Default::default()
        };
        assert!(changes.validate_values().is_err());

        let changes = ItemChanges {
            maintenance_interval: Some(Some(0)),
            ..Default::default()
        };
        assert!(changes.validate_values().is_err());

        let changes = ItemChanges {
            maintenance_interval: Some(None),
            ..Default::default()
        };
        assert!(changes.validate_values().is_ok());
    }

    #[test]
    fn new_item_validation() {
        let mut input = NewItem {
            category_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            name: "Rice".into(),
            quantity: 5.0,
            unit: "lb".into(),
            expiration_date: None,
            maintenance_interval: None,
            last_maintenance_date: None,
            rotation_schedule: None,
            last_rotation_date: None,
            min_quantity: 0.0,
            target_quantity: 0.0,
            calories_per_unit: Some(1600.0),
            notes: None,
        };
        assert!(input.validate().is_ok());

        input.name = String::new();
        assert!(input.validate().is_err());

        input.name = "Rice".into();
        input.rotation_schedule = Some(0);
        assert!(input.validate().is_err());
    }
}
