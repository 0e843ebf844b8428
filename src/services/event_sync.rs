use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        calendar_event::{self, EventType},
        item::{self, add_days},
    },
    errors::ServiceError,
    events::{Event, EventSender, ReconcileCounts},
};

/// The item fields that drive calendar events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLifecycle<'a> {
    pub name: &'a str,
    pub expiration_date: Option<NaiveDate>,
    pub maintenance_interval: Option<i32>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub rotation_schedule: Option<i32>,
    pub last_rotation_date: Option<NaiveDate>,
}

impl<'a> From<&'a item::Model> for ItemLifecycle<'a> {
    fn from(item: &'a item::Model) -> Self {
        Self {
            name: &item.name,
            expiration_date: item.expiration_date,
            maintenance_interval: item.maintenance_interval,
            last_maintenance_date: item.last_maintenance_date,
            rotation_schedule: item.rotation_schedule,
            last_rotation_date: item.last_rotation_date,
        }
    }
}

/// An event that should exist for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredEvent {
    pub event_type: EventType,
    pub title: String,
    pub date: NaiveDate,
}

/// Computes the derivable events for an item. A half-configured
/// interval/last-done pair yields nothing for that type.
pub fn derive_events(lifecycle: &ItemLifecycle<'_>) -> Vec<DesiredEvent> {
    let mut desired = Vec::with_capacity(3);

    if let Some(date) = lifecycle.expiration_date {
        desired.push(DesiredEvent {
            event_type: EventType::Expiration,
            title: format!("{} expires", lifecycle.name),
            date,
        });
    }

    if let (Some(interval), Some(last)) = (
        lifecycle.maintenance_interval,
        lifecycle.last_maintenance_date,
    ) {
        if let Some(date) = add_days(last, interval) {
            desired.push(DesiredEvent {
                event_type: EventType::Maintenance,
                title: format!("{} maintenance", lifecycle.name),
                date,
            });
        }
    }

    if let (Some(schedule), Some(last)) =
        (lifecycle.rotation_schedule, lifecycle.last_rotation_date)
    {
        if let Some(date) = add_days(last, schedule) {
            desired.push(DesiredEvent {
                event_type: EventType::Rotation,
                title: format!("{} rotation", lifecycle.name),
                date,
            });
        }
    }

    desired
}

/// In-place refresh of a pending event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
}

/// Writes needed to make one item's persisted events match its desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub creates: Vec<DesiredEvent>,
    pub updates: Vec<EventUpdate>,
    pub deletes: Vec<Uuid>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn counts(&self) -> ReconcileCounts {
        ReconcileCounts {
            created: self.creates.len(),
            updated: self.updates.len(),
            deleted: self.deletes.len(),
        }
    }
}

/// Decides creates, updates and deletes for one item.
///
/// `existing` holds the item's persisted events; rows of non-derivable types
/// are ignored. Completed rows are never written. When several pending rows
/// share a type the earliest one is kept and the rest are deleted, restoring
/// the one-pending-per-type invariant.
pub fn plan_reconciliation(
    desired: &[DesiredEvent],
    existing: &[calendar_event::Model],
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for event_type in EventType::DERIVABLE {
        let mut pending: Vec<&calendar_event::Model> = existing
            .iter()
            .filter(|e| e.event_type() == Some(event_type) && !e.completed)
            .collect();
        pending.sort_by(|a, b| {
            (a.date, a.created_at, a.id).cmp(&(b.date, b.created_at, b.id))
        });
        let has_completed = existing
            .iter()
            .any(|e| e.event_type() == Some(event_type) && e.completed);

        match desired.iter().find(|d| d.event_type == event_type) {
            None => plan.deletes.extend(pending.iter().map(|e| e.id)),
            Some(want) => match pending.split_first() {
                Some((keep, extra)) => {
                    if keep.title != want.title || keep.date != want.date {
                        plan.updates.push(EventUpdate {
                            id: keep.id,
                            title: want.title.clone(),
                            date: want.date,
                        });
                    }
                    plan.deletes.extend(extra.iter().map(|e| e.id));
                }
                None if has_completed => {}
                None => plan.creates.push(want.clone()),
            },
        }
    }

    plan
}

async fn apply_plan<C: ConnectionTrait>(
    conn: &C,
    item: &item::Model,
    plan: &ReconcilePlan,
) -> Result<(), DbErr> {
    if !plan.deletes.is_empty() {
        calendar_event::Entity::delete_many()
            .filter(calendar_event::Column::Id.is_in(plan.deletes.clone()))
            .exec(conn)
            .await?;
    }

    for update in &plan.updates {
        calendar_event::ActiveModel {
            id: Set(update.id),
            title: Set(update.title.clone()),
            date: Set(update.date),
            ..Default::default()
        }
        .update(conn)
        .await?;
    }

    for create in &plan.creates {
        calendar_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(item.user_id),
            item_id: Set(Some(item.id)),
            r#type: Set(create.event_type.as_str().to_string()),
            title: Set(create.title.clone()),
            date: Set(create.date),
            completed: Set(false),
            completed_at: Set(None),
            notes: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

/// Loads the derivable events of every given item in one query.
async fn load_derivable_events<C: ConnectionTrait>(
    conn: &C,
    item_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<calendar_event::Model>>, DbErr> {
    let derivable: Vec<&str> = EventType::DERIVABLE.iter().map(|t| t.as_str()).collect();

    let rows = calendar_event::Entity::find()
        .filter(calendar_event::Column::ItemId.is_in(item_ids))
        .filter(calendar_event::Column::Type.is_in(derivable))
        .order_by_asc(calendar_event::Column::Date)
        .all(conn)
        .await?;

    let mut by_item: HashMap<Uuid, Vec<calendar_event::Model>> = HashMap::new();
    for row in rows {
        if let Some(item_id) = row.item_id {
            by_item.entry(item_id).or_default().push(row);
        }
    }
    Ok(by_item)
}

/// Reconciles the given items on an existing connection or transaction.
///
/// Existing rows are batch-loaded once. When an item id repeats, its last
/// occurrence wins. Returns per-item counts in input order of first
/// appearance.
pub async fn reconcile_on<C: ConnectionTrait>(
    conn: &C,
    items: &[item::Model],
) -> Result<Vec<(Uuid, ReconcileCounts)>, DbErr> {
    let mut order: Vec<Uuid> = Vec::with_capacity(items.len());
    let mut latest: HashMap<Uuid, &item::Model> = HashMap::with_capacity(items.len());
    for item in items {
        if latest.insert(item.id, item).is_none() {
            order.push(item.id);
        }
    }
    if order.is_empty() {
        return Ok(Vec::new());
    }

    let mut existing = load_derivable_events(conn, order.clone()).await?;
    let mut results = Vec::with_capacity(order.len());

    for item_id in order {
        let Some(item) = latest.get(&item_id) else {
            continue;
        };
        let desired = derive_events(&ItemLifecycle::from(*item));
        let current = existing.remove(&item_id).unwrap_or_default();
        let plan = plan_reconciliation(&desired, &current);

        if !plan.is_empty() {
            debug!(%item_id, ?plan, "Applying event reconciliation plan");
            apply_plan(conn, item, &plan).await?;
        }
        results.push((item_id, plan.counts()));
    }

    Ok(results)
}

fn record_metrics(results: &[(Uuid, ReconcileCounts)]) {
    let (created, updated, deleted) = results.iter().fold((0, 0, 0), |acc, (_, c)| {
        (acc.0 + c.created, acc.1 + c.updated, acc.2 + c.deleted)
    });
    counter!("stockpile_event_sync.items", results.len() as u64);
    counter!("stockpile_event_sync.created", created as u64);
    counter!("stockpile_event_sync.updated", updated as u64);
    counter!("stockpile_event_sync.deleted", deleted as u64);
}

/// Keeps each item's derived calendar events in step with its lifecycle fields.
///
/// The reconciliation reads existing rows and writes inside one transaction
/// but takes no row locks. Two passes racing on the same item can both see
/// "absent" and both create.
#[derive(Clone)]
pub struct EventSyncService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl EventSyncService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Reconciles a single item in its own transaction.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub async fn reconcile_item_events(
        &self,
        item: &item::Model,
    ) -> Result<ReconcileCounts, ServiceError> {
        let results = self.run_in_transaction(std::slice::from_ref(item)).await?;
        let counts = results
            .first()
            .map(|(_, counts)| *counts)
            .unwrap_or_default();
        Ok(counts)
    }

    /// Reconciles many items with one batch read and one transaction.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn reconcile_item_events_bulk(
        &self,
        items: &[item::Model],
    ) -> Result<ReconcileCounts, ServiceError> {
        let results = self.run_in_transaction(items).await?;
        let total = results
            .iter()
            .fold(ReconcileCounts::default(), |acc, (_, c)| ReconcileCounts {
                created: acc.created + c.created,
                updated: acc.updated + c.updated,
                deleted: acc.deleted + c.deleted,
            });
        info!(
            items = results.len(),
            created = total.created,
            updated = total.updated,
            deleted = total.deleted,
            "Bulk event reconciliation finished"
        );
        Ok(total)
    }

    async fn run_in_transaction(
        &self,
        items: &[item::Model],
    ) -> Result<Vec<(Uuid, ReconcileCounts)>, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let results = reconcile_on(&txn, items).await.map_err(|e| {
            error!("Event reconciliation failed: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit event reconciliation: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        record_metrics(&results);
        self.publish(&results).await;
        Ok(results)
    }

    /// Emits metrics and domain events for a pass that ran on a caller's transaction.
    pub async fn report(&self, results: &[(Uuid, ReconcileCounts)]) {
        record_metrics(results);
        self.publish(results).await;
    }

    async fn publish(&self, results: &[(Uuid, ReconcileCounts)]) {
        let Some(sender) = &self.event_sender else {
            return;
        };
        for (item_id, counts) in results.iter().filter(|(_, c)| !c.is_noop()) {
            sender
                .send_or_log(Event::ItemEventsReconciled {
                    item_id: *item_id,
                    counts: *counts,
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lifecycle(name: &str) -> ItemLifecycle<'_> {
        ItemLifecycle {
            name,
            expiration_date: None,
            maintenance_interval: None,
            last_maintenance_date: None,
            rotation_schedule: None,
            last_rotation_date: None,
        }
    }

    fn persisted(ty: EventType, title: &str, on: NaiveDate, completed: bool) -> calendar_event::Model {
        calendar_event::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            item_id: Some(Uuid::nil()),
            r#type: ty.as_str().to_string(),
            title: title.to_string(),
            date: on,
            completed,
            completed_at: completed.then(Utc::now),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expiration_only_yields_single_event() {
        let mut lc = lifecycle("Rice");
        lc.expiration_date = Some(date(2027, 5, 1));

        let desired = derive_events(&lc);
        assert_eq!(
            desired,
            vec![DesiredEvent {
                event_type: EventType::Expiration,
                title: "Rice expires".into(),
                date: date(2027, 5, 1),
            }]
        );
    }

    #[test]
    fn maintenance_requires_interval_and_last_date() {
        let mut lc = lifecycle("Generator");
        lc.maintenance_interval = Some(90);
        assert!(derive_events(&lc).is_empty());

        lc.maintenance_interval = None;
        lc.last_maintenance_date = Some(date(2026, 1, 1));
        assert!(derive_events(&lc).is_empty());

        lc.maintenance_interval = Some(90);
        let desired = derive_events(&lc);
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].event_type, EventType::Maintenance);
        assert_eq!(desired[0].title, "Generator maintenance");
        assert_eq!(desired[0].date, date(2026, 4, 1));
    }

    #[test]
    fn rotation_is_last_rotation_plus_schedule() {
        let mut lc = lifecycle("Water barrel");
        lc.rotation_schedule = Some(180);
        lc.last_rotation_date = Some(date(2026, 3, 1));

        let desired = derive_events(&lc);
        assert_eq!(desired[0].title, "Water barrel rotation");
        assert_eq!(desired[0].date, date(2026, 8, 28));
    }

    #[test]
    fn missing_events_are_created() {
        let desired = vec![DesiredEvent {
            event_type: EventType::Expiration,
            title: "Rice expires".into(),
            date: date(2027, 5, 1),
        }];
        let plan = plan_reconciliation(&desired, &[]);
        assert_eq!(plan.creates, desired);
        assert!(plan.updates.is_empty());
        assert!(plan.deletes.is_empty());
    }

    #[test]
    fn unchanged_pending_event_needs_no_write() {
        let on = date(2027, 5, 1);
        let existing = vec![persisted(EventType::Expiration, "Rice expires", on, false)];
        let desired = vec![DesiredEvent {
            event_type: EventType::Expiration,
            title: "Rice expires".into(),
            date: on,
        }];
        assert!(plan_reconciliation(&desired, &existing).is_empty());
    }

    #[test]
    fn changed_pending_event_is_updated_in_place() {
        let existing = vec![persisted(
            EventType::Expiration,
            "Rice expires",
            date(2027, 5, 1),
            false,
        )];
        let desired = vec![DesiredEvent {
            event_type: EventType::Expiration,
            title: "Brown rice expires".into(),
            date: date(2027, 6, 1),
        }];
        let plan = plan_reconciliation(&desired, &existing);
        assert_eq!(
            plan.updates,
            vec![EventUpdate {
                id: existing[0].id,
                title: "Brown rice expires".into(),
                date: date(2027, 6, 1),
            }]
        );
        assert!(plan.creates.is_empty());
    }

    #[test]
    fn unwanted_pending_events_are_deleted_but_completed_kept() {
        let pending = persisted(EventType::Rotation, "Barrel rotation", date(2026, 9, 1), false);
        let done = persisted(EventType::Rotation, "Barrel rotation", date(2026, 3, 1), true);
        let plan = plan_reconciliation(&[], &[pending.clone(), done]);
        assert_eq!(plan.deletes, vec![pending.id]);
    }

    #[test]
    fn completed_event_blocks_recreation() {
        let done = persisted(EventType::Maintenance, "Gen maintenance", date(2026, 4, 1), true);
        let desired = vec![DesiredEvent {
            event_type: EventType::Maintenance,
            title: "Gen maintenance".into(),
            date: date(2026, 7, 1),
        }];
        assert!(plan_reconciliation(&desired, &[done]).is_empty());
    }

    #[test]
    fn duplicate_pending_rows_collapse_to_earliest() {
        let first = persisted(EventType::Expiration, "Rice expires", date(2027, 5, 1), false);
        let second = persisted(EventType::Expiration, "Rice expires", date(2027, 7, 1), false);
        let desired = vec![DesiredEvent {
            event_type: EventType::Expiration,
            title: "Rice expires".into(),
            date: date(2027, 5, 1),
        }];
        let plan = plan_reconciliation(&desired, &[second.clone(), first]);
        assert!(plan.updates.is_empty());
        assert_eq!(plan.deletes, vec![second.id]);
    }

    #[test]
    fn manual_event_types_are_ignored() {
        let battery = persisted(
            EventType::BatteryReplacement,
            "Smoke detector",
            date(2026, 12, 1),
            false,
        );
        assert!(plan_reconciliation(&[], &[battery]).is_empty());
    }
}
