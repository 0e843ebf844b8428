use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A tracked supply: what it is, how much is on hand, where it lives and
/// which lifecycle reminders it drives.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "items")]
#[schema(as = Item)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub expiration_date: Option<NaiveDate>,
    /// Days between maintenance runs
    pub maintenance_interval: Option<i32>,
    pub last_maintenance_date: Option<NaiveDate>,
    /// Days between stock rotations
    pub rotation_schedule: Option<i32>,
    pub last_rotation_date: Option<NaiveDate>,
    /// Low-stock threshold; 0 means "use the default threshold"
    pub min_quantity: f64,
    /// Item-level goal; 0 means "no goal"
    pub target_quantity: f64,
    pub calories_per_unit: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Low-stock threshold with the "0 means default" sentinel resolved.
    pub fn effective_min_quantity(&self, default_threshold: f64) -> f64 {
        if self.min_quantity > 0.0 {
            self.min_quantity
        } else {
            default_threshold
        }
    }

    /// Item goal when one is set.
    pub fn item_goal(&self) -> Option<f64> {
        (self.target_quantity > 0.0).then_some(self.target_quantity)
    }

    /// Date the next maintenance run is due, if maintenance is fully configured.
    pub fn next_maintenance_date(&self) -> Option<NaiveDate> {
        add_days(self.last_maintenance_date?, self.maintenance_interval?)
    }

    /// Total calories held by this item, when calorie data exists.
    pub fn total_calories(&self) -> Option<f64> {
        self.calories_per_unit.map(|per_unit| self.quantity * per_unit)
    }
}

/// `date + days`, `None` on calendar overflow.
pub fn add_days(date: NaiveDate, days: i32) -> Option<NaiveDate> {
    date.checked_add_signed(chrono::Duration::days(i64::from(days)))
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    #[sea_orm(has_many = "super::calendar_event::Entity")]
    CalendarEvents,
    #[sea_orm(has_many = "super::consumption_log::Entity")]
    ConsumptionLogs,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::calendar_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarEvents.def()
    }
}

impl Related<super::consumption_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsumptionLogs.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
