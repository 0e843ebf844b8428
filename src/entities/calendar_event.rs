use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of calendar events
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Expiration,
    Maintenance,
    Rotation,
    BatteryReplacement,
}

impl EventType {
    /// Types computed from item fields by the synchronizer
    pub const DERIVABLE: [EventType; 3] = [
        EventType::Expiration,
        EventType::Maintenance,
        EventType::Rotation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Expiration => "expiration",
            EventType::Maintenance => "maintenance",
            EventType::Rotation => "rotation",
            EventType::BatteryReplacement => "battery_replacement",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "expiration" => Some(EventType::Expiration),
            "maintenance" => Some(EventType::Maintenance),
            "rotation" => Some(EventType::Rotation),
            "battery_replacement" => Some(EventType::BatteryReplacement),
            _ => None,
        }
    }

    pub fn is_derivable(&self) -> bool {
        Self::DERIVABLE.contains(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "calendar_events")]
#[schema(as = CalendarEvent)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Option<Uuid>,
    pub r#type: String, // Storing as string in DB, converted through EventType
    pub title: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn event_type(&self) -> Option<EventType> {
        EventType::from_str(&self.r#type)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_storage_string() {
        for ty in [
            EventType::Expiration,
            EventType::Maintenance,
            EventType::Rotation,
            EventType::BatteryReplacement,
        ] {
            assert_eq!(EventType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::from_str("birthday"), None);
    }

    #[test]
    fn battery_replacement_is_not_derivable() {
        assert!(EventType::Rotation.is_derivable());
        assert!(!EventType::BatteryReplacement.is_derivable());
    }
}
