use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-user household settings and supply goals. A goal of 0 means "no goal".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "user_settings")]
#[schema(as = UserSettings)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub activity_level: String,
    pub water_goal_gallons: f64,
    pub food_goal_days: f64,
    pub ammo_goal: f64,
    pub fuel_goal: f64,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// The settings a user has before ever saving any.
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            activity_level: "sedentary".to_string(),
            water_goal_gallons: 0.0,
            food_goal_days: 0.0,
            ammo_goal: 0.0,
            fuel_goal: 0.0,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
