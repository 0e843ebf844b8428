use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{family_member, user_settings},
    errors::ServiceError,
    services::{
        not_blank,
        nutrition::{member_bmr, ActivityLevel},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewFamilyMember {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub name: String,
    #[validate(range(min = 1, max = 130))]
    pub age: i32,
    #[validate(range(min = 0.5, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 20.0, max = 300.0))]
    pub height_cm: f64,
    #[validate(custom = "validate_sex")]
    pub sex: String,
}

fn validate_sex(sex: &str) -> Result<(), ValidationError> {
    match sex.to_lowercase().as_str() {
        "male" | "female" | "other" => Ok(()),
        _ => {
            let mut err = ValidationError::new("sex");
            err.message = Some("Must be one of: male, female, other".into());
            Err(err)
        }
    }
}

/// A family member with their computed basal metabolic rate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyMemberView {
    #[serde(flatten)]
    pub member: family_member::Model,
    pub bmr: f64,
}

impl From<family_member::Model> for FamilyMemberView {
    fn from(member: family_member::Model) -> Self {
        let bmr = member_bmr(&member);
        Self { member, bmr }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SettingsChanges {
    pub activity_level: Option<ActivityLevel>,
    #[validate(range(min = 0.0))]
    pub water_goal_gallons: Option<f64>,
    #[validate(range(min = 0.0))]
    pub food_goal_days: Option<f64>,
    #[validate(range(min = 0.0))]
    pub ammo_goal: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fuel_goal: Option<f64>,
}

/// Family members and per-user settings
#[derive(Clone)]
pub struct HouseholdService {
    db: Arc<DatabaseConnection>,
}

impl HouseholdService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn add_member(
        &self,
        user_id: Uuid,
        input: NewFamilyMember,
    ) -> Result<FamilyMemberView, ServiceError> {
        input.validate()?;
        let created = family_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name.trim().to_string()),
            age: Set(input.age),
            weight_kg: Set(input.weight_kg),
            height_cm: Set(input.height_cm),
            sex: Set(input.sex.to_lowercase()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(member_id = %created.id, "Family member added");
        Ok(created.into())
    }

    pub async fn list_members(&self, user_id: Uuid) -> Result<Vec<FamilyMemberView>, ServiceError> {
        let members = family_member::Entity::find()
            .filter(family_member::Column::UserId.eq(user_id))
            .order_by_asc(family_member::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(members.into_iter().map(FamilyMemberView::from).collect())
    }

    pub async fn remove_member(&self, user_id: Uuid, member_id: Uuid) -> Result<(), ServiceError> {
        let result = family_member::Entity::delete_many()
            .filter(family_member::Column::Id.eq(member_id))
            .filter(family_member::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Family member", member_id));
        }
        Ok(())
    }

    /// Returns the user's settings, creating the default row on first access.
    pub async fn get_settings(&self, user_id: Uuid) -> Result<user_settings::Model, ServiceError> {
        let db = &*self.db;
        if let Some(existing) = user_settings::Entity::find_by_id(user_id).one(db).await? {
            return Ok(existing);
        }

        let defaults = user_settings::Model::defaults(user_id);
        let created = user_settings::ActiveModel {
            user_id: Set(defaults.user_id),
            activity_level: Set(defaults.activity_level),
            water_goal_gallons: Set(defaults.water_goal_gallons),
            food_goal_days: Set(defaults.food_goal_days),
            ammo_goal: Set(defaults.ammo_goal),
            fuel_goal: Set(defaults.fuel_goal),
            updated_at: Set(defaults.updated_at),
        }
        .insert(db)
        .await?;

        info!(%user_id, "Default settings created");
        Ok(created)
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        changes: SettingsChanges,
    ) -> Result<user_settings::Model, ServiceError> {
        changes.validate()?;
        let current = self.get_settings(user_id).await?;

        let mut active: user_settings::ActiveModel = current.into();
        if let Some(level) = changes.activity_level {
            active.activity_level = Set(level.to_string());
        }
        if let Some(goal) = changes.water_goal_gallons {
            active.water_goal_gallons = Set(goal);
        }
        if let Some(goal) = changes.food_goal_days {
            active.food_goal_days = Set(goal);
        }
        if let Some(goal) = changes.ammo_goal {
            active.ammo_goal = Set(goal);
        }
        if let Some(goal) = changes.fuel_goal {
            active.fuel_goal = Set(goal);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_validation_rejects_non_positive_measurements() {
        let mut input = NewFamilyMember {
            name: "Ada".into(),
            age: 36,
            weight_kg: 60.0,
            height_cm: 165.0,
            sex: "Female".into(),
        };
        assert!(input.validate().is_ok());

        input.weight_kg = 0.0;
        assert!(input.validate().is_err());

        input.weight_kg = 60.0;
        input.age = 0;
        assert!(input.validate().is_err());

        input.age = 36;
        input.sex = "unknown".into();
        assert!(input.validate().is_err());
    }
}
