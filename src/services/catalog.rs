use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{category, item, location},
    errors::ServiceError,
    services::not_blank,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub name: String,
    #[serde(default = "default_color")]
    #[validate(length(max = 20))]
    pub color: String,
    #[serde(default = "default_icon")]
    #[validate(length(max = 50))]
    pub icon: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub target_quantity: f64,
}

fn default_color() -> String {
    "#6b7280".to_string()
}

fn default_icon() -> String {
    "package".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryChanges {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[validate(range(min = 0.0))]
    pub target_quantity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewLocation {
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Categories and storage locations
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        input: NewCategory,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let created = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name.trim().to_string()),
            color: Set(input.color),
            icon: Set(input.icon),
            target_quantity: Set(input.target_quantity),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = %created.id, name = %created.name, "Category created");
        Ok(created)
    }

    pub async fn list_categories(&self, user_id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
        let categories = category::Entity::find()
            .filter(category::Column::UserId.eq(user_id))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(categories)
    }

    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        changes: CategoryChanges,
    ) -> Result<category::Model, ServiceError> {
        changes.validate()?;
        let existing = category::Entity::find_by_id(category_id)
            .filter(category::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", category_id))?;

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(icon) = changes.icon {
            active.icon = Set(icon);
        }
        if let Some(target) = changes.target_quantity {
            active.target_quantity = Set(target);
        }
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes a category that no item references.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        category::Entity::find_by_id(category_id)
            .filter(category::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category", category_id))?;

        let in_use = item::Entity::find()
            .filter(item::Column::CategoryId.eq(category_id))
            .count(db)
            .await?;
        if in_use > 0 {
            warn!(%category_id, in_use, "Refusing to delete category in use");
            return Err(ServiceError::Conflict(format!(
                "Category {} is used by {} item(s)",
                category_id, in_use
            )));
        }

        category::Entity::delete_by_id(category_id).exec(db).await?;
        Ok(())
    }

    pub async fn create_location(
        &self,
        user_id: Uuid,
        input: NewLocation,
    ) -> Result<location::Model, ServiceError> {
        input.validate()?;
        let created = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(location_id = %created.id, name = %created.name, "Location created");
        Ok(created)
    }

    pub async fn list_locations(&self, user_id: Uuid) -> Result<Vec<location::Model>, ServiceError> {
        let locations = location::Entity::find()
            .filter(location::Column::UserId.eq(user_id))
            .order_by_asc(location::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(locations)
    }

    /// Deletes a location that no item references.
    pub async fn delete_location(&self, user_id: Uuid, location_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        location::Entity::find_by_id(location_id)
            .filter(location::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Location", location_id))?;

        let in_use = item::Entity::find()
            .filter(item::Column::LocationId.eq(location_id))
            .count(db)
            .await?;
        if in_use > 0 {
            warn!(%location_id, in_use, "Refusing to delete location in use");
            return Err(ServiceError::Conflict(format!(
                "Location {} is used by {} item(s)",
                location_id, in_use
            )));
        }

        location::Entity::delete_by_id(location_id).exec(db).await?;
        Ok(())
    }
}
