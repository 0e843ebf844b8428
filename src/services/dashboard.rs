use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Months, NaiveDate, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::DashboardConfig,
    entities::{calendar_event, category, family_member, item, user_settings},
    errors::ServiceError,
    services::nutrition::{household_daily_calories, ActivityLevel},
};

const LITERS_TO_GALLONS: f64 = 0.264172;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    Water,
    FoodDays,
    Ammo,
    Fuel,
}

/// Headline totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplyTotals {
    /// Gallons
    pub total_water: f64,
    pub total_ammo: f64,
    pub total_fuel: f64,
    pub total_items: usize,
}

/// How long the food on hand lasts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodSupply {
    pub total_food_days: f64,
    /// True when the estimate comes from household calorie needs rather than
    /// the generic units-per-day heuristic
    pub use_household_calculation: bool,
    pub household_daily_calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryGoalProgress {
    pub category_id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub current_quantity: f64,
    pub target_quantity: f64,
    /// Percentage, capped at 100
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplyGoalProgress {
    pub supply: SupplyKind,
    pub current: f64,
    pub goal: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LowStockItem {
    pub item_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub threshold: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpcomingExpiration {
    pub item_id: Uuid,
    pub name: String,
    pub expiration_date: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceDue {
    pub item_id: Uuid,
    pub name: String,
    pub due_date: NaiveDate,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpcomingEvent {
    pub id: Uuid,
    pub item_id: Option<Uuid>,
    pub event_type: String,
    pub title: String,
    pub date: NaiveDate,
}

/// Dashboard read model. Metric groups are flattened into one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub totals: SupplyTotals,
    #[serde(flatten)]
    pub food: FoodSupply,
    pub category_goals: Vec<CategoryGoalProgress>,
    pub supply_goals: Vec<SupplyGoalProgress>,
    pub low_stock: Vec<LowStockItem>,
    pub upcoming_expirations: Vec<UpcomingExpiration>,
    pub needs_maintenance: Vec<MaintenanceDue>,
    pub upcoming_events: Vec<UpcomingEvent>,
}

/// Everything the aggregation reads, already scoped to one user.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInputs<'a> {
    pub items: &'a [item::Model],
    pub categories: &'a [category::Model],
    pub members: &'a [family_member::Model],
    pub settings: &'a user_settings::Model,
    pub events: &'a [calendar_event::Model],
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn capped_percentage(current: f64, target: f64) -> f64 {
    round_to((current / target * 100.0).min(100.0), 2)
}

fn category_lookup<'a>(categories: &'a [category::Model]) -> HashMap<Uuid, &'a category::Model> {
    categories.iter().map(|c| (c.id, c)).collect()
}

fn in_category(
    lookup: &HashMap<Uuid, &category::Model>,
    item: &item::Model,
    needle: &str,
) -> bool {
    lookup
        .get(&item.category_id)
        .map(|c| c.name_contains(needle))
        .unwrap_or(false)
}

/// Gallons of water on hand. Liter-denominated items are converted.
pub fn total_water(items: &[item::Model], categories: &[category::Model]) -> f64 {
    let lookup = category_lookup(categories);
    items
        .iter()
        .filter_map(|it| {
            let unit = it.unit.to_lowercase();
            let is_liters = unit.contains("liter");
            let counts = in_category(&lookup, it, "water") || unit.contains("gallon") || is_liters;
            counts.then(|| {
                if is_liters {
                    it.quantity * LITERS_TO_GALLONS
                } else {
                    it.quantity
                }
            })
        })
        .sum()
}

/// Sum of quantities over items whose category name contains `needle`.
pub fn category_total(items: &[item::Model], categories: &[category::Model], needle: &str) -> f64 {
    let lookup = category_lookup(categories);
    items
        .iter()
        .filter(|it| in_category(&lookup, it, needle))
        .map(|it| it.quantity)
        .sum()
}

pub fn inventory_calories(items: &[item::Model]) -> f64 {
    items.iter().filter_map(item::Model::total_calories).sum()
}

/// Days of food on hand. Uses household calorie needs when both sides of the
/// division are known, otherwise the generic units-per-day heuristic.
pub fn food_supply(
    items: &[item::Model],
    categories: &[category::Model],
    members: &[family_member::Model],
    level: ActivityLevel,
    generic_units_per_day: f64,
) -> FoodSupply {
    let daily = household_daily_calories(members, level);
    let stored = inventory_calories(items);

    if daily > 0.0 && stored > 0.0 {
        return FoodSupply {
            total_food_days: round_to(stored / daily, 1),
            use_household_calculation: true,
            household_daily_calories: daily,
        };
    }

    let units = category_total(items, categories, "food");
    let days = if generic_units_per_day > 0.0 {
        units / generic_units_per_day
    } else {
        0.0
    };
    FoodSupply {
        total_food_days: round_to(days, 1),
        use_household_calculation: false,
        household_daily_calories: daily,
    }
}

/// Progress per category. Categories with no effective target are omitted.
pub fn category_goals(
    items: &[item::Model],
    categories: &[category::Model],
) -> Vec<CategoryGoalProgress> {
    categories
        .iter()
        .filter_map(|cat| {
            let members: Vec<&item::Model> =
                items.iter().filter(|it| it.category_id == cat.id).collect();
            let current: f64 = members.iter().map(|it| it.quantity).sum();
            let target = cat
                .category_goal()
                .unwrap_or_else(|| members.iter().filter_map(|it| it.item_goal()).sum());

            (target > 0.0).then(|| CategoryGoalProgress {
                category_id: cat.id,
                name: cat.name.clone(),
                color: cat.color.clone(),
                icon: cat.icon.clone(),
                current_quantity: current,
                target_quantity: target,
                progress: capped_percentage(current, target),
            })
        })
        .collect()
}

pub fn supply_goals(
    settings: &user_settings::Model,
    totals: &SupplyTotals,
    food: &FoodSupply,
) -> Vec<SupplyGoalProgress> {
    [
        (SupplyKind::Water, totals.total_water, settings.water_goal_gallons),
        (SupplyKind::FoodDays, food.total_food_days, settings.food_goal_days),
        (SupplyKind::Ammo, totals.total_ammo, settings.ammo_goal),
        (SupplyKind::Fuel, totals.total_fuel, settings.fuel_goal),
    ]
    .into_iter()
    .filter(|(_, _, goal)| *goal > 0.0)
    .map(|(supply, current, goal)| SupplyGoalProgress {
        supply,
        current,
        goal,
        progress: capped_percentage(current, goal),
    })
    .collect()
}

pub fn low_stock(items: &[item::Model], default_threshold: f64) -> Vec<LowStockItem> {
    let mut low: Vec<LowStockItem> = items
        .iter()
        .filter_map(|it| {
            let threshold = it.effective_min_quantity(default_threshold);
            (it.quantity <= threshold).then(|| LowStockItem {
                item_id: it.id,
                name: it.name.clone(),
                quantity: it.quantity,
                threshold,
                unit: it.unit.clone(),
            })
        })
        .collect();
    low.sort_by(|a, b| a.quantity.total_cmp(&b.quantity).then_with(|| a.name.cmp(&b.name)));
    low
}

/// Items expiring in `[today, today + window_days]`, soonest first.
pub fn upcoming_expirations(
    items: &[item::Model],
    today: NaiveDate,
    window_days: i64,
) -> Vec<UpcomingExpiration> {
    let horizon = today + Duration::days(window_days);
    let mut upcoming: Vec<UpcomingExpiration> = items
        .iter()
        .filter_map(|it| {
            let date = it.expiration_date?;
            (date >= today && date <= horizon).then(|| UpcomingExpiration {
                item_id: it.id,
                name: it.name.clone(),
                expiration_date: date,
                days_until: (date - today).num_days(),
            })
        })
        .collect();
    upcoming.sort_by(|a, b| {
        a.expiration_date
            .cmp(&b.expiration_date)
            .then_with(|| a.name.cmp(&b.name))
    });
    upcoming
}

pub fn needs_maintenance(items: &[item::Model], today: NaiveDate) -> Vec<MaintenanceDue> {
    let mut due: Vec<MaintenanceDue> = items
        .iter()
        .filter_map(|it| {
            let next = it.next_maintenance_date()?;
            (next <= today).then(|| MaintenanceDue {
                item_id: it.id,
                name: it.name.clone(),
                due_date: next,
                days_overdue: (today - next).num_days(),
            })
        })
        .collect();
    due.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
    due
}

/// Non-completed events in `[today, today + months]`, soonest first.
pub fn upcoming_events(
    events: &[calendar_event::Model],
    today: NaiveDate,
    months: u32,
) -> Vec<UpcomingEvent> {
    let horizon = today
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<UpcomingEvent> = events
        .iter()
        .filter(|e| !e.completed && e.date >= today && e.date <= horizon)
        .map(|e| UpcomingEvent {
            id: e.id,
            item_id: e.item_id,
            event_type: e.r#type.clone(),
            title: e.title.clone(),
            date: e.date,
        })
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
    upcoming
}

/// Pure aggregation over one user's data as of `today`.
pub fn aggregate(
    inputs: DashboardInputs<'_>,
    today: NaiveDate,
    config: &DashboardConfig,
) -> DashboardStats {
    let level = ActivityLevel::from_stored(&inputs.settings.activity_level);

    let totals = SupplyTotals {
        total_water: total_water(inputs.items, inputs.categories),
        total_ammo: category_total(inputs.items, inputs.categories, "ammo"),
        total_fuel: category_total(inputs.items, inputs.categories, "fuel"),
        total_items: inputs.items.len(),
    };
    let food = food_supply(
        inputs.items,
        inputs.categories,
        inputs.members,
        level,
        config.generic_food_units_per_day,
    );
    let supply_goals = supply_goals(inputs.settings, &totals, &food);

    DashboardStats {
        category_goals: category_goals(inputs.items, inputs.categories),
        supply_goals,
        low_stock: low_stock(inputs.items, config.default_low_stock_threshold),
        upcoming_expirations: upcoming_expirations(
            inputs.items,
            today,
            config.expiration_window_days,
        ),
        needs_maintenance: needs_maintenance(inputs.items, today),
        upcoming_events: upcoming_events(inputs.events, today, config.event_window_months),
        totals,
        food,
    }
}

/// Loads a user's inventory and household and computes the dashboard.
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>, config: DashboardConfig) -> Self {
        Self { db, config }
    }

    pub async fn compute_dashboard_stats(&self, user_id: Uuid) -> Result<DashboardStats, ServiceError> {
        self.compute_dashboard_stats_at(user_id, Utc::now().date_naive())
            .await
    }

    /// Same as [`compute_dashboard_stats`](Self::compute_dashboard_stats) with a fixed "today".
    #[instrument(skip(self))]
    pub async fn compute_dashboard_stats_at(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db;

        let items = item::Entity::find()
            .filter(item::Column::UserId.eq(user_id))
            .order_by_asc(item::Column::Name)
            .all(db)
            .await?;
        let categories = category::Entity::find()
            .filter(category::Column::UserId.eq(user_id))
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?;
        let members = family_member::Entity::find()
            .filter(family_member::Column::UserId.eq(user_id))
            .all(db)
            .await?;
        let settings = user_settings::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .unwrap_or_else(|| user_settings::Model::defaults(user_id));
        let events = calendar_event::Entity::find()
            .filter(calendar_event::Column::UserId.eq(user_id))
            .filter(calendar_event::Column::Completed.eq(false))
            .filter(calendar_event::Column::Date.gte(today))
            .order_by_asc(calendar_event::Column::Date)
            .all(db)
            .await?;

        let stats = aggregate(
            DashboardInputs {
                items: &items,
                categories: &categories,
                members: &members,
                settings: &settings,
                events: &events,
            },
            today,
            &self.config,
        );

        info!(
            %user_id,
            total_items = stats.totals.total_items,
            low_stock = stats.low_stock.len(),
            upcoming_events = stats.upcoming_events.len(),
            "Dashboard computed"
        );
        Ok(stats)
    }
}
