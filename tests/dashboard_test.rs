mod common;

use common::{date, new_item, TestApp};
use stockpile::services::{
    dashboard::SupplyKind,
    household::{NewFamilyMember, SettingsChanges},
    nutrition::ActivityLevel,
};
use uuid::Uuid;

fn adult(name: &str) -> NewFamilyMember {
    // 10*100 + 6.25*200 - 5*50 = 2000 kcal/day for sex "other"
    NewFamilyMember {
        name: name.to_string(),
        age: 50,
        weight_kg: 100.0,
        height_cm: 200.0,
        sex: "other".to_string(),
    }
}

#[tokio::test]
async fn food_days_use_household_calories_when_known() {
    let app = TestApp::new().await;
    let food = app.seed_category("Food", 0.0).await;
    let pantry = app.seed_location("Pantry").await;

    let view = app
        .services()
        .household
        .add_member(app.user_id, adult("Sam"))
        .await
        .expect("add member");
    assert_eq!(view.bmr, 2000.0);

    let mut rations = new_item(&food, &pantry, "Ration Bars");
    rations.quantity = 100.0;
    rations.calories_per_unit = Some(1800.0);
    app.seed_item(rations).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert!(stats.food.use_household_calculation);
    assert_eq!(stats.food.household_daily_calories, 2000.0);
    assert_eq!(stats.food.total_food_days, 90.0);
}

#[tokio::test]
async fn activity_level_scales_household_needs() {
    let app = TestApp::new().await;
    let food = app.seed_category("Food", 0.0).await;
    let pantry = app.seed_location("Pantry").await;

    app.services()
        .household
        .add_member(app.user_id, adult("Sam"))
        .await
        .expect("add member");
    app.services()
        .household
        .update_settings(
            app.user_id,
            SettingsChanges {
                activity_level: Some(ActivityLevel::VeryActive),
                ..Default::default()
            },
        )
        .await
        .expect("settings");

    let mut rations = new_item(&food, &pantry, "Ration Bars");
    rations.quantity = 100.0;
    rations.calories_per_unit = Some(1800.0);
    app.seed_item(rations).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    let expected_daily = (2000.0 * ActivityLevel::VeryActive.multiplier()).round();
    assert_eq!(stats.food.household_daily_calories, expected_daily);
    assert!(stats.food.total_food_days < 90.0);
}

#[tokio::test]
async fn food_days_fall_back_to_generic_units_without_members() {
    let app = TestApp::new().await;
    let food = app.seed_category("Food Storage", 0.0).await;
    let pantry = app.seed_location("Pantry").await;

    let mut cans = new_item(&food, &pantry, "Canned Chili");
    cans.quantity = 30.0;
    cans.calories_per_unit = Some(500.0);
    app.seed_item(cans).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert!(!stats.food.use_household_calculation);
    assert_eq!(stats.food.household_daily_calories, 0.0);
    assert_eq!(stats.food.total_food_days, 10.0);
}

#[tokio::test]
async fn category_progress_is_a_capped_percentage() {
    let app = TestApp::new().await;
    let ammo = app.seed_category("Ammo", 300.0).await;
    let fuel = app.seed_category("Fuel", 10.0).await;
    let misc = app.seed_category("Misc", 0.0).await;
    let garage = app.seed_location("Garage").await;

    let mut rounds = new_item(&ammo, &garage, "9mm");
    rounds.quantity = 100.0;
    app.seed_item(rounds).await;

    let mut gas = new_item(&fuel, &garage, "Gasoline");
    gas.quantity = 25.0;
    gas.unit = "gallons".to_string();
    app.seed_item(gas).await;

    let mut tape = new_item(&misc, &garage, "Duct Tape");
    tape.quantity = 4.0;
    app.seed_item(tape).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    let ammo_goal = stats
        .category_goals
        .iter()
        .find(|g| g.category_id == ammo.id)
        .expect("ammo goal");
    assert_eq!(ammo_goal.progress, 33.33);

    let fuel_goal = stats
        .category_goals
        .iter()
        .find(|g| g.category_id == fuel.id)
        .expect("fuel goal");
    assert_eq!(fuel_goal.progress, 100.0);

    assert!(stats.category_goals.iter().all(|g| g.category_id != misc.id));
    assert_eq!(stats.totals.total_ammo, 100.0);
    assert_eq!(stats.totals.total_fuel, 25.0);
}

#[tokio::test]
async fn liters_are_reported_as_gallons() {
    let app = TestApp::new().await;
    let supplies = app.seed_category("Supplies", 0.0).await;
    let basement = app.seed_location("Basement").await;

    let mut bottles = new_item(&supplies, &basement, "Bottled Water");
    bottles.quantity = 10.0;
    bottles.unit = "liters".to_string();
    app.seed_item(bottles).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert!((stats.totals.total_water - 2.64172).abs() < 1e-9);
}

#[tokio::test]
async fn alerts_cover_stock_expiration_maintenance_and_calendar() {
    let app = TestApp::new().await;
    let gear = app.seed_category("Equipment", 0.0).await;
    let food = app.seed_category("Food", 0.0).await;
    let garage = app.seed_location("Garage").await;
    let today = date(2026, 5, 1);

    let mut batteries = new_item(&gear, &garage, "AA Batteries");
    batteries.quantity = 4.0;
    batteries.min_quantity = 8.0;
    let batteries = app.seed_item(batteries).await;

    let mut milk = new_item(&food, &garage, "Powdered Milk");
    milk.quantity = 50.0;
    milk.expiration_date = Some(date(2026, 5, 20));
    let milk = app.seed_item(milk).await;

    let mut generator = new_item(&gear, &garage, "Generator");
    generator.quantity = 20.0;
    generator.maintenance_interval = Some(30);
    generator.last_maintenance_date = Some(date(2026, 3, 1));
    let generator = app.seed_item(generator).await;

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, today)
        .await
        .expect("dashboard");

    assert_eq!(stats.totals.total_items, 3);

    let low: Vec<Uuid> = stats.low_stock.iter().map(|l| l.item_id).collect();
    assert_eq!(low, vec![batteries.id]);

    assert_eq!(stats.upcoming_expirations.len(), 1);
    assert_eq!(stats.upcoming_expirations[0].item_id, milk.id);
    assert_eq!(stats.upcoming_expirations[0].days_until, 19);

    assert_eq!(stats.needs_maintenance.len(), 1);
    assert_eq!(stats.needs_maintenance[0].item_id, generator.id);
    assert_eq!(stats.needs_maintenance[0].due_date, date(2026, 3, 31));
    assert_eq!(stats.needs_maintenance[0].days_overdue, 31);

    // The overdue maintenance event is in the past, so only the expiration shows.
    assert_eq!(stats.upcoming_events.len(), 1);
    assert_eq!(stats.upcoming_events[0].item_id, Some(milk.id));
}

#[tokio::test]
async fn supply_goals_come_from_settings() {
    let app = TestApp::new().await;
    let water = app.seed_category("Water", 0.0).await;
    let basement = app.seed_location("Basement").await;

    let mut jugs = new_item(&water, &basement, "Water Jugs");
    jugs.quantity = 25.0;
    jugs.unit = "gallons".to_string();
    app.seed_item(jugs).await;

    app.services()
        .household
        .update_settings(
            app.user_id,
            SettingsChanges {
                water_goal_gallons: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .expect("settings");

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert_eq!(stats.supply_goals.len(), 1);
    assert_eq!(stats.supply_goals[0].supply, SupplyKind::Water);
    assert_eq!(stats.supply_goals[0].current, 25.0);
    assert_eq!(stats.supply_goals[0].progress, 25.0);
}

#[tokio::test]
async fn other_users_data_is_invisible() {
    let app = TestApp::new().await;
    let neighbor = Uuid::new_v4();
    let ammo = app.seed_category_for(neighbor, "Ammo", 100.0).await;
    let shed = app.seed_location_for(neighbor, "Shed").await;

    let mut rounds = new_item(&ammo, &shed, "Buckshot");
    rounds.quantity = 50.0;
    app.services()
        .items
        .create_item(neighbor, rounds)
        .await
        .expect("neighbor item");

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert_eq!(stats.totals.total_items, 0);
    assert_eq!(stats.totals.total_ammo, 0.0);
    assert!(stats.category_goals.is_empty());
    assert!(stats.low_stock.is_empty());
}

#[tokio::test]
async fn item_targets_stand_in_for_a_missing_category_target() {
    let app = TestApp::new().await;
    let medical = app.seed_category("Medical", 0.0).await;
    let closet = app.seed_location("Closet").await;

    for (name, target) in [("Gauze", 20.0), ("Ibuprofen", 10.0)] {
        let mut input = new_item(&medical, &closet, name);
        input.quantity = 5.0;
        input.target_quantity = target;
        app.seed_item(input).await;
    }

    let stats = app
        .services()
        .dashboard
        .compute_dashboard_stats_at(app.user_id, date(2026, 1, 1))
        .await
        .expect("dashboard");

    assert_eq!(stats.category_goals.len(), 1);
    let goal = &stats.category_goals[0];
    assert_eq!(goal.target_quantity, 30.0);
    assert_eq!(goal.current_quantity, 10.0);
    assert_eq!(goal.progress, 33.33);
}
