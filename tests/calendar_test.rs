mod common;

use common::{date, new_item, TestApp};
use stockpile::{
    entities::calendar_event::EventType,
    errors::ServiceError,
    services::calendar::{EventQuery, NewCalendarEvent},
};
use uuid::Uuid;

fn manual(event_type: EventType, title: &str, on: chrono::NaiveDate) -> NewCalendarEvent {
    NewCalendarEvent {
        event_type,
        title: title.to_string(),
        date: on,
        item_id: None,
        notes: None,
    }
}

#[tokio::test]
async fn events_list_in_date_order_within_bounds() {
    let app = TestApp::new().await;
    let calendar = &app.services().calendar;

    for (title, on) in [
        ("Check smoke detectors", date(2026, 3, 15)),
        ("Refill propane", date(2026, 1, 10)),
        ("Test radio", date(2026, 7, 1)),
    ] {
        calendar
            .create_event(app.user_id, manual(EventType::BatteryReplacement, title, on))
            .await
            .expect("create");
    }

    let all = calendar
        .list_events(app.user_id, EventQuery::default())
        .await
        .expect("list");
    let titles: Vec<&str> = all.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Refill propane", "Check smoke detectors", "Test radio"]
    );

    let spring = calendar
        .list_events(
            app.user_id,
            EventQuery {
                from: Some(date(2026, 2, 1)),
                to: Some(date(2026, 6, 30)),
                ..Default::default()
            },
        )
        .await
        .expect("bounded list");
    assert_eq!(spring.len(), 1);
    assert_eq!(spring[0].title, "Check smoke detectors");
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let app = TestApp::new().await;
    let err = app
        .services()
        .calendar
        .list_events(
            app.user_id,
            EventQuery {
                from: Some(date(2026, 5, 1)),
                to: Some(date(2026, 4, 1)),
                ..Default::default()
            },
        )
        .await
        .expect_err("inverted range");
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn completing_is_idempotent_and_hides_the_event_by_default() {
    let app = TestApp::new().await;
    let calendar = &app.services().calendar;

    let event = calendar
        .create_event(
            app.user_id,
            manual(EventType::BatteryReplacement, "Swap flashlight cells", date(2026, 4, 4)),
        )
        .await
        .expect("create");

    let first = calendar
        .complete_event(app.user_id, event.id)
        .await
        .expect("complete");
    let second = calendar
        .complete_event(app.user_id, event.id)
        .await
        .expect("complete again");
    assert!(first.completed);
    assert!(first.completed_at.is_some());
    assert_eq!(first.completed_at, second.completed_at);

    let pending = calendar
        .list_events(app.user_id, EventQuery::default())
        .await
        .expect("list");
    assert!(pending.is_empty());

    let everything = calendar
        .list_events(
            app.user_id,
            EventQuery {
                include_completed: true,
                ..Default::default()
            },
        )
        .await
        .expect("list all");
    assert_eq!(everything.len(), 1);
}

#[tokio::test]
async fn derivable_events_cannot_be_linked_to_items_by_hand() {
    let app = TestApp::new().await;
    let food = app.seed_category("Food", 0.0).await;
    let pantry = app.seed_location("Pantry").await;

    let mut input = new_item(&food, &pantry, "Yeast");
    input.expiration_date = Some(date(2026, 8, 1));
    let yeast = app.seed_item(input).await;
    let plain = app.seed_item(new_item(&food, &pantry, "Flour")).await;

    for (item_id, event_type) in [
        (yeast.id, EventType::Expiration),
        (plain.id, EventType::Maintenance),
        (plain.id, EventType::Rotation),
    ] {
        let mut linked = manual(event_type, "By hand", date(2026, 8, 2));
        linked.item_id = Some(item_id);
        let err = app
            .services()
            .calendar
            .create_event(app.user_id, linked)
            .await
            .expect_err("derivable type linked to an item");
        assert!(matches!(err, ServiceError::InvalidInput(_)), "{err:?}");
    }

    app.services()
        .calendar
        .create_event(
            app.user_id,
            manual(EventType::Maintenance, "Service the car", date(2026, 8, 2)),
        )
        .await
        .expect("free-standing derivable type is allowed");

    let mut battery = manual(EventType::BatteryReplacement, "Check yeast jar seal", date(2026, 8, 2));
    battery.item_id = Some(yeast.id);
    app.services()
        .calendar
        .create_event(app.user_id, battery)
        .await
        .expect("manual non-derivable type is allowed");
}

#[tokio::test]
async fn blank_titles_are_rejected() {
    let app = TestApp::new().await;
    let err = app
        .services()
        .calendar
        .create_event(
            app.user_id,
            manual(EventType::BatteryReplacement, "   ", date(2026, 8, 2)),
        )
        .await
        .expect_err("blank title");
    assert!(matches!(err, ServiceError::ValidationError(_)), "{err:?}");

    let created = app
        .services()
        .calendar
        .create_event(
            app.user_id,
            manual(EventType::BatteryReplacement, "  Smoke alarm  ", date(2026, 8, 2)),
        )
        .await
        .expect("padded title");
    assert_eq!(created.title, "Smoke alarm");
}

#[tokio::test]
async fn events_cannot_link_to_foreign_items() {
    let app = TestApp::new().await;
    let mut input = manual(EventType::BatteryReplacement, "Service", date(2026, 1, 1));
    input.item_id = Some(Uuid::new_v4());

    let err = app
        .services()
        .calendar
        .create_event(app.user_id, input)
        .await
        .expect_err("unknown item");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_derived_event_lets_reconciliation_recreate_it() {
    let app = TestApp::new().await;
    let food = app.seed_category("Food", 0.0).await;
    let pantry = app.seed_location("Pantry").await;

    let mut input = new_item(&food, &pantry, "Coffee");
    input.expiration_date = Some(date(2026, 10, 10));
    let coffee = app.seed_item(input).await;

    let calendar = &app.services().calendar;
    let original = calendar
        .list_events(app.user_id, EventQuery::default())
        .await
        .expect("list");
    calendar
        .delete_event(app.user_id, original[0].id)
        .await
        .expect("delete");

    let counts = app
        .services()
        .event_sync
        .reconcile_item_events(&coffee)
        .await
        .expect("reconcile");
    assert_eq!(counts.created, 1);

    let recreated = calendar
        .list_events(app.user_id, EventQuery::default())
        .await
        .expect("list");
    assert_eq!(recreated.len(), 1);
    assert_ne!(recreated[0].id, original[0].id);
    assert_eq!(recreated[0].date, date(2026, 10, 10));
}

#[tokio::test]
async fn other_users_cannot_touch_events() {
    let app = TestApp::new().await;
    let event = app
        .services()
        .calendar
        .create_event(
            app.user_id,
            manual(EventType::BatteryReplacement, "Smoke alarm", date(2026, 2, 2)),
        )
        .await
        .expect("create");

    let stranger = Uuid::new_v4();
    assert!(matches!(
        app.services().calendar.complete_event(stranger, event.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        app.services().calendar.delete_event(stranger, event.id).await,
        Err(ServiceError::NotFound(_))
    ));
}
