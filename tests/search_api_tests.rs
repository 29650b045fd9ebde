//! End-to-end tests for the search API against a real SQLite store.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use davarr::config::Config;
use davarr::db::IndexedProperty;
use davarr::entities::calendar_objects::CALENDAR_TYPE_CALENDAR;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const TIMED_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev1\r\nSUMMARY:Team sync\r\nDTSTART:20160816T090000\r\nDTEND:20160816T100000\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

const ALL_DAY_EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:ev2\r\nSUMMARY:Team offsite\r\nDTSTART;VALUE=DATE:20161005\r\nDTEND;VALUE=DATE:20161008\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

const DUE_TASK: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VTODO\r\nUID:t1\r\nSUMMARY:Water plants\r\nDUE;VALUE=DATE:20160820\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";

fn vcard(uid: &str, name: &str, email: &str) -> String {
    format!(
        "BEGIN:VCARD\r\nVERSION:3.0\r\nUID:{uid}\r\nFN:{name}\r\nEMAIL:{email}\r\nEND:VCARD\r\n"
    )
}

async fn spawn_app(config_tweak: impl FnOnce(&mut Config)) -> (Arc<davarr::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("davarr-search-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config_tweak(&mut config);

    let state = davarr::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = davarr::api::router(state.clone()).await;
    (state, router)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn seed_contacts(state: &davarr::api::AppState, user: &str, count: usize) {
    let book = state
        .store()
        .insert_address_book(&format!("principals/users/{user}"), "personal", "Personal")
        .await
        .unwrap();

    for i in 0..count {
        let uid = format!("card-{i}");
        let name = format!("Erika Mustermann {i}");
        let email = format!("erika{i}@example.com");
        let data = vcard(&uid, &name, &email);
        state
            .store()
            .insert_card(
                book.id,
                &format!("{uid}.vcf"),
                &data,
                &[("FN", &name), ("EMAIL", &email)],
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn contacts_search_returns_entries() {
    let (state, app) = spawn_app(|_| {}).await;
    seed_contacts(&state, "alice", 1).await;

    let (status, json) =
        get_json(app, "/api/search/contacts?user_id=alice&term=erika").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let data = &json["data"];
    assert_eq!(data["is_paginated"], false);
    assert!(data["cursor"].is_null());

    let entries = data["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Erika Mustermann 0");
    assert_eq!(entries[0]["subline"], "erika0@example.com");
    assert_eq!(entries[0]["rounded"], true);
    assert_eq!(entries[0]["thumbnail_url"], "");
    assert!(
        entries[0]["resource_url"]
            .as_str()
            .unwrap()
            .contains("/apps/contacts/direct/contact/")
    );
}

#[tokio::test]
async fn full_page_is_paginated_with_cursor() {
    let (state, app) = spawn_app(|_| {}).await;
    seed_contacts(&state, "alice", 5).await;

    let (status, json) =
        get_json(app.clone(), "/api/search/contacts?user_id=alice&term=erika&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["entries"].as_array().unwrap().len(), 5);
    assert_eq!(data["is_paginated"], true);
    assert_eq!(data["cursor"], 5);

    // The advanced cursor lands past the data, so the next page is empty
    // and unpaginated.
    let (_, json) = get_json(
        app,
        "/api/search/contacts?user_id=alice&term=erika&limit=5&cursor=5",
    )
    .await;
    let data = &json["data"];
    assert_eq!(data["entries"].as_array().unwrap().len(), 0);
    assert_eq!(data["is_paginated"], false);
}

#[tokio::test]
async fn partial_page_is_not_paginated() {
    let (state, app) = spawn_app(|_| {}).await;
    seed_contacts(&state, "alice", 3).await;

    let (_, json) =
        get_json(app, "/api/search/contacts?user_id=alice&term=erika&limit=5").await;

    let data = &json["data"];
    assert_eq!(data["entries"].as_array().unwrap().len(), 3);
    assert_eq!(data["is_paginated"], false);
    assert!(data["cursor"].is_null());
}

#[tokio::test]
async fn instance_disabled_app_yields_defined_empty_result() {
    let (state, app) = spawn_app(|config| {
        config.search.enabled_apps = vec!["calendar".to_string(), "tasks".to_string()];
    })
    .await;
    // Matching data exists, so a non-empty result would prove the gate
    // did not short-circuit.
    seed_contacts(&state, "alice", 2).await;

    let (status, json) =
        get_json(app, "/api/search/contacts?user_id=alice&term=erika").await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["entries"].as_array().unwrap().len(), 0);
    assert_eq!(data["is_paginated"], false);
    assert!(data["cursor"].is_null());
}

#[tokio::test]
async fn user_disabled_app_yields_defined_empty_result() {
    let (state, app) = spawn_app(|_| {}).await;
    seed_contacts(&state, "alice", 2).await;
    state
        .store()
        .set_disabled_apps("alice", &["contacts".to_string()])
        .await
        .unwrap();

    let (_, json) = get_json(app, "/api/search/contacts?user_id=alice&term=erika").await;

    assert_eq!(json["data"]["entries"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["is_paginated"], false);
}

#[tokio::test]
async fn unknown_provider_is_not_found() {
    let (_, app) = spawn_app(|_| {}).await;

    let (status, json) = get_json(app, "/api/search/mail?user_id=alice&term=x").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn event_search_formats_sublines() {
    let (state, app) = spawn_app(|_| {}).await;

    let calendar = state
        .store()
        .insert_calendar("principals/users/bob", "personal", "Personal", "VEVENT,VTODO")
        .await
        .unwrap();

    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "ev1.ics",
            "VEVENT",
            TIMED_EVENT,
            (None, None),
            &[IndexedProperty::plain("SUMMARY", "Team sync")],
        )
        .await
        .unwrap();

    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "ev2.ics",
            "VEVENT",
            ALL_DAY_EVENT,
            (None, None),
            &[IndexedProperty::plain("SUMMARY", "Team offsite")],
        )
        .await
        .unwrap();

    let (status, json) = get_json(app, "/api/search/calendar?user_id=bob&term=team").await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0]["title"], "Team sync");
    assert_eq!(entries[0]["subline"], "08-16 09:00 - 10:00");
    assert_eq!(entries[0]["rounded"], false);
    assert!(
        entries[0]["resource_url"]
            .as_str()
            .unwrap()
            .contains("/apps/calendar/edit/")
    );

    assert_eq!(entries[1]["title"], "Team offsite");
    assert_eq!(entries[1]["subline"], "10-05 - 10-07");
}

#[tokio::test]
async fn event_search_honors_attendee_cn_restriction() {
    let (state, app) = spawn_app(|_| {}).await;

    let calendar = state
        .store()
        .insert_calendar("principals/users/bob", "personal", "Personal", "VEVENT")
        .await
        .unwrap();

    // Attendee value matches only through its CN parameter; a raw mailto
    // value containing the term must not match.
    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "ev1.ics",
            "VEVENT",
            TIMED_EVENT,
            (None, None),
            &[
                IndexedProperty::plain("SUMMARY", "Planning"),
                IndexedProperty::with_parameter("ATTENDEE", "CN", "Ursula Beispiel"),
            ],
        )
        .await
        .unwrap();

    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "ev2.ics",
            "VEVENT",
            TIMED_EVENT,
            (None, None),
            &[
                IndexedProperty::plain("SUMMARY", "Retro"),
                IndexedProperty::plain("ATTENDEE", "mailto:ursula@example.com"),
            ],
        )
        .await
        .unwrap();

    let (_, json) = get_json(app, "/api/search/calendar?user_id=bob&term=ursula").await;

    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Planning");
}

#[tokio::test]
async fn task_search_formats_sublines() {
    let (state, app) = spawn_app(|_| {}).await;

    let calendar = state
        .store()
        .insert_calendar("principals/users/bob", "personal", "Personal", "VEVENT,VTODO")
        .await
        .unwrap();

    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "t1.ics",
            "VTODO",
            DUE_TASK,
            (None, None),
            &[IndexedProperty::plain("SUMMARY", "Water plants")],
        )
        .await
        .unwrap();

    let (status, json) = get_json(app, "/api/search/tasks?user_id=bob&term=water").await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Water plants");
    assert_eq!(entries[0]["subline"], "Due on 08-20");
}

#[tokio::test]
async fn absence_api_round_trip() {
    let (_, app) = spawn_app(|_| {}).await;

    let body = serde_json::json!({
        "first_day": "2030-06-10",
        "last_day": "2030-06-14",
        "short_message": "Away",
        "message": "Back on the 15th"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/users/alice/absence")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, json) = get_json(app.clone(), "/api/users/alice/absence").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["first_day"], "2030-06-10");
    assert_eq!(json["data"]["last_day"], "2030-06-14");
    assert_eq!(json["data"]["short_message"], "Away");

    // Both window edges are in the future, so two one-shot jobs wait.
    let (_, json) = get_json(app.clone(), "/api/jobs").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/alice/absence")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = get_json(app.clone(), "/api/users/alice/absence").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = get_json(app, "/api/jobs").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn component_filter_separates_events_from_tasks() {
    let (state, app) = spawn_app(|_| {}).await;

    let calendar = state
        .store()
        .insert_calendar("principals/users/bob", "personal", "Personal", "VEVENT,VTODO")
        .await
        .unwrap();

    state
        .store()
        .insert_calendar_object(
            calendar.id,
            CALENDAR_TYPE_CALENDAR,
            "t1.ics",
            "VTODO",
            DUE_TASK,
            (None, None),
            &[IndexedProperty::plain("SUMMARY", "Water plants")],
        )
        .await
        .unwrap();

    // The task is indexed, but the events provider filters on VEVENT.
    let (_, json) = get_json(app, "/api/search/calendar?user_id=bob&term=water").await;
    assert_eq!(json["data"]["entries"].as_array().unwrap().len(), 0);
}
