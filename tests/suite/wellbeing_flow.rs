//! Wellbeing flows: storing breathing sessions and pinning places.

use std::time::Duration;

use recall_engine::{Screen, StatusKind, StatusLine};
use recall_types::GeoRole;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn a_finished_breathing_session_is_stored() {
    let server = common::start_backend().await;
    common::mount_get(
        &server,
        "/users/test-user/meditation-sessions",
        json!({ "sessions": [] }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/meditation-sessions"))
        .and(body_partial_json(json!({ "seconds": 12 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [{ "seconds": 12, "startedAt": "2026-08-22T07:00:00Z" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Breathe);

    app.toggle_breathing();
    app.tick(Duration::from_secs(12));
    app.toggle_breathing();
    assert_eq!(app.breathe().timer().seconds(), 12);

    app.save_breathing_session();
    assert!(app.breathe().is_saving());
    common::settle(&mut app, |app| !app.breathe().is_saving()).await;

    assert_eq!(app.breathe().sessions().len(), 1);
    assert_eq!(app.breathe().timer().seconds(), 0);
    assert_eq!(
        app.status().map(StatusLine::kind),
        Some(StatusKind::Success)
    );
}

#[tokio::test]
async fn a_saved_place_moves_the_pin_only_after_the_backend_confirms() {
    let server = common::start_backend().await;
    common::mount_get(&server, "/users/test-user/locations", json!({})).await;
    Mock::given(method("PUT"))
        .and(path("/users/test-user/locations/saved"))
        .and(body_partial_json(
            json!({ "latitude": 12.97, "longitude": 77.59 }),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Map);
    common::settle(&mut app, |app| !app.map().is_loading()).await;

    app.start_location_edit(GeoRole::Saved);
    common::type_text(&mut app, "12.97, 77.59");
    app.submit_location();

    // The pin waits for the backend.
    assert_eq!(app.map().saving(), Some(GeoRole::Saved));
    assert_eq!(app.map().points().saved, None);

    common::settle(&mut app, |app| app.map().saving().is_none()).await;

    let saved = app.map().points().saved.expect("pin placed");
    assert!((saved.latitude - 12.97).abs() < f64::EPSILON);
    assert!((saved.longitude - 77.59).abs() < f64::EPSILON);
    assert_eq!(
        app.status().map(StatusLine::kind),
        Some(StatusKind::Success)
    );
}

#[tokio::test]
async fn a_rejected_place_leaves_the_map_unchanged() {
    let server = common::start_backend().await;
    common::mount_get(&server, "/users/test-user/locations", json!({})).await;
    Mock::given(method("PUT"))
        .and(path("/users/test-user/locations/home"))
        .respond_with(ResponseTemplate::new(403).set_body_string("collaborator only"))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Map);
    common::settle(&mut app, |app| !app.map().is_loading()).await;

    app.start_location_edit(GeoRole::Home);
    common::type_text(&mut app, "51.5, -0.12");
    app.submit_location();
    common::settle(&mut app, |app| app.map().saving().is_none()).await;

    assert_eq!(app.map().points().home, None);
    assert_eq!(app.status().map(StatusLine::kind), Some(StatusKind::Error));
}
