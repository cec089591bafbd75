//! Journal flows: startup warm-up, listing, and appending entries.

use recall_engine::{Screen, StatusKind, StatusLine};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn bootstrap_warms_the_store_and_reports_health() {
    let server = common::start_backend().await;
    common::mount_health(&server).await;
    common::mount_get(
        &server,
        "/users/test-user/journals",
        json!({ "journals": common::journal_corpus() }),
    )
    .await;
    common::mount_get(
        &server,
        "/users/test-user/reminders",
        json!({ "reminders": [] }),
    )
    .await;
    common::mount_get(
        &server,
        "/users/test-user/locations",
        json!({ "current": { "latitude": 12.97, "longitude": 77.59 } }),
    )
    .await;

    let mut app = common::app_for(&server);
    app.bootstrap();

    common::settle(&mut app, |app| {
        app.backend_ok() == Some(true)
            && app.journal().entries().len() == 2
            && app.map().points().current.is_some()
    })
    .await;
}

#[tokio::test]
async fn opening_the_journal_fetches_the_list() {
    let server = common::start_backend().await;
    common::mount_store(&server, common::journal_corpus()).await;

    let mut app = common::app_for(&server);
    app.open(Screen::Journal);
    assert!(app.journal().is_loading());

    common::settle(&mut app, |app| !app.journal().is_loading()).await;

    let entries = app.journal().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Tea with Meera in the garden");
}

#[tokio::test]
async fn submitting_an_entry_round_trips_through_the_backend() {
    let server = common::start_backend().await;
    common::mount_store(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/journals"))
        .and(body_partial_json(json!({ "text": "Fed the cat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "journals": [{ "text": "Fed the cat", "createdAt": "2026-08-22T08:00:00Z" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Journal);
    common::settle(&mut app, |app| !app.journal().is_loading()).await;

    common::type_text(&mut app, "Fed the cat");
    app.submit_journal_entry();
    assert!(app.journal().is_saving());

    common::settle(&mut app, |app| !app.journal().is_saving()).await;

    assert_eq!(app.journal().entries().len(), 1);
    assert!(app.journal().draft().is_empty());
    assert_eq!(
        app.status().map(StatusLine::kind),
        Some(StatusKind::Success)
    );
}

#[tokio::test]
async fn a_failed_save_keeps_the_draft_for_retry() {
    let server = common::start_backend().await;
    common::mount_store(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/journals"))
        .respond_with(ResponseTemplate::new(400).set_body_string("entry rejected"))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Journal);
    common::settle(&mut app, |app| !app.journal().is_loading()).await;

    common::type_text(&mut app, "Fed the cat");
    app.submit_journal_entry();
    common::settle(&mut app, |app| !app.journal().is_saving()).await;

    assert!(app.journal().entries().is_empty());
    assert_eq!(app.journal().draft().text(), "Fed the cat");
    assert_eq!(app.status().map(StatusLine::kind), Some(StatusKind::Error));
}
