//! Companion flows: chat turns, spoken-style reminders, and the
//! two-press SOS alert.

use recall_engine::{Screen, StatusKind, StatusLine};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn a_chat_turn_carries_identity_and_lands_a_clean_reply() {
    let server = common::start_backend().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(
            json!({ "userName": "Mira", "userId": "test-user" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": " \u{1b}[32mOf course\u{1b}[0m, Mira. ",
            "title": "A calm morning"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Chat);
    common::type_text(&mut app, "Can we talk for a bit?");
    app.send_chat_message();

    assert!(app.chat().is_waiting());
    assert_eq!(app.chat().messages().len(), 2);

    common::settle(&mut app, |app| !app.chat().is_waiting()).await;

    let last = app.chat().messages().last().expect("assistant reply");
    assert_eq!(last.text, "Of course, Mira.");
    assert_eq!(app.chat().title(), Some("A calm morning"));
}

#[tokio::test]
async fn a_reminder_is_heard_confirmed_and_saved() {
    let server = common::start_backend().await;
    common::mount_get(
        &server,
        "/users/test-user/reminders",
        json!({ "reminders": [] }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(
            json!({ "text": "Call the nurse tomorrow at 4pm" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "date": "2026-08-24", "time": "16:00", "message": "Call the nurse" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/reminders"))
        .and(body_partial_json(json!({
            "date": "2026-08-24",
            "time": "16:00",
            "message": "Call the nurse"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reminders": [{ "date": "2026-08-24", "time": "16:00", "message": "Call the nurse" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Reminders);
    common::settle(&mut app, |app| !app.reminders().is_loading()).await;

    common::type_text(&mut app, "Call the nurse tomorrow at 4pm");
    app.submit_reminder_text();
    assert!(app.reminders().is_analyzing());

    common::settle(&mut app, |app| !app.reminders().is_analyzing()).await;
    let pending = app.reminders().pending().expect("heard a reminder");
    assert_eq!(pending.message, "Call the nurse");
    assert!(app.reminders().draft().is_empty());

    app.confirm_reminder();
    common::settle(&mut app, |app| !app.reminders().is_saving()).await;

    assert!(app.reminders().pending().is_none());
    assert_eq!(app.reminders().reminders().len(), 1);
    assert_eq!(
        app.status().map(StatusLine::kind),
        Some(StatusKind::Success)
    );
}

#[tokio::test]
async fn prose_without_a_reminder_keeps_the_typed_text() {
    let server = common::start_backend().await;
    common::mount_get(
        &server,
        "/users/test-user/reminders",
        json!({ "reminders": [] }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "NO" })))
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.open(Screen::Reminders);
    common::settle(&mut app, |app| !app.reminders().is_loading()).await;

    common::type_text(&mut app, "It was a lovely day");
    app.submit_reminder_text();
    common::settle(&mut app, |app| !app.reminders().is_analyzing()).await;

    assert!(app.reminders().pending().is_none());
    assert_eq!(app.reminders().draft().text(), "It was a lovely day");
    assert_eq!(app.status().map(StatusLine::kind), Some(StatusKind::Info));
}

#[tokio::test]
async fn the_second_sos_press_sends_the_last_known_point() {
    let server = common::start_backend().await;
    common::mount_get(
        &server,
        "/users/test-user/locations",
        json!({ "current": { "latitude": 12.97, "longitude": 77.59 } }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/sos"))
        .and(body_partial_json(json!({
            "point": { "latitude": 12.97, "longitude": 77.59 }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    app.refresh_points();
    common::settle(&mut app, |app| app.map().points().current.is_some()).await;

    app.press_sos();
    assert!(app.home().sos_armed());
    app.press_sos();
    assert!(!app.home().sos_armed());

    common::settle(&mut app, |app| {
        app.status().map(StatusLine::kind) == Some(StatusKind::Success)
    })
    .await;
    let text = app.status().map(StatusLine::text).expect("confirmation");
    assert!(text.contains("Alert sent"), "unexpected status: {text}");
}
