//! Shared test utilities and fixtures
//!
//! Mock companion-backend mounts and an `App` settle loop shared by the
//! end-to-end suite.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use recall_engine::{App, Profile};
use recall_types::ui::UiOptions;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "test-user";
pub const USER_NAME: &str = "Mira";

/// Start a mock server that stands in for the companion backend.
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

/// An `App` pointed at the mock backend.
pub fn app_for(server: &MockServer) -> App {
    let profile = Profile {
        server_url: server.uri(),
        api_token: None,
        user_id: USER_ID.to_string(),
        user_name: USER_NAME.to_string(),
    };
    App::with_profile(profile, UiOptions::default())
}

/// Mount the read side of the profile store: health plus every GET
/// list. Tests that care about the journal corpus pass its body; the
/// other lists come back empty.
pub async fn mount_store(server: &MockServer, journals: Value) {
    mount_health(server).await;
    mount_get(
        server,
        &format!("/users/{USER_ID}/journals"),
        json!({ "journals": journals }),
    )
    .await;
    mount_get(
        server,
        &format!("/users/{USER_ID}/reminders"),
        json!({ "reminders": [] }),
    )
    .await;
    mount_get(
        server,
        &format!("/users/{USER_ID}/quiz-scores"),
        json!({ "scores": [] }),
    )
    .await;
    mount_get(
        server,
        &format!("/users/{USER_ID}/meditation-sessions"),
        json!({ "sessions": [] }),
    )
    .await;
    mount_get(server, &format!("/users/{USER_ID}/locations"), json!({})).await;
}

pub async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Two journal entries to generate quizzes and cards from.
pub fn journal_corpus() -> Value {
    json!([
        { "text": "Tea with Meera in the garden", "createdAt": "2026-08-20T10:00:00Z" },
        { "text": "Walked to the market with Ravi", "createdAt": "2026-08-21T09:30:00Z" }
    ])
}

/// Poll task completions until `ready` holds. Panics if the app does
/// not settle within five seconds.
pub async fn settle(app: &mut App, ready: impl Fn(&App) -> bool) {
    let start = Instant::now();
    while !ready(app) {
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "app did not settle in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
        app.poll_tasks();
    }
}

/// Type into whichever draft the current screen exposes.
pub fn type_text(app: &mut App, text: &str) {
    app.active_draft_mut()
        .expect("the current screen has a draft")
        .enter_text(text);
}
