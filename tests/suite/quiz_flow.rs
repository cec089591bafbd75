//! Generation flows: quizzes and memory cards built from the journal
//! corpus, and the score history that finishing a quiz appends to.

use recall_engine::{App, Screen, StatusKind, StatusLine};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

/// Load the journal corpus so opening Quiz or Cards auto-generates.
async fn warm_journal(app: &mut App) {
    app.open(Screen::Journal);
    common::settle(app, |app| !app.journal().is_loading()).await;
    assert_eq!(app.journal().entries().len(), 2);
}

#[tokio::test]
async fn a_quiz_generates_answers_by_text_and_records_the_score() {
    let server = common::start_backend().await;
    common::mount_store(&server, common::journal_corpus()).await;
    Mock::given(method("POST"))
        .and(path("/generate-quiz"))
        .and(body_partial_json(json!({ "userName": "Mira" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": [
                {
                    "question": "Who came for tea?",
                    "options": ["Ravi", "Meera", "Sana", "The postman"],
                    "correct": "Meera",
                    "explanation": "You wrote about tea with Meera in the garden."
                },
                {
                    "question": "Where did you walk?",
                    "options": ["The park", "The market", "The river", "Nowhere"],
                    "correct": "Somewhere else entirely",
                    "explanation": "You walked to the market with Ravi."
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/test-user/quiz-scores"))
        .and(body_partial_json(json!({ "score": 1, "total": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scores": [{ "score": 1, "total": 2, "createdAt": "2026-08-22T10:00:00Z" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    warm_journal(&mut app).await;

    app.open(Screen::Quiz);
    assert!(app.quiz().is_loading());
    common::settle(&mut app, |app| !app.quiz().is_loading()).await;

    // Answer text maps onto its option index.
    let first = app.quiz().question().expect("first question");
    assert_eq!(first.answer_index(), 1);
    assert!(first.answer_matched());

    app.choose_quiz_option(1);
    assert!(app.quiz().is_revealed());
    app.next_quiz_question();

    // Unmatched answer text falls back to the first option, flagged.
    let second = app.quiz().question().expect("second question");
    assert_eq!(second.answer_index(), 0);
    assert!(!second.answer_matched());

    app.choose_quiz_option(3);
    app.next_quiz_question();

    assert!(app.quiz().is_finished());
    assert_eq!(app.quiz().correct_count(), 1);

    common::settle(&mut app, |app| app.quiz().past_scores().len() == 1).await;
    assert_eq!(
        app.status().map(StatusLine::kind),
        Some(StatusKind::Success)
    );
}

#[tokio::test]
async fn an_empty_generation_is_reported_gently() {
    let server = common::start_backend().await;
    common::mount_store(&server, common::journal_corpus()).await;
    Mock::given(method("POST"))
        .and(path("/generate-quiz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "questions": [] })))
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    warm_journal(&mut app).await;

    app.open(Screen::Quiz);
    common::settle(&mut app, |app| !app.quiz().is_loading()).await;

    assert!(app.quiz().question().is_none());
    assert_eq!(app.status().map(StatusLine::kind), Some(StatusKind::Info));
}

#[tokio::test]
async fn cards_tolerate_the_alternate_array_key_and_skip_blank_summaries() {
    let server = common::start_backend().await;
    common::mount_store(&server, common::journal_corpus()).await;
    Mock::given(method("POST"))
        .and(path("/generate-flashcards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cards": [
                { "title": "Garden tea", "summary": "Tea with Meera in the garden." },
                { "summary": "A walk to the market with Ravi." },
                { "title": "No summary here" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = common::app_for(&server);
    warm_journal(&mut app).await;

    app.open(Screen::Cards);
    assert!(app.cards().is_loading());
    common::settle(&mut app, |app| !app.cards().is_loading()).await;

    assert_eq!(app.cards().deck().len(), 2);
    assert_eq!(app.cards().deck().index(), 0);
}
