//! Screen rendering tests against an in-memory vt100 terminal.
//!
//! Each test draws one frame of a screen and asserts on the text the
//! parsed terminal ends up holding. Layout details (colors, borders,
//! exact columns) are left to the eye; these pin the words a user must
//! be able to see.

mod vt100_backend;

use ratatui::Terminal;
use recall_engine::{App, Profile, Screen};
use recall_tui::draw;
use recall_types::ui::UiOptions;

use vt100_backend::Vt100Backend;

fn test_app() -> App {
    let profile = Profile {
        server_url: "http://127.0.0.1:9".to_string(),
        api_token: None,
        user_id: "test-user".to_string(),
        user_name: "Mira".to_string(),
    };
    App::with_profile(profile, UiOptions::default())
}

fn render(app: &mut App) -> String {
    let backend = Vt100Backend::new(80, 24);
    let mut terminal = Terminal::new(backend).expect("vt100 terminal");
    terminal
        .draw(|frame| draw(frame, app))
        .expect("draw one frame");
    terminal.backend().contents()
}

#[test]
fn the_home_screen_greets_and_lists_every_activity() {
    let mut app = test_app();
    let screen = render(&mut app);

    assert!(screen.contains("Recall"), "missing app title:\n{screen}");
    assert!(screen.contains("Mira"), "missing user name:\n{screen}");
    for entry in Screen::MENU {
        assert!(
            screen.contains(entry.title()),
            "missing menu entry {:?}:\n{screen}",
            entry.title()
        );
    }
    assert!(screen.contains("Coming up"), "missing due panel:\n{screen}");
    assert!(screen.contains("Today is"), "missing date anchor:\n{screen}");
}

#[tokio::test]
async fn the_journal_screen_shows_loading_then_the_composer() {
    let mut app = test_app();
    app.open(Screen::Journal);

    let screen = render(&mut app);
    assert!(
        screen.contains("Fetching your memories..."),
        "missing loading notice:\n{screen}"
    );
    assert!(
        screen.contains("What happened today?"),
        "missing composer prompt:\n{screen}"
    );
}

#[tokio::test]
async fn the_quiz_screen_invites_generation_when_the_corpus_is_unknown() {
    let mut app = test_app();
    app.open(Screen::Quiz);

    let screen = render(&mut app);
    assert!(
        screen.contains("Press g and I'll make a quiz from your journal."),
        "missing empty-state invitation:\n{screen}"
    );
}

#[test]
fn the_puzzle_board_starts_with_zero_moves() {
    let mut app = test_app();
    app.open(Screen::Puzzle);

    let screen = render(&mut app);
    assert!(
        screen.contains("Matching Pairs"),
        "missing board title:\n{screen}"
    );
    assert!(screen.contains("Moves: 0"), "missing move count:\n{screen}");
}

#[tokio::test]
async fn the_breathing_screen_offers_to_start() {
    let mut app = test_app();
    app.open(Screen::Breathe);

    let screen = render(&mut app);
    assert!(
        screen.contains("Press Space and we'll breathe together."),
        "missing start hint:\n{screen}"
    );
}

#[test]
fn the_chat_screen_opens_with_a_greeting() {
    let mut app = test_app();
    app.open(Screen::Chat);

    let screen = render(&mut app);
    assert!(
        screen.contains("always here if you want to talk"),
        "missing companion greeting:\n{screen}"
    );
    assert!(
        screen.contains("Say something"),
        "missing composer panel:\n{screen}"
    );
}

#[test]
fn typing_echoes_into_the_composer() {
    let mut app = test_app();
    // Chat spawns nothing on open, so no runtime is needed here.
    app.open(Screen::Chat);
    if let Some(draft) = app.active_draft_mut() {
        draft.enter_text("hello there");
    }

    let screen = render(&mut app);
    assert!(
        screen.contains("> hello there"),
        "missing echoed draft:\n{screen}"
    );
}
