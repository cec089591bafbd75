//! Input handling for the Recall TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use recall_engine::{App, Draft, Screen};
use recall_types::GeoRole;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame
/// loop over a bounded channel.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so the input thread unblocks if it is
        // currently backpressured on a send.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Bounded queue: apply backpressure instead of dropping
                    // events, so held-down keys stay in order.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain this frame's input. Returns `Ok(true)` when the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

fn apply_event(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) => {
            // Handle press + repeat events (ignore releases)
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            // Ctrl+C always quits, whatever the screen is doing.
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return true;
            }

            match app.screen() {
                Screen::Home => handle_home(app, key),
                Screen::Journal => handle_journal(app, key),
                Screen::Quiz => handle_quiz(app, key),
                Screen::Puzzle => handle_puzzle(app, key),
                Screen::Cards => handle_cards(app, key),
                Screen::Breathe => handle_breathe(app, key),
                Screen::Map => handle_map(app, key),
                Screen::Chat => handle_chat(app, key),
                Screen::Reminders => handle_reminders(app, key),
            }
        }
        Event::Paste(text) => {
            // Drafts are single lines; flatten pasted line breaks to spaces.
            if let Some(draft) = app.active_draft_mut() {
                let flattened = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
                draft.enter_text(&flattened);
            }
        }
        _ => {}
    }
    app.should_quit()
}

/// Text-editing keys shared by every draft. Returns true when consumed;
/// Enter and Esc fall through to the screen handler.
fn handle_draft_key(draft: &mut Draft, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            draft.clear();
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            draft.delete_word_backwards();
        }
        // Insert character (ignore \r - newlines never enter a draft)
        KeyCode::Char(c) if c != '\r' && !key.modifiers.contains(KeyModifiers::CONTROL) => {
            draft.enter_char(c);
        }
        KeyCode::Backspace => {
            draft.delete_char();
        }
        KeyCode::Delete => {
            draft.delete_char_forward();
        }
        KeyCode::Left => {
            draft.move_cursor_left();
        }
        KeyCode::Right => {
            draft.move_cursor_right();
        }
        KeyCode::Home => {
            draft.move_cursor_home();
        }
        KeyCode::End => {
            draft.move_cursor_end();
        }
        _ => return false,
    }
    true
}

fn handle_home(app: &mut App, key: KeyEvent) {
    if app.home().editing_name() {
        if let Some(draft) = app.active_draft_mut()
            && handle_draft_key(draft, key)
        {
            return;
        }
        match key.code {
            KeyCode::Enter => app.submit_user_name(),
            KeyCode::Esc => app.cancel_name_edit(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.menu_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('n') => app.start_name_edit(),
        KeyCode::Char('S') => app.press_sos(),
        KeyCode::Esc => app.cancel_sos(),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c as usize - '1' as usize;
            app.open(Screen::MENU[index]);
        }
        _ => {}
    }
}

fn handle_journal(app: &mut App, key: KeyEvent) {
    if let Some(draft) = app.active_draft_mut()
        && handle_draft_key(draft, key)
    {
        return;
    }
    match key.code {
        KeyCode::Enter => app.submit_journal_entry(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_quiz(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='4') => {
            app.choose_quiz_option(c as usize - '1' as usize);
        }
        KeyCode::Enter => app.next_quiz_question(),
        KeyCode::Char('g') => app.start_quiz(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_puzzle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_puzzle_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_puzzle_cursor(0, 1),
        KeyCode::Left | KeyCode::Char('h') => app.move_puzzle_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_puzzle_cursor(1, 0),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_puzzle_cell(),
        KeyCode::Char('n') => app.new_puzzle(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_cards(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Right => app.nudge_card(1.0),
        KeyCode::Left => app.nudge_card(-1.0),
        KeyCode::Enter | KeyCode::Char(' ') => app.release_card(),
        KeyCode::Char('n') => app.next_card(),
        KeyCode::Char('p') => app.previous_card(),
        KeyCode::Char('g') => app.draw_cards(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_breathe(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') => app.toggle_breathing(),
        KeyCode::Char('r') => app.reset_breathing(),
        KeyCode::Char('s') => app.save_breathing_session(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_map(app: &mut App, key: KeyEvent) {
    if app.map().editing().is_some() {
        if let Some(draft) = app.active_draft_mut()
            && handle_draft_key(draft, key)
        {
            return;
        }
        match key.code {
            KeyCode::Enter => app.submit_location(),
            KeyCode::Esc => app.cancel_location_edit(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('c') => app.start_location_edit(GeoRole::Current),
        KeyCode::Char('s') => app.start_location_edit(GeoRole::Saved),
        KeyCode::Char('h') => app.start_location_edit(GeoRole::Home),
        KeyCode::Char('r') => app.refresh_points(),
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    if let Some(draft) = app.active_draft_mut()
        && handle_draft_key(draft, key)
    {
        return;
    }
    match key.code {
        KeyCode::Enter => app.send_chat_message(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_reminders(app: &mut App, key: KeyEvent) {
    if app.reminders().pending().is_some() {
        match key.code {
            KeyCode::Char('y') => app.confirm_reminder(),
            KeyCode::Char('n') | KeyCode::Esc => app.discard_reminder(),
            _ => {}
        }
        return;
    }

    if let Some(draft) = app.active_draft_mut()
        && handle_draft_key(draft, key)
    {
        return;
    }
    match key.code {
        KeyCode::Enter => app.submit_reminder_text(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}
