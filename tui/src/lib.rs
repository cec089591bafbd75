//! TUI rendering for Recall using ratatui.

mod breathe;
mod cards;
mod chat;
mod home;
mod input;
mod journal;
mod map;
mod puzzle;
mod quiz;
mod reminders;
mod shared;
mod theme;

pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use recall_engine::{App, Screen, StatusKind};

use self::shared::hint_line;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Screen body
            Constraint::Length(1), // Key hints
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], &palette, &glyphs);

    match app.screen() {
        Screen::Home => home::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Journal => journal::draw(frame, app, chunks[1], &palette),
        Screen::Quiz => quiz::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Puzzle => puzzle::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Cards => cards::draw(frame, app, chunks[1], &palette),
        Screen::Breathe => breathe::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Map => map::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Chat => chat::draw(frame, app, chunks[1], &palette, &glyphs),
        Screen::Reminders => reminders::draw(frame, app, chunks[1], &palette, &glyphs),
    }

    frame.render_widget(hint_line(&screen_hints(app), &palette), chunks[2]);
    draw_status_bar(frame, app, chunks[3], &palette);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let (dot, dot_color) = match app.backend_ok() {
        Some(true) => (glyphs.backend_up, palette.success),
        Some(false) => (glyphs.backend_down, palette.error),
        None => (glyphs.backend_unknown, palette.text_muted),
    };
    let right = Line::from(vec![
        Span::styled(
            app.profile().user_name.clone(),
            Style::default().fg(palette.text_secondary),
        ),
        Span::raw(" "),
        Span::styled(dot.to_string(), Style::default().fg(dot_color)),
    ]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right.width() as u16)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Recall",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", app.screen().title()),
            Style::default().fg(palette.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), columns[0]);
    frame.render_widget(
        Paragraph::new(right).alignment(Alignment::Right),
        columns[1],
    );
}

fn screen_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    match app.screen() {
        Screen::Home if app.home().editing_name() => {
            vec![("Enter", "save your name"), ("Esc", "cancel")]
        }
        Screen::Home => vec![
            ("Up/Down", "choose"),
            ("Enter", "open"),
            ("1-8", "jump"),
            ("q", "quit"),
        ],
        Screen::Journal => vec![("Enter", "save the entry"), ("Esc", "home")],
        Screen::Quiz => vec![
            ("1-4", "answer"),
            ("Enter", "next"),
            ("g", "new quiz"),
            ("Esc", "home"),
        ],
        Screen::Puzzle => vec![
            ("arrows", "move"),
            ("Enter", "flip"),
            ("n", "new board"),
            ("Esc", "home"),
        ],
        Screen::Cards => vec![
            ("Left/Right", "tilt"),
            ("Enter", "let go"),
            ("n", "next"),
            ("p", "back"),
            ("Esc", "home"),
        ],
        Screen::Breathe => vec![
            ("Space", "start/pause"),
            ("s", "save"),
            ("r", "start over"),
            ("Esc", "home"),
        ],
        Screen::Map if app.map().editing().is_some() => {
            vec![("Enter", "save the spot"), ("Esc", "cancel")]
        }
        Screen::Map => vec![
            ("c", "current"),
            ("s", "saved"),
            ("h", "home spot"),
            ("r", "refresh"),
            ("Esc", "home"),
        ],
        Screen::Chat => vec![("Enter", "send"), ("Esc", "home")],
        Screen::Reminders if app.reminders().pending().is_some() => {
            vec![("y", "save it"), ("n", "discard")]
        }
        Screen::Reminders => vec![("Enter", "set a reminder"), ("Esc", "home")],
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (text, style) = if let Some(status) = app.status() {
        let color = match status.kind() {
            StatusKind::Error => palette.error,
            StatusKind::Success => palette.success,
            StatusKind::Info => palette.text_secondary,
        };
        (status.text().to_string(), Style::default().fg(color))
    } else {
        // An always-on anchor for the day; people who forget dates lean on it.
        (
            Local::now().format("Today is %A, %-d %B").to_string(),
            Style::default().fg(palette.text_muted),
        )
    };

    let status = Paragraph::new(Line::from(vec![Span::raw(" "), Span::styled(text, style)]));
    frame.render_widget(status, area);
}
