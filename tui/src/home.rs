//! Home screen: the main menu, name editing, and the SOS prompt.

use chrono::{Local, Timelike};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use recall_engine::{App, Screen};

use crate::shared::{draw_draft, hint_line, panel};
use crate::theme::{Glyphs, Palette, styles};

fn greeting_word() -> &'static str {
    match Local::now().hour() {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=21 => "Good evening",
        _ => "Hello",
    }
}

fn menu_caption(screen: Screen) -> &'static str {
    match screen {
        Screen::Journal => "write down the day",
        Screen::Quiz => "questions from your own days",
        Screen::Puzzle => "a gentle matching game",
        Screen::Cards => "flip through your memories",
        Screen::Breathe => "a calm minute together",
        Screen::Map => "the places that matter",
        Screen::Chat => "talk to your companion",
        Screen::Reminders => "things not to forget",
        Screen::Home => "",
    }
}

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    draw_menu(frame, app, columns[0], palette, glyphs);
    draw_side_panel(frame, app, columns[1], palette, glyphs);
}

fn draw_menu(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Recall", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let name = app.profile().user_name.clone();
    let greeting = Line::from(vec![
        Span::styled(
            format!("{}, ", greeting_word()),
            Style::default().fg(palette.text_secondary),
        ),
        Span::styled(name, styles::user_name(palette)),
        Span::styled(".", Style::default().fg(palette.text_secondary)),
    ]);
    frame.render_widget(Paragraph::new(greeting), rows[0]);

    let selected = app.home().selected();
    let mut lines = Vec::with_capacity(Screen::MENU.len());
    for (index, screen) in Screen::MENU.iter().enumerate() {
        let marker = if index == selected {
            glyphs.selected
        } else {
            " "
        };
        let style = if index == selected {
            styles::menu_selected(palette)
        } else {
            Style::default().fg(palette.text_primary)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{}. ", index + 1), style),
            Span::styled(format!("{:<14}", screen.title()), style),
            Span::styled(
                menu_caption(*screen).to_string(),
                Style::default().fg(palette.text_muted),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), rows[1]);

    if app.home().editing_name() {
        draw_draft(
            frame,
            rows[2],
            app.home().name_draft(),
            "Your name: ",
            palette,
            true,
        );
    }
}

fn draw_side_panel(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let due = app.reminders().due_soon(Local::now().naive_local());
    let sos_armed = app.home().sos_armed();

    let block = panel("Coming up", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    if sos_armed {
        lines.push(Line::from(Span::styled(
            "Press S again to send an alert.",
            styles::sos(palette),
        )));
        lines.push(Line::from(Span::styled(
            "Press Esc if you pressed it by mistake.",
            Style::default().fg(palette.text_muted),
        )));
        lines.push(Line::from(""));
    }

    if due.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing due right now.",
            Style::default().fg(palette.text_muted),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Due soon:",
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        )));
        for reminder in due {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {} ", glyphs.bell),
                    Style::default().fg(palette.warning),
                ),
                Span::styled(
                    format!("{} ", reminder.time),
                    Style::default().fg(palette.text_secondary),
                ),
                Span::styled(
                    reminder.message.clone(),
                    Style::default().fg(palette.text_primary),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(hint_line(
        &[("S", "ask for help"), ("n", "change name")],
        palette,
    ));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
