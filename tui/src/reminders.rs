//! Reminders screen: the stored list plus a free-text composer that runs
//! through the extraction endpoint and a yes/no confirmation step.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use recall_engine::App;
use recall_types::Reminder;

use crate::shared::{draw_draft, hint_line, panel};
use crate::theme::{Glyphs, Palette, spinner_frame};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let bottom = if app.reminders().pending().is_some() {
        7
    } else {
        3
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(bottom)])
        .split(area);

    draw_list(frame, app, rows[0], palette, glyphs);
    if app.reminders().pending().is_some() {
        draw_confirmation(frame, app, rows[1], palette);
    } else {
        draw_composer(frame, app, rows[1], palette);
    }
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Reminders", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.reminders().is_loading() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        let line = Line::from(Span::styled(
            format!("{spinner} Fetching your reminders..."),
            Style::default().fg(palette.text_muted),
        ));
        frame.render_widget(Paragraph::new(line), inner);
        return;
    }

    let reminders = app.reminders().reminders();
    if reminders.is_empty() {
        let lines = vec![
            Line::from(Span::styled(
                "Nothing to remember yet.",
                Style::default().fg(palette.text_secondary),
            )),
            Line::from(Span::styled(
                "Type something like \"call Sam tomorrow at 3pm\" below.",
                Style::default().fg(palette.text_muted),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let now = Local::now().naive_local();
    let fit = inner.height as usize;
    let mut lines = Vec::new();
    for reminder in reminders.iter().take(fit) {
        lines.push(reminder_line(reminder, now, palette, glyphs));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn reminder_line<'a>(
    reminder: &'a Reminder,
    now: chrono::NaiveDateTime,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'a> {
    let when = reminder.schedule().map_or_else(
        || format!("{} {}", reminder.date, reminder.time),
        |at| at.format("%a %-d %b, %H:%M").to_string(),
    );

    if reminder.is_due_soon(now) {
        let style = Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled(format!("{} {when}  ", glyphs.bell), style),
            Span::styled(reminder.message.as_str(), style),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!("  {when}  "), Style::default().fg(palette.calm)),
            Span::styled(
                reminder.message.as_str(),
                Style::default().fg(palette.text_primary),
            ),
        ])
    }
}

fn draw_confirmation(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let Some(pending) = app.reminders().pending() else {
        return;
    };

    let block = panel("Did I get this right?", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let when = if pending.time.is_empty() {
        pending.date.clone()
    } else {
        format!("{} at {}", pending.date, pending.time)
    };
    let mut lines = vec![
        Line::from(Span::styled(
            pending.message.clone(),
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(when, Style::default().fg(palette.calm))),
        Line::from(""),
    ];
    if app.reminders().is_saving() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        lines.push(Line::from(Span::styled(
            format!("{spinner} Saving..."),
            Style::default().fg(palette.text_muted),
        )));
    } else {
        lines.push(hint_line(
            &[("y", "save it"), ("n", "that's not it")],
            palette,
        ));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_composer(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = if app.reminders().is_analyzing() {
        "Listening..."
    } else {
        "What should I remind you about?"
    };
    let block = panel(title, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    draw_draft(
        frame,
        inner,
        app.reminders().draft(),
        "> ",
        palette,
        !app.reminders().is_analyzing(),
    );
}
