//! Breathing screen: a guided box-breathing circle and session history.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use recall_engine::App;
use recall_types::BreathSegment;

use crate::shared::{friendly_date, panel};
use crate::theme::{Glyphs, Palette, spinner_frame};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(area);

    draw_circle(frame, app, columns[0], palette, glyphs);
    draw_sessions(frame, app, columns[1], palette);
}

/// How "full" the breath is right now, 0 at empty lungs and 1 at full.
fn amplitude(app: &App) -> f32 {
    let timer = app.breathe().timer();
    match timer.segment() {
        None => 0.0,
        Some(BreathSegment::In) => timer.segment_progress(),
        Some(BreathSegment::HoldTop) => 1.0,
        Some(BreathSegment::Out) => 1.0 - timer.segment_progress(),
        Some(BreathSegment::HoldBottom) => 0.0,
    }
}

fn draw_circle(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Breathe", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let timer = app.breathe().timer();
    let mut lines = vec![Line::from("")];

    lines.push(Line::from(Span::styled(
        timer.phase().label().to_string(),
        Style::default()
            .fg(palette.calm)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    if timer.segment().is_some() {
        let options = app.ui_options();
        let max_width = (inner.width.saturating_sub(8) as f32).max(4.0);
        let breadth = if options.reduced_motion {
            max_width * 0.5
        } else {
            2.0 + (max_width - 2.0) * amplitude(app)
        };
        let row: String = glyphs.breath.repeat((breadth as usize).max(1));
        lines.push(Line::from(Span::styled(
            row,
            Style::default().fg(palette.primary),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press Space and we'll breathe together.",
            Style::default().fg(palette.text_secondary),
        )));
    }
    lines.push(Line::from(""));

    let seconds = timer.seconds();
    if seconds > 0 || timer.is_running() {
        let minutes = seconds / 60;
        let rest = seconds % 60;
        let elapsed = if minutes > 0 {
            format!("{minutes} min {rest} s")
        } else {
            format!("{rest} s")
        };
        lines.push(Line::from(Span::styled(
            elapsed,
            Style::default().fg(palette.text_secondary),
        )));
    }

    if !timer.is_running() && timer.can_save() {
        lines.push(Line::from(""));
        if app.breathe().is_saving() {
            let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
            lines.push(Line::from(Span::styled(
                format!("{spinner} Saving your session..."),
                Style::default().fg(palette.text_muted),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Paused. Press s to save this session, or Space to keep going.",
                Style::default().fg(palette.text_muted),
            )));
        }
    }

    let widget = Paragraph::new(lines).centered();
    frame.render_widget(widget, inner);
}

fn draw_sessions(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = panel("Past sessions", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sessions = app.breathe().sessions();
    if sessions.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No sessions saved yet.",
                Style::default().fg(palette.text_muted),
            ))),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    for session in sessions.iter().rev().take(inner.height as usize) {
        let minutes = session.seconds / 60;
        let rest = session.seconds % 60;
        let length = if minutes > 0 {
            format!("{minutes}m {rest}s")
        } else {
            format!("{rest}s")
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{length:>7}  "), Style::default().fg(palette.calm)),
            Span::styled(
                friendly_date(session.started_at),
                Style::default().fg(palette.text_muted),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
