//! Companion chat screen.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use recall_engine::App;
use recall_types::ChatRole;

use crate::shared::{draw_draft, panel};
use crate::theme::{Glyphs, Palette, spinner_frame, styles};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    draw_transcript(frame, app, rows[0], palette, glyphs);
    draw_composer(frame, app, rows[1], palette);
}

fn draw_transcript(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let title = app.chat().title().unwrap_or("Companion");
    let block = panel(title, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Assume up to three rows per message once wrapped and keep the
    // most recent ones; the newest message is always visible.
    let fit = (inner.height as usize / 3).max(1);
    let messages = app.chat().messages();
    let start = messages.len().saturating_sub(fit);

    let mut lines = Vec::new();
    for message in &messages[start..] {
        let (icon, name, name_style) = match message.role {
            ChatRole::User => (
                glyphs.user,
                app.profile().user_name.as_str(),
                styles::user_name(palette),
            ),
            ChatRole::Assistant => (glyphs.companion, "Companion", styles::companion_name(palette)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{icon} "), name_style),
            Span::styled(name.to_string(), name_style),
        ]));
        lines.push(Line::from(Span::styled(
            message.text.clone(),
            Style::default().fg(palette.text_primary),
        )));
        lines.push(Line::from(""));
    }

    if app.chat().is_waiting() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        lines.push(Line::from(Span::styled(
            format!("{spinner} thinking of a reply..."),
            Style::default().fg(palette.text_muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_composer(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = panel("Say something", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    draw_draft(
        frame,
        inner,
        app.chat().draft(),
        "> ",
        palette,
        !app.chat().is_waiting(),
    );
}
