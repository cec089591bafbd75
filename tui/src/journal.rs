//! Journal screen: the memory list and the entry composer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use recall_engine::App;

use crate::shared::{draw_draft, friendly_date, panel};
use crate::theme::{Palette, spinner_frame};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    draw_entries(frame, app, rows[0], palette);
    draw_composer(frame, app, rows[1], palette);
}

fn draw_entries(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = panel("Your memories", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.journal().is_loading() && app.journal().entries().is_empty() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{spinner} Fetching your memories..."),
                Style::default().fg(palette.text_muted),
            ))),
            inner,
        );
        return;
    }

    if app.journal().entries().is_empty() {
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No memories written down yet.",
                    Style::default().fg(palette.text_secondary),
                )),
                Line::from(Span::styled(
                    "Write a line about today below and press Enter.",
                    Style::default().fg(palette.text_muted),
                )),
            ]),
            inner,
        );
        return;
    }

    // Newest last; show as many of the most recent as fit, assuming up
    // to three rows per entry once wrapped.
    let fit = (inner.height as usize / 3).max(1);
    let entries = app.journal().entries();
    let start = entries.len().saturating_sub(fit);

    let mut lines = Vec::new();
    for entry in &entries[start..] {
        lines.push(Line::from(Span::styled(
            friendly_date(entry.created_at),
            Style::default().fg(palette.calm),
        )));
        lines.push(Line::from(Span::styled(
            entry.text.clone(),
            Style::default().fg(palette.text_primary),
        )));
        if let Some(caption) = &entry.caption {
            lines.push(Line::from(Span::styled(
                format!("  ({caption})"),
                Style::default().fg(palette.text_muted),
            )));
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_composer(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = if app.journal().is_saving() {
        "Saving..."
    } else {
        "What happened today?"
    };
    let block = panel(title, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    draw_draft(
        frame,
        inner,
        app.journal().draft(),
        "> ",
        palette,
        !app.journal().is_saving(),
    );
}
