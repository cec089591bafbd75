//! Shared rendering helpers used across Recall screens.

use chrono::{DateTime, Datelike, Local, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use recall_engine::Draft;

use crate::theme::{Palette, styles};

/// A bordered panel with the house border style.
pub(crate) fn panel<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::panel_border(palette))
        .padding(Padding::horizontal(1))
        .title(Span::styled(format!(" {title} "), styles::title(palette)))
}

/// Alternating key/label hint spans for the hint bar.
pub(crate) fn hint_line<'a>(hints: &[(&'a str, &'a str)], palette: &Palette) -> Line<'a> {
    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (key, label) in hints {
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(
            format!(" {label}  "),
            styles::key_hint(palette),
        ));
    }
    Line::from(spans)
}

/// Draw a single-line draft inside `area` (one row high), scrolling
/// horizontally so the cursor stays visible, and place the terminal
/// cursor on it when `focused`.
pub(crate) fn draw_draft(
    frame: &mut Frame,
    area: Rect,
    draft: &Draft,
    prefix: &str,
    palette: &Palette,
    focused: bool,
) {
    let content_width = (area.width as usize).saturating_sub(prefix.width() + 1);
    let text = draft.text();
    let before_cursor = &text[..draft.byte_index()];
    let cursor_display_pos = before_cursor.width();

    // Slice off whole graphemes from the left until the cursor fits.
    let (visible, scrolled) = if content_width > 0 && cursor_display_pos >= content_width {
        let scroll_target = cursor_display_pos - content_width + 1;
        let mut byte_offset = text.len();
        let mut skipped_width = 0;
        for (idx, grapheme) in text.grapheme_indices(true) {
            if skipped_width >= scroll_target {
                byte_offset = idx;
                break;
            }
            skipped_width += grapheme.width();
        }
        (&text[byte_offset..], skipped_width)
    } else {
        (text, 0)
    };

    let line = Line::from(vec![
        Span::styled(prefix.to_string(), Style::default().fg(palette.primary)),
        Span::styled(
            visible.to_string(),
            Style::default().fg(palette.text_primary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if focused {
        let x = area
            .x
            .saturating_add(prefix.width() as u16)
            .saturating_add(cursor_display_pos as u16)
            .saturating_sub(scrolled as u16);
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
}

/// A rect of at most `width` x `height`, centered in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Short human date for lists: "Today", "Yesterday", or "Mon 3 Aug".
pub(crate) fn friendly_date(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    let today = Local::now().date_naive();
    let date = local.date_naive();

    if date == today {
        format!("Today {}", local.format("%H:%M"))
    } else if today.pred_opt() == Some(date) {
        format!("Yesterday {}", local.format("%H:%M"))
    } else if date.year() == today.year() {
        local.format("%a %-d %b").to_string()
    } else {
        local.format("%-d %b %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::friendly_date;

    #[test]
    fn friendly_date_names_today_and_yesterday() {
        let now = Utc::now();
        assert!(friendly_date(now).starts_with("Today"));
        assert!(friendly_date(now - Duration::days(1)).starts_with("Yesterday"));
    }

    #[test]
    fn friendly_date_spells_out_older_dates() {
        let old = Utc::now() - Duration::days(400);
        let text = friendly_date(old);
        assert!(!text.starts_with("Today"));
        assert!(text.chars().any(|c| c.is_ascii_digit()));
    }
}
