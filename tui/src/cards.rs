//! Memory cards screen: a swipeable deck, one card at a time.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

use recall_engine::App;
use recall_types::{DeckCard, SWIPE_THRESHOLD_RATIO};

use crate::shared::{centered, panel};
use crate::theme::{Palette, spinner_frame};

const CARD_HEIGHT: u16 = 9;

pub(crate) fn draw(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let block = panel("Memory Cards", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Two thirds of the panel, like a card held in front of the deck.
    let card_width = (inner.width * 2 / 3).max(24).min(inner.width);
    app.set_card_width(f32::from(card_width));

    if app.cards().is_loading() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{spinner} Making cards from your journal..."),
                Style::default().fg(palette.text_muted),
            ))),
            inner,
        );
        return;
    }

    let deck = app.cards().deck();
    if deck.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press g and I'll turn your journal into memory cards.",
                Style::default().fg(palette.text_secondary),
            ))),
            inner,
        );
        return;
    }

    match deck.current() {
        DeckCard::Exhausted => {
            let lines = vec![
                Line::from(Span::styled(
                    "That's every card.",
                    Style::default()
                        .fg(palette.success)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Press p to look back, or g for a fresh set.",
                    Style::default().fg(palette.text_muted),
                )),
            ];
            let spot = centered(inner, 44, 2);
            frame.render_widget(Paragraph::new(lines), spot);
        }
        DeckCard::HasCard(card) => {
            let offset = deck.offset();
            let tilt = deck.rotation_degrees(f32::from(card_width));

            let base = centered(inner, card_width, CARD_HEIGHT);
            // Slide the card with the drag; one cell per character of
            // offset keeps the gesture legible at terminal resolution.
            let shift = offset.dx.round() as i32;
            let shifted_x =
                (i32::from(base.x) + shift).clamp(i32::from(inner.x), i32::from(inner.right())) as u16;
            let card_area = Rect {
                x: shifted_x,
                width: card_width.min(inner.right().saturating_sub(shifted_x)),
                ..base
            };
            if card_area.width < 4 {
                return;
            }

            let counter = Rect {
                x: inner.x,
                y: base.y.saturating_sub(2),
                width: inner.width,
                height: 1,
            };
            let mut counter_spans = vec![Span::styled(
                format!("Card {} of {}", deck.index() + 1, deck.len()),
                Style::default().fg(palette.calm),
            )];
            if tilt.abs() >= 0.5 {
                let unit = if app.ui_options().ascii_only {
                    " deg"
                } else {
                    "°"
                };
                counter_spans.push(Span::styled(
                    format!("  tilt {tilt:+.0}{unit}"),
                    Style::default().fg(palette.text_muted),
                ));
            }
            let threshold = SWIPE_THRESHOLD_RATIO * f32::from(card_width);
            if offset.dx.abs() > threshold {
                counter_spans.push(Span::styled(
                    "  let go to move on",
                    Style::default()
                        .fg(palette.peach)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(counter_spans)), counter);

            let mut lines = Vec::new();
            if let Some(title) = card.title() {
                lines.push(Line::from(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(palette.primary)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                card.summary().to_string(),
                Style::default().fg(palette.text_primary),
            )));
            if card.media_url().is_some() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "(this memory has a photo on your phone)",
                    Style::default().fg(palette.text_muted),
                )));
            }

            let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.bg_border))
                    .padding(Padding::new(2, 2, 1, 1))
                    .style(Style::default().bg(palette.bg_panel)),
            );
            frame.render_widget(widget, card_area);
        }
    }
}
