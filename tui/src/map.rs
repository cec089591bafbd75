//! Places screen: a framed viewport around the known locations.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use recall_engine::App;
use recall_types::{GeoPoint, GeoRole, MapRegion};

use crate::shared::{draw_draft, panel};
use crate::theme::{Glyphs, Palette, spinner_frame};

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    draw_viewport(frame, app, columns[0], palette, glyphs);
    draw_legend(frame, app, columns[1], palette, glyphs);
}

/// Project a point into the viewport. Latitude grows upward, rows grow
/// downward, so the vertical axis flips.
fn project(region: &MapRegion, point: GeoPoint, area: Rect) -> Option<(u16, u16)> {
    let half_lat = region.latitude_delta / 2.0;
    let half_lon = region.longitude_delta / 2.0;
    let rel_x = (point.longitude - (region.center.longitude - half_lon)) / region.longitude_delta;
    let rel_y = ((region.center.latitude + half_lat) - point.latitude) / region.latitude_delta;
    if !(0.0..=1.0).contains(&rel_x) || !(0.0..=1.0).contains(&rel_y) {
        return None;
    }
    let x = area.x + (rel_x * f64::from(area.width.saturating_sub(1))).round() as u16;
    let y = area.y + (rel_y * f64::from(area.height.saturating_sub(1))).round() as u16;
    Some((x.min(area.right().saturating_sub(1)), y.min(area.bottom().saturating_sub(1))))
}

fn draw_viewport(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Places", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.map().is_loading() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{spinner} Finding your places..."),
                Style::default().fg(palette.text_muted),
            ))),
            inner,
        );
        return;
    }

    let points = *app.map().points();
    let region = app.map().region();

    if points.effective().is_empty() {
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No places saved yet.",
                    Style::default().fg(palette.text_secondary),
                )),
                Line::from(Span::styled(
                    "Press c, s or h to type in a location.",
                    Style::default().fg(palette.text_muted),
                )),
            ]),
            inner,
        );
        return;
    }

    if inner.width < 4 || inner.height < 3 {
        return;
    }

    // Pins draw over a plain field; later roles win overlapping cells,
    // so home shows on top when everything coincides.
    let pins = [
        (points.current, glyphs.pin_current, palette.calm),
        (points.saved, glyphs.pin_saved, palette.primary),
        (points.home, glyphs.pin_home, palette.success),
    ];
    for (point, glyph, color) in pins {
        let Some(point) = point else { continue };
        let Some((x, y)) = project(&region, point, inner) else {
            continue;
        };
        let pin_area = Rect {
            x,
            y,
            width: 1,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                glyph,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            pin_area,
        );
    }

    let footer = Rect {
        y: inner.bottom().saturating_sub(1),
        height: 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(
                "centered on {:.2}, {:.2}",
                region.center.latitude, region.center.longitude
            ),
            Style::default().fg(palette.text_muted),
        ))),
        footer,
    );
}

fn role_line<'a>(
    label: &'a str,
    glyph: &'a str,
    color: Color,
    point: Option<GeoPoint>,
    palette: &Palette,
) -> Line<'a> {
    let value = match point {
        Some(p) => format!("{:.4}, {:.4}", p.latitude, p.longitude),
        None => "not set".to_string(),
    };
    Line::from(vec![
        Span::styled(format!(" {glyph} "), Style::default().fg(color)),
        Span::styled(format!("{label:<8}"), Style::default().fg(palette.text_primary)),
        Span::styled(value, Style::default().fg(palette.text_muted)),
    ])
}

fn draw_legend(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Saved places", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    let points = app.map().points();
    let mut lines = vec![
        role_line("current", glyphs.pin_current, palette.calm, points.current, palette),
        role_line("saved", glyphs.pin_saved, palette.primary, points.saved, palette),
        role_line("home", glyphs.pin_home, palette.success, points.home, palette),
        Line::from(""),
    ];

    if let Some(role) = app.map().saving() {
        let spinner = spinner_frame(app.ticks() as usize, app.ui_options());
        lines.push(Line::from(Span::styled(
            format!("{spinner} Saving the {} spot...", role.as_str()),
            Style::default().fg(palette.text_muted),
        )));
    } else if app.map().editing().is_none() {
        lines.push(Line::from(Span::styled(
            "c, s or h to set a place.",
            Style::default().fg(palette.text_muted),
        )));
    }
    frame.render_widget(Paragraph::new(lines), rows[0]);

    if let Some(role) = app.map().editing() {
        let prefix = match role {
            GeoRole::Current => "current: ",
            GeoRole::Saved => "saved: ",
            GeoRole::Home => "home: ",
        };
        draw_draft(frame, rows[1], app.map().draft(), prefix, palette, true);
    }
}
