//! Matching pairs screen: a 4x4 grid of face-down cells.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use recall_engine::{App, PUZZLE_COLUMNS};

use crate::shared::{centered, panel};
use crate::theme::{Glyphs, Palette};

const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;

pub(crate) fn draw(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel("Matching Pairs", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let board = app.puzzle().board();
    let cells = board.cells();
    let rows = cells.len().div_ceil(PUZZLE_COLUMNS) as u16;

    let grid_width = CELL_WIDTH * PUZZLE_COLUMNS as u16;
    let grid_height = CELL_HEIGHT * rows + 2;
    let grid = centered(inner, grid_width, grid_height);

    let header = Rect {
        height: 1,
        ..grid
    };
    let moves = board.moves();
    let headline = if board.is_solved() {
        Span::styled(
            format!("Solved in {moves} moves! Press n for a new board."),
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("Moves: {moves}"),
            Style::default().fg(palette.text_secondary),
        )
    };
    let mut header_spans = vec![headline];
    if let Some(progress) = board.resolve_progress() {
        let options = app.ui_options();
        let (filled_char, empty_char) = if options.ascii_only {
            ('#', '-')
        } else {
            ('▰', '▱')
        };
        let filled = if options.reduced_motion {
            4
        } else {
            (progress * 4.0) as usize
        };
        let bar: String = (0..4)
            .map(|i| if i < filled { filled_char } else { empty_char })
            .collect();
        header_spans.push(Span::styled(
            format!("  {bar}"),
            Style::default().fg(palette.warning),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header_spans)), header);

    for (index, cell) in cells.iter().enumerate() {
        let col = (index % PUZZLE_COLUMNS) as u16;
        let row = (index / PUZZLE_COLUMNS) as u16;
        let cell_area = Rect {
            x: grid.x + col * CELL_WIDTH,
            y: grid.y + 2 + row * CELL_HEIGHT,
            width: CELL_WIDTH.min(inner.right().saturating_sub(grid.x + col * CELL_WIDTH)),
            height: CELL_HEIGHT.min(inner.bottom().saturating_sub(grid.y + 2 + row * CELL_HEIGHT)),
        };
        if cell_area.width < 3 || cell_area.height < 3 {
            continue;
        }

        let under_cursor = index == app.puzzle().cursor();
        let border_style = if under_cursor {
            Style::default()
                .fg(palette.peach)
                .add_modifier(Modifier::BOLD)
        } else if cell.is_matched() {
            Style::default().fg(palette.success)
        } else {
            Style::default().fg(palette.bg_border)
        };

        let face = if cell.is_face_up() {
            cell.symbol().to_string()
        } else {
            glyphs.card_back.to_string()
        };
        let face_style = if cell.is_matched() {
            Style::default().fg(palette.success)
        } else if cell.is_shown() {
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_muted)
        };

        let widget = Paragraph::new(Line::from(Span::styled(face, face_style)))
            .centered()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border_style),
            );
        frame.render_widget(widget, cell_area);
    }
}
