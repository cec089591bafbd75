//! An in-memory terminal backend for rendering tests.
//!
//! Ratatui draws into a `vt100::Parser`, which interprets the ANSI
//! stream the way a real terminal would; assertions then run against
//! the parsed screen text.

use std::io;

use crossterm::{Command, cursor, style, terminal};
use ratatui::backend::{Backend, ClearType, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};
use ratatui::style::Color;

pub struct Vt100Backend {
    parser: vt100::Parser,
    size: Size,
}

impl Vt100Backend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            parser: vt100::Parser::new(height, width, 0),
            size: Size::new(width, height),
        }
    }

    /// The rendered screen as plain text, one line per row.
    pub fn contents(&self) -> String {
        self.parser.screen().contents()
    }
}

/// The theme styles cells with RGB colors only, so named terminal
/// colors never reach this backend.
fn ansi_color(color: Color) -> Option<crossterm::style::Color> {
    match color {
        Color::Rgb(r, g, b) => Some(crossterm::style::Color::Rgb { r, g, b }),
        Color::Indexed(i) => Some(crossterm::style::Color::AnsiValue(i)),
        _ => None,
    }
}

impl Backend for Vt100Backend {
    type Error = io::Error;

    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        use std::fmt::Write;

        let mut ansi = String::new();
        let mut cursor_at: Option<(u16, u16)> = None;
        let mut current_style: Option<ratatui::style::Style> = None;

        for (x, y, cell) in content {
            if cursor_at != Some((x, y)) {
                let _ = cursor::MoveTo(x, y).write_ansi(&mut ansi);
            }

            let cell_style = cell.style();
            if current_style != Some(cell_style) {
                let _ = style::SetAttribute(style::Attribute::Reset).write_ansi(&mut ansi);
                if let Some(fg) = cell_style.fg.and_then(ansi_color) {
                    let _ = style::SetForegroundColor(fg).write_ansi(&mut ansi);
                }
                if let Some(bg) = cell_style.bg.and_then(ansi_color) {
                    let _ = style::SetBackgroundColor(bg).write_ansi(&mut ansi);
                }
                current_style = Some(cell_style);
            }

            let _ = write!(ansi, "{}", cell.symbol());
            cursor_at = Some((x + 1, y));
        }

        self.parser.process(ansi.as_bytes());
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        let (row, col) = self.parser.screen().cursor_position();
        Ok(Position::new(col, row))
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        let position = position.into();
        let mut ansi = String::new();
        let _ = cursor::MoveTo(position.x, position.y).write_ansi(&mut ansi);
        self.parser.process(ansi.as_bytes());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut ansi = String::new();
        let _ = terminal::Clear(terminal::ClearType::All).write_ansi(&mut ansi);
        self.parser.process(ansi.as_bytes());
        Ok(())
    }

    fn clear_region(&mut self, _clear_type: ClearType) -> io::Result<()> {
        self.clear()
    }

    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        Ok(WindowSize {
            columns_rows: self.size,
            pixels: Size::new(self.size.width * 8, self.size.height * 16),
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
