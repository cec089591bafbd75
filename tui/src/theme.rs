//! Color theme and glyphs for the Recall TUI.
//!
//! Warm, low-saturation palette by default with an optional high-contrast
//! override for low-vision users.

use ratatui::style::{Color, Modifier, Style};

use recall_types::ui::UiOptions;

mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG_DARK: Color = Color::Rgb(24, 23, 28);
    pub const BG_PANEL: Color = Color::Rgb(33, 32, 39);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(46, 44, 54);
    pub const BG_BORDER: Color = Color::Rgb(88, 84, 102);

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(228, 222, 205);
    pub const TEXT_SECONDARY: Color = Color::Rgb(196, 189, 166);
    pub const TEXT_MUTED: Color = Color::Rgb(124, 120, 115);

    // === Accents ===
    pub const PRIMARY: Color = Color::Rgb(168, 145, 196); // soft violet
    pub const CALM: Color = Color::Rgb(129, 178, 202); // sky blue
    pub const GREEN: Color = Color::Rgb(153, 188, 133);
    pub const YELLOW: Color = Color::Rgb(228, 196, 138);
    pub const RED: Color = Color::Rgb(235, 108, 111);
    pub const PEACH: Color = Color::Rgb(245, 169, 127);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub calm: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub peach: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            calm: colors::CALM,
            success: colors::GREEN,
            warning: colors::YELLOW,
            error: colors::RED,
            peach: colors::PEACH,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            bg_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,
            primary: Color::White,
            calm: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            peach: Color::Yellow,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for icons and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub selected: &'static str,
    pub bullet: &'static str,
    pub backend_up: &'static str,
    pub backend_down: &'static str,
    pub backend_unknown: &'static str,
    pub user: &'static str,
    pub companion: &'static str,
    pub card_back: &'static str,
    pub check: &'static str,
    pub cross: &'static str,
    pub pin_current: &'static str,
    pub pin_saved: &'static str,
    pub pin_home: &'static str,
    pub bell: &'static str,
    pub breath: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            selected: ">",
            bullet: "*",
            backend_up: "*",
            backend_down: "x",
            backend_unknown: "o",
            user: "you",
            companion: "<>",
            card_back: "#",
            check: "OK",
            cross: "X",
            pin_current: "@",
            pin_saved: "s",
            pin_home: "H",
            bell: "!",
            breath: "o",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            selected: "▸",
            bullet: "•",
            backend_up: "●",
            backend_down: "●",
            backend_unknown: "○",
            user: "○",
            companion: "◇",
            card_back: "▒",
            check: "✓",
            cross: "✗",
            pin_current: "◉",
            pin_saved: "◆",
            pin_home: "⌂",
            bell: "⏰",
            breath: "●",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn menu_selected(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .bg(palette.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn user_name(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.success)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn companion_name(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.peach)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn panel_border(palette: &Palette) -> Style {
        Style::default().fg(palette.bg_border)
    }

    #[must_use]
    pub fn sos(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD)
    }
}
