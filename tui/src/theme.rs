//! Palette, glyph set and shared styles, resolved once per frame from
//! [`UiOptions`].

use ratatui::style::{Color, Modifier, Style};

use clawdeck_engine::UiOptions;

/// Colors by role. Every draw function takes one of these; nothing reads a
/// global.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub panel: Color,
    pub highlight: Color,
    pub border: Color,
    pub focus: Color,
    pub text: Color,
    pub text_dim: Color,
    pub muted: Color,
    pub query: Color,
    pub key: Color,
    pub ok: Color,
    pub warn: Color,
    pub err: Color,
    pub done: Color,
}

impl Palette {
    /// Kanagawa Wave.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            background: Color::Rgb(22, 22, 29), // sumiInk0
            panel: Color::Rgb(31, 31, 40),      // sumiInk3
            highlight: Color::Rgb(42, 42, 55),  // sumiInk4
            border: Color::Rgb(84, 84, 109),    // sumiInk6
            focus: Color::Rgb(149, 127, 184),   // oniViolet
            text: Color::Rgb(220, 215, 186),    // fujiWhite
            text_dim: Color::Rgb(200, 192, 147), // oldWhite
            muted: Color::Rgb(114, 113, 105),   // fujiGray
            query: Color::Rgb(127, 180, 202),   // springBlue
            key: Color::Rgb(255, 160, 102),     // surimiOrange
            ok: Color::Rgb(152, 187, 108),      // springGreen
            warn: Color::Rgb(230, 195, 132),    // carpYellow
            err: Color::Rgb(255, 93, 98),       // peachRed
            done: Color::Rgb(126, 156, 216),    // crystalBlue
        }
    }

    /// Named ANSI colors only, for terminals and eyes that need them.
    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            background: Color::Black,
            panel: Color::Black,
            highlight: Color::DarkGray,
            border: Color::Gray,
            focus: Color::White,
            text: Color::White,
            text_dim: Color::Gray,
            muted: Color::DarkGray,
            query: Color::Cyan,
            key: Color::Yellow,
            ok: Color::Green,
            warn: Color::Yellow,
            err: Color::Red,
            done: Color::Blue,
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

/// Status icons, rules and spinner frames; `ascii_only` swaps in a set that
/// renders anywhere.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub running: &'static str,
    pub idle: &'static str,
    pub completed: &'static str,
    pub failed: &'static str,
    pub health_ok: &'static str,
    pub health_down: &'static str,
    pub selected: &'static str,
    pub separator: &'static str,
    pub rule: &'static str,
    pub track: &'static str,
    pub thumb: &'static str,
    pub cycle_left: &'static str,
    pub cycle_right: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            running: ">",
            idle: "o",
            completed: "+",
            failed: "x",
            health_ok: "*",
            health_down: "!",
            selected: ">",
            separator: "|",
            rule: "-",
            track: "|",
            thumb: "#",
            cycle_left: "<",
            cycle_right: ">",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            running: "▶",
            idle: "○",
            completed: "✓",
            failed: "✗",
            health_ok: "●",
            health_down: "●",
            selected: "▸",
            separator: "│",
            rule: "─",
            track: "│",
            thumb: "█",
            cycle_left: "◂",
            cycle_right: "▸",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// Spinner frame for the given frame tick.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    frames[tick % frames.len()]
}

pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn border(palette: &Palette, focused: bool) -> Style {
        Style::default().fg(if focused { palette.focus } else { palette.border })
    }

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default().fg(palette.text).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected_row(palette: &Palette) -> Style {
        title(palette).bg(palette.highlight)
    }

    #[must_use]
    pub fn query(palette: &Palette) -> Style {
        Style::default().fg(palette.query).add_modifier(Modifier::ITALIC)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default().fg(palette.key).add_modifier(Modifier::BOLD)
    }
}
