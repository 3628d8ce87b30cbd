//! TUI rendering for clawdeck using ratatui.
//!
//! Everything here reads [`App`] through `&App`; the only state the renderer
//! feeds back is the log panel size, via [`log_viewport`] before each frame.

mod input;
mod overlays;
mod panels;
mod theme;

pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
};

use clawdeck_engine::{App, Viewport};

/// Width share of the list panel, in percent.
const LIST_PANEL_PERCENT: u16 = 35;

struct Areas {
    tabs: Rect,
    list: Rect,
    log: Rect,
    status: Rect,
}

fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Min(3),    // Panels
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(LIST_PANEL_PERCENT),
            Constraint::Percentage(100 - LIST_PANEL_PERCENT),
        ])
        .split(rows[1]);
    Areas {
        tabs: rows[0],
        list: columns[0],
        log: columns[1],
        status: rows[2],
    }
}

/// Columns right of the log text reserved for its scrollbar.
pub(crate) const LOG_SCROLLBAR_GUTTER: u16 = 1;

/// Text area of the log panel for a terminal of `area`, chrome rows
/// included and scrollbar gutter excluded. Feed it to
/// `App::set_log_viewport` before drawing.
#[must_use]
pub fn log_viewport(area: Rect) -> Viewport {
    let log = layout(area).log;
    Viewport {
        width: log.width.saturating_sub(2 + LOG_SCROLLBAR_GUTTER),
        height: log.height.saturating_sub(2),
    }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let bg_block = Block::default().style(Style::default().bg(palette.background));
    frame.render_widget(bg_block, frame.area());

    let areas = layout(frame.area());
    panels::draw_tabs(frame, app, areas.tabs, &palette);
    panels::draw_list(frame, app, areas.list, &palette, &glyphs);
    panels::draw_log(frame, app, areas.log, &palette, &glyphs);
    panels::draw_status_bar(frame, app, areas.status, &palette, &glyphs);
    overlays::draw(frame, app, &palette, &glyphs);
}
