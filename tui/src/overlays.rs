//! Modal overlays for the text-entry and confirmation modes.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use clawdeck_engine::{
    App, DEFAULT_MODEL_LABEL, DraftInput, InteractionMode, SpawnField, SpawnForm,
};

use crate::theme::{Glyphs, Palette, styles};

/// Centered rect of at most `width` x `height` inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2)).max(1);
    let height = height.min(area.height).max(1);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 3,
        width,
        height,
    }
}

fn modal_block<'a>(title: String, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.focus))
        .style(Style::default().bg(palette.panel))
        .title(Line::from(Span::styled(format!(" {title} "), styles::title(palette))))
}

/// Visible slice of a field and the cursor column within it, scrolled so the
/// cursor stays inside `width` columns.
fn field_view(field: &DraftInput, width: usize) -> (String, u16) {
    let graphemes: Vec<&str> = field.text().graphemes(true).collect();
    let cursor = field.cursor().min(graphemes.len());
    let before: usize = graphemes[..cursor].iter().map(|g| g.width()).sum();
    let width = width.max(1);

    let mut skip = 0;
    let mut skipped_width = 0;
    if before >= width {
        let target = before - width + 1;
        while skipped_width < target && skip < graphemes.len() {
            skipped_width += graphemes[skip].width();
            skip += 1;
        }
    }
    let mut visible = String::new();
    let mut used = 0;
    for g in &graphemes[skip..] {
        let w = g.width();
        if used + w > width {
            break;
        }
        visible.push_str(g);
        used += w;
    }
    (visible, (before - skipped_width) as u16)
}

pub(crate) fn draw(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    match app.mode() {
        InteractionMode::Normal => {}
        InteractionMode::Searching { field } => {
            draw_single_field(frame, "Search", "/ ", field, palette);
        }
        InteractionMode::Messaging { target, field } => {
            draw_single_field(frame, &format!("Message {}", target.name), "> ", field, palette);
        }
        InteractionMode::Spawning(form) => draw_spawn(frame, app, form, palette, glyphs),
        InteractionMode::Confirming { target } => draw_confirm(frame, target, palette),
    }
}

fn draw_single_field(
    frame: &mut Frame,
    title: &str,
    prefix: &str,
    field: &DraftInput,
    palette: &Palette,
) {
    let area = centered(frame.area(), 60, 3);
    frame.render_widget(Clear, area);
    let block = modal_block(title.to_string(), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let prefix_width = prefix.width() as u16;
    let (visible, cursor_x) = field_view(field, inner.width.saturating_sub(prefix_width) as usize);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(prefix.to_string(), Style::default().fg(palette.focus)),
            Span::styled(visible, Style::default().fg(palette.text)),
        ])),
        inner,
    );
    frame.set_cursor_position((inner.x + prefix_width + cursor_x, inner.y));
}

fn draw_spawn(frame: &mut Frame, app: &App, form: &SpawnForm, palette: &Palette, glyphs: &Glyphs) {
    let area = centered(frame.area(), 70, 9);
    frame.render_widget(Clear, area);
    let block = modal_block("Spawn session".to_string(), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_width: u16 = 9;
    let value_width = inner.width.saturating_sub(label_width) as usize;
    let options = app.model_options();
    let model = options
        .get(form.model_index)
        .map_or(DEFAULT_MODEL_LABEL, String::as_str);

    let mut lines = Vec::new();
    let mut cursor = None;
    for (row, field) in SpawnField::ALL.into_iter().enumerate() {
        let focused = form.focus == field;
        let label_style = if focused {
            styles::key_highlight(palette)
        } else {
            styles::key_hint(palette)
        };
        let value = match field {
            SpawnField::Prompt | SpawnField::Label => {
                let draft = if field == SpawnField::Prompt {
                    &form.prompt
                } else {
                    &form.label
                };
                let (visible, cursor_x) = field_view(draft, value_width);
                if focused {
                    cursor = Some((inner.x + label_width + cursor_x, inner.y + row as u16));
                }
                visible
            }
            SpawnField::Model => format!("{} {model} {}", glyphs.cycle_left, glyphs.cycle_right),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<8} ", field.label()), label_style),
            Span::styled(value, Style::default().fg(palette.text)),
        ]));
    }

    lines.push(Line::from(""));
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(palette.err).add_modifier(Modifier::BOLD),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(Span::styled(
        "Tab next field  Up/Down model  Enter spawn  Esc cancel",
        styles::key_hint(palette),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

fn draw_confirm(frame: &mut Frame, target: &str, palette: &Palette) {
    let area = centered(frame.area(), 50, 4);
    frame.render_widget(Clear, area);
    let block = modal_block("Confirm".to_string(), palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Kill {target}?"),
                Style::default().fg(palette.warn).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("y confirm  n/Esc cancel", styles::key_hint(palette))),
        ]),
        inner,
    );
}
