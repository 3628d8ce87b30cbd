//! Tabs, list panel, log panel and status bar.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Tabs,
    },
};

use clawdeck_engine::present::{
    SessionStatus, display_name, fit, format_duration, format_size, format_tokens, model_alias,
    session_status,
};
use clawdeck_engine::{App, ArchivedRun, Panel, Process, Session, Tab};

use crate::LOG_SCROLLBAR_GUTTER;
use crate::theme::{Glyphs, Palette, spinner_frame, styles};

pub(crate) fn draw_tabs(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let count = match tab {
                Tab::Sessions => app.sessions().len(),
                Tab::Processes => app.processes().len(),
                Tab::History => app.archived().len(),
            };
            Line::from(vec![
                Span::styled(format!("{} ", tab.index() + 1), styles::key_highlight(palette)),
                Span::raw(format!("{} ({count})", tab.title())),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab().index())
        .style(Style::default().fg(palette.muted))
        .highlight_style(
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, area);
}

fn panel_block<'a>(title: Line<'a>, focused: bool, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, focused))
        .style(Style::default().bg(palette.panel))
        .title(title)
}

pub(crate) fn draw_list(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut title = vec![Span::styled(format!(" {} ", app.tab().title()), styles::title(palette))];
    if !app.filter().is_empty() {
        title.push(Span::styled(
            format!("/{} ", app.filter()),
            styles::query(palette),
        ));
    }
    let block = panel_block(Line::from(title), app.panel() == Panel::List, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2) as usize;
    let now_ms = chrono::Utc::now().timestamp_millis();
    let items: Vec<ListItem> = match app.tab() {
        Tab::Sessions => app
            .visible_sessions()
            .into_iter()
            .map(|s| session_row(s, now_ms, width, palette, glyphs))
            .collect(),
        Tab::Processes => app
            .visible_processes()
            .into_iter()
            .map(|p| process_row(p, width, palette))
            .collect(),
        Tab::History => app
            .visible_archived()
            .into_iter()
            .map(|r| archived_row(r, now_ms, width, palette))
            .collect(),
    };

    if items.is_empty() {
        let hint = if app.filter().is_empty() {
            "Nothing here yet"
        } else {
            "No matches"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, styles::key_hint(palette))),
            inner,
        );
        return;
    }

    let list = List::new(items)
        .highlight_style(styles::selected_row(palette))
        .highlight_symbol(format!("{} ", glyphs.selected));
    let mut state = ListState::default().with_selected(Some(app.cursor()));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn session_row(
    session: &Session,
    now_ms: i64,
    width: usize,
    palette: &Palette,
    glyphs: &Glyphs,
) -> ListItem<'static> {
    let status = session_status(session, now_ms);
    let (glyph, color) = match status {
        SessionStatus::Running => (glyphs.running, palette.ok),
        SessionStatus::Idle => (glyphs.idle, palette.muted),
        SessionStatus::Completed => (glyphs.completed, palette.done),
        SessionStatus::Failed => (glyphs.failed, palette.err),
    };

    let mut meta = Vec::new();
    if !session.model.is_empty() {
        meta.push(model_alias(&session.model));
    }
    if session.total_tokens > 0 {
        meta.push(format_tokens(session.total_tokens));
    }
    if let Some(age) = age(session.age_ms, session.updated_at, now_ms) {
        meta.push(age);
    }
    let meta = meta.join(" ");
    let name_width = width.saturating_sub(meta.chars().count() + 3);

    ListItem::new(Line::from(vec![
        Span::styled(format!("{glyph} "), Style::default().fg(color)),
        Span::styled(
            format!("{:<name_width$}", fit(&display_name(session), name_width)),
            Style::default().fg(palette.text),
        ),
        Span::styled(format!(" {meta}"), Style::default().fg(palette.muted)),
    ]))
}

fn process_row(process: &Process, width: usize, palette: &Palette) -> ListItem<'static> {
    let color = if process.status == "running" {
        palette.ok
    } else {
        palette.muted
    };
    let meta = format!("{} {}", process.status, process.runtime);
    let name_width = width.saturating_sub(meta.chars().count() + 1);
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{:<name_width$}", fit(&process.name, name_width)),
            Style::default().fg(palette.text),
        ),
        Span::styled(format!(" {meta}"), Style::default().fg(color)),
    ])];
    if !process.command.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", fit(&process.command, width.saturating_sub(2))),
            Style::default().fg(palette.muted),
        )));
    }
    ListItem::new(lines)
}

fn archived_row(run: &ArchivedRun, now_ms: i64, width: usize, palette: &Palette) -> ListItem<'static> {
    let mut meta = format_size(run.size);
    if let Some(age) = age(0, run.modified_at, now_ms) {
        meta.push(' ');
        meta.push_str(&age);
    }
    let label_width = width.saturating_sub(meta.chars().count() + 1);
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<label_width$}", fit(&run.label, label_width)),
            Style::default().fg(palette.text_dim),
        ),
        Span::styled(format!(" {meta}"), Style::default().fg(palette.muted)),
    ]))
}

fn age(age_ms: i64, updated_at: i64, now_ms: i64) -> Option<String> {
    let ms = if age_ms > 0 {
        age_ms
    } else if updated_at > 0 {
        now_ms.saturating_sub(updated_at).max(0)
    } else {
        return None;
    };
    Some(format_duration(Duration::from_millis(ms as u64)))
}

pub(crate) fn draw_log(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let block = panel_block(
        Line::from(Span::styled(" Log ", styles::title(palette))),
        app.panel() == Panel::Log,
        palette,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 4 || inner.width == 0 {
        return;
    }

    let log = app.log();
    let title = app
        .log_source()
        .map_or("No source selected", |source| source.title());
    let position = if log.total_lines() == 0 {
        String::new()
    } else {
        let last = (log.scroll_offset() + log.visible_height()).min(log.total_lines());
        format!("{last}/{}", log.total_lines())
    };
    let follow = if log.follow() { "follow" } else { "paused" };
    let right = format!("{} {} {} {position}", app.verbosity().label(), glyphs.separator, follow);
    let title_width = (inner.width as usize).saturating_sub(right.chars().count() + 1);

    let header = Line::from(vec![
        Span::styled(
            format!("{:<title_width$} ", fit(title, title_width)),
            styles::title(palette),
        ),
        Span::styled(right, styles::key_hint(palette)),
    ]);
    let mut chrome = vec![
        header,
        Line::from(Span::styled(
            glyphs.rule.repeat(inner.width as usize),
            Style::default().fg(palette.border),
        )),
    ];
    if let Some(query) = log.query() {
        chrome.push(Line::from(Span::styled(
            format!("> {}", fit(query, (inner.width as usize).saturating_sub(2))),
            styles::query(palette),
        )));
    }
    let chrome_height = (chrome.len() as u16).min(inner.height);
    frame.render_widget(
        Paragraph::new(chrome),
        Rect {
            height: chrome_height,
            ..inner
        },
    );

    let body = Rect {
        y: inner.y + chrome_height,
        height: inner.height - chrome_height,
        ..inner
    };
    if app.log_source().is_none() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Select an item and press Enter",
                styles::key_hint(palette),
            )),
            body,
        );
        return;
    }

    let gutter = LOG_SCROLLBAR_GUTTER.min(body.width);
    let text_area = Rect {
        width: body.width - gutter,
        ..body
    };
    let scrollbar_area = Rect {
        x: text_area.x + text_area.width,
        width: gutter,
        ..body
    };

    let lines: Vec<Line> = log
        .visible_lines()
        .iter()
        .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(palette.text_dim))))
        .collect();
    frame.render_widget(Paragraph::new(lines), text_area);

    if log.max_scroll() > 0 && gutter > 0 {
        let mut state = ScrollbarState::new(log.max_scroll()).position(log.scroll_offset());
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .track_symbol(Some(glyphs.track))
            .thumb_symbol(glyphs.thumb)
            .style(Style::default().fg(palette.border));
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut state);
    }
}

pub(crate) fn draw_status_bar(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let status = app.status_line();
    let mut spans = vec![Span::raw(" ")];

    match status.health {
        Some(health) if health.ok => spans.push(Span::styled(
            format!("{} {}ms", glyphs.health_ok, health.duration_ms),
            Style::default().fg(palette.ok),
        )),
        Some(_) => spans.push(Span::styled(
            format!("{} unhealthy", glyphs.health_down),
            Style::default().fg(palette.err),
        )),
        None => spans.push(Span::styled(
            format!("{} offline", glyphs.health_down),
            Style::default().fg(palette.err),
        )),
    }

    let sep = format!(" {} ", glyphs.separator);
    spans.push(Span::styled(
        format!(
            "{sep}S:{} P:{} H:{}{sep}{}{sep}src:{}",
            status.sessions,
            status.processes,
            status.archived,
            status.verbosity.label(),
            status.source_filter.label()
        ),
        styles::key_hint(palette),
    ));

    if status.sending || status.spinning {
        let what = if status.sending { "sending" } else { "spawning" };
        spans.push(Span::styled(
            format!("{sep}{} {what}...", spinner_frame(app.tick_count(), app.ui_options())),
            Style::default().fg(palette.focus),
        ));
    }

    if let Some(target) = status.confirm {
        spans.push(Span::styled(
            format!("{sep}Kill {target}? (y/n)"),
            Style::default().fg(palette.warn).add_modifier(Modifier::BOLD),
        ));
    } else if let Some(error) = status.error {
        spans.push(Span::styled(
            format!("{sep}Error: {error}"),
            Style::default().fg(palette.err),
        ));
    } else if let Some(notice) = status.notice {
        spans.push(Span::styled(
            format!("{sep}{notice}"),
            Style::default().fg(palette.ok),
        ));
    } else {
        spans.push(Span::styled(
            format!("{sep}/ search  m msg  s spawn  x kill  v verbosity  f follow  q quit"),
            styles::key_hint(palette),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
