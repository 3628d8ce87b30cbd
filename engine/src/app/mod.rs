//! The single owner of dashboard state.
//!
//! Every mutation happens on the control loop: key handlers call the
//! methods below, [`App::tick`] drains finished background calls and starts
//! whatever polls are due. Background tasks only ever talk back through the
//! event channel.

mod dispatch;
mod input_modes;
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use clawdeck_client::{Gateway, TranscriptRequest};
use clawdeck_config::Settings;
use clawdeck_core::present::display_name;
use clawdeck_core::{
    DisplayBuffer, Viewport, clamp_cursor, filter_archived, filter_processes, filter_sessions,
    render_transcript,
};
use clawdeck_types::ui::{
    InputMode, InteractionMode, MessageTarget, Panel, ScrollTo, SourceFilter, Tab, UiOptions,
};
use clawdeck_types::{ArchivedRun, CanonicalMessage, Health, ModelOption, Process, Session, Verbosity};

use crate::event::AppEvent;
use crate::poll::{PollKind, PollSchedule};
use crate::source::LogSource;

pub use input_modes::{
    ConfirmMode, ConfirmModeAccess, MessageMode, MessageModeAccess, SearchMode, SearchModeAccess,
    SpawnMode, SpawnModeAccess,
};

/// Cap on events applied per tick so a burst can't stall a frame.
const MAX_EVENTS_PER_TICK: usize = 64;

/// First entry of the spawn model selector: no `--model` flag.
pub const DEFAULT_MODEL_LABEL: &str = "(default)";

/// Everything the status bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub health: Option<Health>,
    pub sessions: usize,
    pub processes: usize,
    pub archived: usize,
    pub verbosity: Verbosity,
    pub follow: bool,
    pub source_filter: SourceFilter,
    pub sending: bool,
    pub spinning: bool,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
    /// Process awaiting kill confirmation.
    pub confirm: Option<&'a str>,
}

#[derive(Debug, Default)]
struct AppData {
    sessions: Vec<Session>,
    processes: Vec<Process>,
    archived: Vec<ArchivedRun>,
    health: Option<Health>,
    models: Vec<ModelOption>,
    /// Normalized transcript of the selected source, kept so verbosity
    /// changes re-render without a refetch.
    messages: Vec<CanonicalMessage>,
}

#[derive(Debug)]
struct AppView {
    tab: Tab,
    panel: Panel,
    cursors: [usize; 3],
    filter: String,
    source_filter: SourceFilter,
    verbosity: Verbosity,
    log_source: Option<LogSource>,
    log: DisplayBuffer,
    mode: InteractionMode,
    ui_options: UiOptions,
    should_quit: bool,
}

#[derive(Debug, Default)]
struct AppStatus {
    sending: bool,
    spinning: bool,
    last_error: Option<String>,
    notice: Option<String>,
}

struct AppRuntime {
    gateway: Arc<dyn Gateway>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    poll: PollSchedule,
    history_limit: usize,
    tick_count: usize,
}

pub struct App {
    data: AppData,
    view: AppView,
    status: AppStatus,
    runtime: AppRuntime,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, settings: &Settings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            data: AppData::default(),
            view: AppView {
                tab: Tab::Sessions,
                panel: Panel::List,
                cursors: [0; 3],
                filter: String::new(),
                source_filter: SourceFilter::All,
                verbosity: Verbosity::default(),
                log_source: None,
                log: DisplayBuffer::new(Viewport::default()),
                mode: InteractionMode::Normal,
                ui_options: settings.ui,
                should_quit: false,
            },
            status: AppStatus::default(),
            runtime: AppRuntime {
                gateway,
                events_tx,
                events_rx,
                poll: PollSchedule::new(settings.poll),
                history_limit: settings.history_limit,
                tick_count: 0,
            },
        }
    }

    pub fn should_quit(&self) -> bool {
        self.view.should_quit
    }

    pub fn request_quit(&mut self) {
        self.view.should_quit = true;
    }

    pub fn tick_count(&self) -> usize {
        self.runtime.tick_count
    }

    pub fn ui_options(&self) -> UiOptions {
        self.view.ui_options
    }

    pub fn tab(&self) -> Tab {
        self.view.tab
    }

    pub fn panel(&self) -> Panel {
        self.view.panel
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.view.mode
    }

    pub fn input_mode(&self) -> InputMode {
        self.view.mode.mode()
    }

    /// Active list filter. While searching this tracks the search field.
    pub fn filter(&self) -> &str {
        &self.view.filter
    }

    pub fn source_filter(&self) -> SourceFilter {
        self.view.source_filter
    }

    pub fn verbosity(&self) -> Verbosity {
        self.view.verbosity
    }

    pub fn sessions(&self) -> &[Session] {
        &self.data.sessions
    }

    pub fn processes(&self) -> &[Process] {
        &self.data.processes
    }

    pub fn archived(&self) -> &[ArchivedRun] {
        &self.data.archived
    }

    pub fn health(&self) -> Option<Health> {
        self.data.health
    }

    pub fn messages(&self) -> &[CanonicalMessage] {
        &self.data.messages
    }

    pub fn visible_sessions(&self) -> Vec<&Session> {
        filter_sessions(
            &self.data.sessions,
            &self.view.filter,
            self.view.source_filter,
        )
    }

    pub fn visible_processes(&self) -> Vec<&Process> {
        filter_processes(&self.data.processes, &self.view.filter)
    }

    pub fn visible_archived(&self) -> Vec<&ArchivedRun> {
        filter_archived(&self.data.archived, &self.view.filter)
    }

    pub fn visible_len(&self, tab: Tab) -> usize {
        match tab {
            Tab::Sessions => self.visible_sessions().len(),
            Tab::Processes => self.visible_processes().len(),
            Tab::History => self.visible_archived().len(),
        }
    }

    /// Cursor of the active tab.
    pub fn cursor(&self) -> usize {
        self.cursor_for(self.view.tab)
    }

    pub fn cursor_for(&self, tab: Tab) -> usize {
        self.view.cursors[tab.index()]
    }

    pub fn selected_session(&self) -> Option<&Session> {
        self.visible_sessions()
            .get(self.cursor_for(Tab::Sessions))
            .copied()
    }

    pub fn selected_process(&self) -> Option<&Process> {
        self.visible_processes()
            .get(self.cursor_for(Tab::Processes))
            .copied()
    }

    pub fn selected_archived(&self) -> Option<&ArchivedRun> {
        self.visible_archived()
            .get(self.cursor_for(Tab::History))
            .copied()
    }

    /// The root session spawns attach to.
    pub fn main_session(&self) -> Option<&Session> {
        self.data.sessions.iter().find(|s| s.is_main())
    }

    pub fn log(&self) -> &DisplayBuffer {
        &self.view.log
    }

    pub fn log_source(&self) -> Option<&LogSource> {
        self.view.log_source.as_ref()
    }

    /// Spawn selector entries; index 0 is the agent default.
    pub fn model_options(&self) -> Vec<String> {
        std::iter::once(DEFAULT_MODEL_LABEL.to_string())
            .chain(self.data.models.iter().map(ToString::to_string))
            .collect()
    }

    pub fn sending(&self) -> bool {
        self.status.sending
    }

    pub fn spinning(&self) -> bool {
        self.status.spinning
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.status.notice.as_deref()
    }

    pub fn status_line(&self) -> StatusLine<'_> {
        let confirm = match &self.view.mode {
            InteractionMode::Confirming { target } => Some(target.as_str()),
            _ => None,
        };
        StatusLine {
            health: self.data.health,
            sessions: self.data.sessions.len(),
            processes: self.data.processes.len(),
            archived: self.data.archived.len(),
            verbosity: self.view.verbosity,
            follow: self.view.log.follow(),
            source_filter: self.view.source_filter,
            sending: self.status.sending,
            spinning: self.status.spinning,
            error: self.status.last_error.as_deref(),
            notice: self.status.notice.as_deref(),
            confirm,
        }
    }

    // ------------------------------------------------------------------
    // Normal-mode operations
    // ------------------------------------------------------------------

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.tab = tab;
    }

    pub fn toggle_panel(&mut self) {
        self.view.panel = self.view.panel.toggle();
    }

    pub fn focus_panel(&mut self, panel: Panel) {
        self.view.panel = panel;
    }

    /// Escape in Normal mode: back from the log to the list.
    pub fn escape(&mut self) {
        if self.view.panel == Panel::Log {
            self.view.panel = Panel::List;
        }
    }

    /// Move the active tab's cursor, clamped to the filtered list.
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_len(self.view.tab);
        if len == 0 {
            return;
        }
        let slot = &mut self.view.cursors[self.view.tab.index()];
        let moved = slot.saturating_add_signed(delta);
        *slot = clamp_cursor(moved, len);
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.view.log.scroll_up(lines);
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.view.log.scroll_down(lines);
    }

    pub fn page_log_up(&mut self) {
        self.view.log.page_up();
    }

    pub fn page_log_down(&mut self) {
        self.view.log.page_down();
    }

    pub fn scroll_log_to(&mut self, target: ScrollTo) {
        self.view.log.scroll_to(target);
    }

    pub fn toggle_follow(&mut self) {
        self.view.log.toggle_follow();
    }

    /// Summary -> Full -> Off, re-rendering the cached transcript.
    pub fn cycle_verbosity(&mut self) {
        self.view.verbosity = self.view.verbosity.next();
        self.rerender_transcript();
    }

    /// All -> signal -> matrix; narrows the Sessions list by channel.
    pub fn cycle_source_filter(&mut self) {
        self.view.source_filter = self.view.source_filter.next();
        self.clamp_cursors();
    }

    /// Apply the log panel's inner size.
    pub fn set_log_viewport(&mut self, viewport: Viewport) {
        self.view.log.resize(viewport);
    }

    /// Make the item under the cursor the log source and load it now.
    pub fn select_current(&mut self) {
        let limit = self.runtime.history_limit;
        let source = match self.view.tab {
            Tab::Sessions => self.selected_session().map(|session| LogSource::Session {
                name: display_name(session),
                request: TranscriptRequest::for_session(session, limit),
            }),
            Tab::Processes => self.selected_process().map(|process| LogSource::Process {
                name: process.name.clone(),
            }),
            Tab::History => self.selected_archived().map(|run| LogSource::Archived {
                session_id: run.session_id.clone(),
                label: run.label.clone(),
                path: run.path.clone(),
            }),
        };
        let Some(source) = source else {
            return;
        };

        tracing::debug!(source = source.title(), "selected log source");
        self.view.log.reset();
        self.data.messages.clear();
        self.view.log_source = Some(source);
        self.view.panel = Panel::Log;
        self.fetch_log(Instant::now());
    }

    /// Normal -> Searching, seeded with the current filter.
    pub fn enter_search_mode(&mut self) {
        if matches!(self.view.mode, InteractionMode::Normal) {
            self.view.mode = InteractionMode::searching(&self.view.filter);
        }
    }

    /// Normal -> Messaging. Only possible with a session selected.
    pub fn enter_message_mode(&mut self) -> bool {
        if !matches!(self.view.mode, InteractionMode::Normal) || self.view.tab != Tab::Sessions {
            return false;
        }
        let Some(session) = self.selected_session() else {
            return false;
        };
        let target = MessageTarget {
            key: session.key.clone(),
            session_id: session.session_id.clone(),
            name: display_name(session),
        };
        self.view.mode = InteractionMode::messaging(target);
        true
    }

    /// Normal -> Spawning with fresh fields; asks for the model list.
    pub fn enter_spawn_mode(&mut self) {
        if !matches!(self.view.mode, InteractionMode::Normal) {
            return;
        }
        self.view.mode = InteractionMode::spawning();
        self.fetch_models();
    }

    /// Normal -> Confirming. Only possible with a process selected.
    pub fn enter_confirm_mode(&mut self) -> bool {
        if !matches!(self.view.mode, InteractionMode::Normal) || self.view.tab != Tab::Processes {
            return false;
        }
        let Some(name) = self.selected_process().map(|p| p.name.clone()) else {
            return false;
        };
        self.view.mode = InteractionMode::confirming(name);
        true
    }

    // ------------------------------------------------------------------
    // Control loop
    // ------------------------------------------------------------------

    /// Apply finished background calls, then start any polls that are due.
    pub fn tick(&mut self, now: Instant) {
        self.runtime.tick_count = self.runtime.tick_count.wrapping_add(1);
        self.drain_events();
        self.poll(now);
    }

    /// Wait for the next background result. Used by callers that drive the
    /// loop without a frame timer.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.runtime.events_rx.recv().await
    }

    fn drain_events(&mut self) {
        for _ in 0..MAX_EVENTS_PER_TICK {
            match self.runtime.events_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(_) => break,
            }
        }
    }

    fn poll(&mut self, now: Instant) {
        if self.runtime.poll.due(PollKind::Sessions, now) {
            self.fetch_sessions(now);
        }
        if self.runtime.poll.due(PollKind::Processes, now) {
            self.fetch_processes(now);
        }
        if self.runtime.poll.due(PollKind::Health, now) {
            self.fetch_health(now);
        }
        if self.view.log_source.is_some()
            && self.view.log.follow()
            && self.runtime.poll.due(PollKind::Logs, now)
        {
            self.fetch_log(now);
        }
    }

    fn rerender_transcript(&mut self) {
        let is_transcript = self
            .view
            .log_source
            .as_ref()
            .is_some_and(LogSource::is_transcript);
        if !is_transcript || self.data.messages.is_empty() {
            return;
        }
        let rendered = render_transcript(&self.data.messages, self.view.verbosity);
        self.view.log.update(rendered.content, rendered.query);
    }

    fn clamp_cursors(&mut self) {
        for tab in Tab::ALL {
            let len = self.visible_len(tab);
            let slot = &mut self.view.cursors[tab.index()];
            *slot = clamp_cursor(*slot, len);
        }
    }
}
