//! Input handling for the clawdeck TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use clawdeck_engine::{
    App, ConfirmModeAccess, InputMode, MessageModeAccess, Panel, ScrollTo, SearchModeAccess,
    SpawnModeAccess, Tab,
};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame
/// loop over a bounded channel.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a backpressured send unblocks.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if the caller exits early; never block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Apply pending terminal events. Returns `true` once the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        if apply_event(app, ev) {
            return Ok(true);
        }
    }
    Ok(app.should_quit())
}

pub(crate) fn apply_event(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            // Ctrl+C quits from any mode.
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.request_quit();
                return true;
            }

            match app.input_mode() {
                InputMode::Normal => handle_normal_mode(app, key),
                InputMode::Searching => handle_search_mode(app, key),
                InputMode::Messaging => handle_message_mode(app, key),
                InputMode::Spawning => handle_spawn_mode(app, key),
                InputMode::Confirming => handle_confirm_mode(app, key),
            }
        }
        Event::Paste(text) => paste(app, &text),
        _ => {}
    }
    app.should_quit()
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let in_log = app.panel() == Panel::Log;
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('1') => app.select_tab(Tab::Sessions),
        KeyCode::Char('2') => app.select_tab(Tab::Processes),
        KeyCode::Char('3') => app.select_tab(Tab::History),
        KeyCode::Tab => app.toggle_panel(),
        KeyCode::Left | KeyCode::Char('h') => app.focus_panel(Panel::List),
        KeyCode::Right | KeyCode::Char('l') => app.focus_panel(Panel::Log),
        KeyCode::Up | KeyCode::Char('k') if in_log => app.scroll_log_up(1),
        KeyCode::Down | KeyCode::Char('j') if in_log => app.scroll_log_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::PageUp if in_log => app.page_log_up(),
        KeyCode::PageDown if in_log => app.page_log_down(),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::Char('g') | KeyCode::Home if in_log => app.scroll_log_to(ScrollTo::Top),
        KeyCode::Char('G') | KeyCode::End if in_log => app.scroll_log_to(ScrollTo::Bottom),
        KeyCode::Char('g') | KeyCode::Home => app.move_cursor(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_cursor(isize::MAX),
        KeyCode::Enter => app.select_current(),
        KeyCode::Esc => app.escape(),
        KeyCode::Char('f') => app.toggle_follow(),
        KeyCode::Char('v') => app.cycle_verbosity(),
        KeyCode::Char('c') => app.cycle_source_filter(),
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('m') => {
            app.enter_message_mode();
        }
        KeyCode::Char('s') => app.enter_spawn_mode(),
        KeyCode::Char('x') => {
            app.enter_confirm_mode();
        }
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    let SearchModeAccess::InSearch(mut search) = app.search_mode_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => search.cancel(),
        KeyCode::Enter => search.commit(),
        KeyCode::Backspace => search.delete_char(),
        KeyCode::Left => search.move_cursor_left(),
        KeyCode::Right => search.move_cursor_right(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            search.clear_line();
        }
        KeyCode::Char(c) => search.enter_char(c),
        _ => {}
    }
}

fn handle_message_mode(app: &mut App, key: KeyEvent) {
    let MessageModeAccess::InMessage(mut message) = app.message_mode_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => message.cancel(),
        KeyCode::Enter => {
            message.submit();
        }
        KeyCode::Backspace => message.delete_char(),
        KeyCode::Left => message.move_cursor_left(),
        KeyCode::Right => message.move_cursor_right(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            message.clear_line();
        }
        KeyCode::Char(c) => message.enter_char(c),
        _ => {}
    }
}

fn handle_spawn_mode(app: &mut App, key: KeyEvent) {
    let SpawnModeAccess::InSpawn(mut spawn) = app.spawn_mode_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => spawn.cancel(),
        KeyCode::Enter => {
            spawn.submit();
        }
        KeyCode::Tab => spawn.next_field(),
        KeyCode::Up => spawn.cycle_model(-1),
        KeyCode::Down => spawn.cycle_model(1),
        KeyCode::Backspace => spawn.delete_char(),
        KeyCode::Left => spawn.move_cursor_left(),
        KeyCode::Right => spawn.move_cursor_right(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            spawn.clear_line();
        }
        KeyCode::Char(c) => spawn.enter_char(c),
        _ => {}
    }
}

fn handle_confirm_mode(app: &mut App, key: KeyEvent) {
    let ConfirmModeAccess::InConfirm(confirm) = app.confirm_mode_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char('y' | 'Y') => confirm.confirm(),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => confirm.cancel(),
        _ => {}
    }
}

/// Bracketed paste goes into whichever text field is active, flattened to a
/// single line.
fn paste(app: &mut App, text: &str) {
    let flattened = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
    match app.input_mode() {
        InputMode::Searching => {
            if let SearchModeAccess::InSearch(mut search) = app.search_mode_mut() {
                flattened.chars().for_each(|c| search.enter_char(c));
            }
        }
        InputMode::Messaging => {
            if let MessageModeAccess::InMessage(mut message) = app.message_mode_mut() {
                flattened.chars().for_each(|c| message.enter_char(c));
            }
        }
        InputMode::Spawning => {
            if let SpawnModeAccess::InSpawn(mut spawn) = app.spawn_mode_mut() {
                flattened.chars().for_each(|c| spawn.enter_char(c));
            }
        }
        InputMode::Normal | InputMode::Confirming => {}
    }
}
