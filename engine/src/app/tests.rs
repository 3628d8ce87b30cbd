//! Unit tests for the control loop.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use clawdeck_client::{
    Gateway, GatewayError, GatewayFut, RawTranscript, SpawnRequest, TranscriptRequest,
};
use clawdeck_config::{OpenclawPaths, Settings};
use clawdeck_types::ui::{
    InputMode, InteractionMode, Panel, ScrollTo, SourceFilter, SpawnField, Tab,
};
use clawdeck_types::{ArchivedRun, Health, ModelOption, Process, Session, SpawnResult, Verbosity};

use super::{App, ConfirmModeAccess, MessageModeAccess, SearchModeAccess, SpawnModeAccess};
use crate::event::AppEvent;
use crate::source::LogSource;

#[derive(Default)]
struct FakeGateway {
    sessions: Vec<Session>,
    processes: Vec<Process>,
    records: Vec<Value>,
    models: Vec<ModelOption>,
    fail_sessions: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl Gateway for FakeGateway {
    fn fetch_sessions(&self) -> GatewayFut<'_, Vec<Session>> {
        self.record("sessions");
        let result = if self.fail_sessions {
            Err(GatewayError::Fetch("connection refused".to_string()))
        } else {
            Ok(self.sessions.clone())
        };
        Box::pin(async move { result })
    }

    fn fetch_processes(&self) -> GatewayFut<'_, Vec<Process>> {
        self.record("processes");
        let processes = self.processes.clone();
        Box::pin(async move { Ok(processes) })
    }

    fn fetch_archived_runs(&self, active: Vec<Session>) -> GatewayFut<'_, Vec<ArchivedRun>> {
        self.record(format!("archived {}", active.len()));
        Box::pin(async { Ok(Vec::new()) })
    }

    fn fetch_transcript(&self, request: TranscriptRequest) -> GatewayFut<'_, RawTranscript> {
        self.record(format!("transcript {}", request.key));
        let records = self.records.clone();
        Box::pin(async move { Ok(RawTranscript::Records(records)) })
    }

    fn read_transcript_file(&self, path: PathBuf) -> GatewayFut<'_, RawTranscript> {
        self.record(format!("file {}", path.display()));
        Box::pin(async { Ok(RawTranscript::File(String::new())) })
    }

    fn fetch_process_log(&self, name: String, _limit: usize) -> GatewayFut<'_, String> {
        self.record(format!("log {name}"));
        Box::pin(async { Ok("line one\nline two\n".to_string()) })
    }

    fn send_message(&self, session_id: String, text: String) -> GatewayFut<'_, String> {
        self.record(format!("send {session_id} {text}"));
        Box::pin(async { Ok("on it".to_string()) })
    }

    fn spawn_session(&self, request: SpawnRequest) -> GatewayFut<'_, SpawnResult> {
        self.record(format!(
            "spawn root={} prompt={} model={:?} label={:?}",
            request.root_session_id, request.prompt, request.model, request.label
        ));
        Box::pin(async {
            Ok(SpawnResult {
                session_id: Some("new-1".to_string()),
                ..SpawnResult::default()
            })
        })
    }

    fn kill_process(&self, name: String) -> GatewayFut<'_, ()> {
        self.record(format!("kill {name}"));
        Box::pin(async { Ok(()) })
    }

    fn fetch_health(&self) -> GatewayFut<'_, Health> {
        self.record("health");
        Box::pin(async {
            Ok(Health {
                ok: true,
                duration_ms: 3,
                checked_at: 1,
            })
        })
    }

    fn fetch_configured_models(&self) -> GatewayFut<'_, Vec<ModelOption>> {
        self.record("models");
        let models = self.models.clone();
        Box::pin(async move { Ok(models) })
    }
}

fn session(key: &str, session_id: &str, channel: &str) -> Session {
    Session {
        key: key.to_string(),
        session_id: session_id.to_string(),
        channel: channel.to_string(),
        kind: if key.ends_with(":main") { "main" } else { "subagent" }.to_string(),
        ..Session::default()
    }
}

fn process(name: &str) -> Process {
    Process {
        name: name.to_string(),
        status: "running".to_string(),
        ..Process::default()
    }
}

fn test_app(gateway: FakeGateway) -> (App, Arc<FakeGateway>) {
    let gateway = Arc::new(gateway);
    let settings = Settings::defaults(OpenclawPaths::new("/nonexistent/.openclaw"));
    let app = App::new(gateway.clone(), &settings);
    (app, gateway)
}

/// Let spawned calls finish and apply everything they posted, including
/// follow-up calls those results start.
async fn run_pending(app: &mut App) {
    for _ in 0..3 {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        app.drain_events();
    }
}

/// Wait for and apply exactly `n` background results.
async fn settle(app: &mut App, n: usize) {
    for _ in 0..n {
        let event = tokio::time::timeout(Duration::from_secs(5), app.next_event())
            .await
            .expect("event within timeout")
            .expect("channel open");
        app.apply_event(event);
    }
}

fn with_sessions(app: &mut App, sessions: Vec<Session>) {
    app.apply_event(AppEvent::Sessions(Ok(sessions)));
}

fn user(text: &str) -> Value {
    json!({"role": "user", "content": [{"type": "text", "text": text}]})
}

#[tokio::test]
async fn first_tick_polls_everything_but_logs() {
    let (mut app, gateway) = test_app(FakeGateway {
        sessions: vec![session("agent:main:main", "m", "")],
        ..FakeGateway::default()
    });
    app.tick(Instant::now());
    run_pending(&mut app).await;

    assert_eq!(gateway.count("sessions"), 1);
    assert_eq!(gateway.count("processes"), 1);
    assert_eq!(gateway.count("health"), 1);
    assert_eq!(gateway.count("transcript"), 0);
    assert_eq!(app.sessions().len(), 1);
    assert!(app.health().is_some_and(|h| h.ok));
}

#[tokio::test]
async fn polls_respect_cadence() {
    let (mut app, gateway) = test_app(FakeGateway::default());
    let start = Instant::now();
    app.tick(start);
    app.tick(start + Duration::from_secs(1));
    run_pending(&mut app).await;
    assert_eq!(gateway.count("sessions"), 1);

    app.tick(start + Duration::from_secs(4));
    run_pending(&mut app).await;
    assert_eq!(gateway.count("processes"), 2);
    assert_eq!(gateway.count("sessions"), 1);
}

#[tokio::test]
async fn log_refresh_requires_selection_and_follow() {
    let (mut app, gateway) = test_app(FakeGateway {
        records: vec![user("hello")],
        ..FakeGateway::default()
    });
    with_sessions(&mut app, vec![session("agent:main:main", "m", "")]);
    run_pending(&mut app).await;

    app.select_current();
    assert_eq!(app.panel(), Panel::Log);
    run_pending(&mut app).await;
    assert_eq!(gateway.count("transcript agent:main:main"), 1);
    assert!(app.log().content().contains("hello"));

    let start = Instant::now() + Duration::from_secs(10);
    app.tick(start);
    run_pending(&mut app).await;
    assert_eq!(gateway.count("transcript"), 2);

    // Throttled within the log interval.
    app.tick(start + Duration::from_secs(1));
    run_pending(&mut app).await;
    assert_eq!(gateway.count("transcript"), 2);

    // Paused while not following.
    app.toggle_follow();
    assert!(!app.log().follow());
    app.tick(start + Duration::from_secs(2));
    run_pending(&mut app).await;
    assert_eq!(gateway.count("transcript"), 2);
}

#[tokio::test]
async fn selecting_resets_buffer_and_enables_follow() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.apply_event(AppEvent::Processes(Ok(vec![process("calm-reef")])));
    app.select_tab(Tab::Processes);
    app.scroll_log_up(1);
    assert!(!app.log().follow());

    app.select_current();
    assert!(app.log().follow());
    assert!(app.log().is_empty());
    assert_eq!(
        app.log_source(),
        Some(&LogSource::Process {
            name: "calm-reef".to_string()
        })
    );
    run_pending(&mut app).await;
    assert_eq!(app.log().content(), "line one\nline two\n");
}

#[tokio::test]
async fn search_filters_live_and_escape_clears() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    with_sessions(
        &mut app,
        vec![
            session("agent:main:signal:1", "a", "signal"),
            session("agent:main:matrix:2", "b", "matrix"),
        ],
    );

    app.enter_search_mode();
    assert_eq!(app.input_mode(), InputMode::Searching);
    for c in "sig".chars() {
        let SearchModeAccess::InSearch(mut search) = app.search_mode_mut() else {
            panic!("expected search mode");
        };
        search.enter_char(c);
    }
    assert_eq!(app.filter(), "sig");
    assert_eq!(app.visible_sessions().len(), 1);

    let SearchModeAccess::InSearch(search) = app.search_mode_mut() else {
        panic!("expected search mode");
    };
    search.cancel();
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(app.filter(), "");
    assert_eq!(app.visible_sessions().len(), 2);
}

#[tokio::test]
async fn search_enter_commits() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.enter_search_mode();
    if let SearchModeAccess::InSearch(mut search) = app.search_mode_mut() {
        search.enter_char('x');
    }
    if let SearchModeAccess::InSearch(search) = app.search_mode_mut() {
        search.commit();
    }
    assert_eq!(app.filter(), "x");
    assert_eq!(app.input_mode(), InputMode::Normal);

    // Re-entering starts from the committed filter.
    app.enter_search_mode();
    let InteractionMode::Searching { field } = app.mode() else {
        panic!("expected search mode");
    };
    assert_eq!(field.text(), "x");
}

#[tokio::test]
async fn source_filter_narrows_sessions_and_clamps_cursor() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    with_sessions(
        &mut app,
        vec![
            session("s1", "a", "signal"),
            session("m1", "b", "matrix"),
            session("m2", "c", "matrix"),
        ],
    );
    app.move_cursor(5);
    assert_eq!(app.cursor(), 2);

    app.cycle_source_filter();
    assert_eq!(app.source_filter(), SourceFilter::Signal);
    assert_eq!(app.visible_sessions().len(), 1);
    assert_eq!(app.cursor(), 0);
}

#[tokio::test]
async fn cursor_is_noop_on_empty_list() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.move_cursor(1);
    app.move_cursor(-1);
    assert_eq!(app.cursor(), 0);
    app.select_current();
    assert!(app.log_source().is_none());
}

#[tokio::test]
async fn message_mode_requires_session() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    assert!(!app.enter_message_mode());

    app.apply_event(AppEvent::Processes(Ok(vec![process("p")])));
    app.select_tab(Tab::Processes);
    assert!(!app.enter_message_mode());
    assert_eq!(app.input_mode(), InputMode::Normal);
}

#[tokio::test]
async fn empty_message_cancels_silently() {
    let (mut app, gateway) = test_app(FakeGateway::default());
    with_sessions(&mut app, vec![session("agent:main:main", "m", "")]);
    assert!(app.enter_message_mode());
    let MessageModeAccess::InMessage(message) = app.message_mode_mut() else {
        panic!("expected message mode");
    };
    assert!(!message.submit());
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert!(!app.sending());
    assert_eq!(gateway.count("send"), 0);
}

#[tokio::test]
async fn sent_reply_is_appended_and_transcript_refetched() {
    let (mut app, gateway) = test_app(FakeGateway {
        records: vec![user("first")],
        ..FakeGateway::default()
    });
    with_sessions(&mut app, vec![session("agent:main:main", "m", "")]);
    run_pending(&mut app).await;
    app.select_current();
    run_pending(&mut app).await;

    assert!(app.enter_message_mode());
    for c in "hi".chars() {
        if let MessageModeAccess::InMessage(mut message) = app.message_mode_mut() {
            message.enter_char(c);
        }
    }
    let MessageModeAccess::InMessage(message) = app.message_mode_mut() else {
        panic!("expected message mode");
    };
    assert!(message.submit());
    assert!(app.sending());
    assert_eq!(app.input_mode(), InputMode::Normal);

    settle(&mut app, 1).await;
    assert!(!app.sending());
    assert_eq!(gateway.count("send m hi"), 1);
    assert!(app.log().content().contains("--- SENT ---\non it"));

    run_pending(&mut app).await;
    assert_eq!(gateway.count("transcript"), 2);
}

#[tokio::test]
async fn spawn_validates_prompt_and_main_session() {
    let (mut app, gateway) = test_app(FakeGateway::default());
    app.enter_spawn_mode();
    run_pending(&mut app).await;

    let SpawnModeAccess::InSpawn(spawn) = app.spawn_mode_mut() else {
        panic!("expected spawn mode");
    };
    assert!(!spawn.submit());
    let InteractionMode::Spawning(form) = app.mode() else {
        panic!("still spawning");
    };
    assert_eq!(form.error.as_deref(), Some("prompt is required"));

    if let SpawnModeAccess::InSpawn(mut spawn) = app.spawn_mode_mut() {
        spawn.enter_char('x');
    }
    let SpawnModeAccess::InSpawn(spawn) = app.spawn_mode_mut() else {
        panic!("expected spawn mode");
    };
    assert!(!spawn.submit());
    let InteractionMode::Spawning(form) = app.mode() else {
        panic!("still spawning");
    };
    assert_eq!(form.error.as_deref(), Some("no main session found"));
    assert!(!app.spinning());
    assert_eq!(gateway.count("spawn"), 0);
}

#[tokio::test]
async fn spawn_with_selected_model_and_label() {
    let (mut app, gateway) = test_app(FakeGateway {
        models: vec![
            ModelOption::new("anthropic/claude-opus-4", Some("opus".to_string())),
            ModelOption::new("openai/gpt-4o", None),
        ],
        ..FakeGateway::default()
    });
    with_sessions(&mut app, vec![session("agent:main:main", "root-id", "")]);
    run_pending(&mut app).await;

    app.enter_spawn_mode();
    run_pending(&mut app).await;
    assert_eq!(
        app.model_options(),
        vec![
            "(default)".to_string(),
            "anthropic/claude-opus-4  (opus)".to_string(),
            "openai/gpt-4o".to_string()
        ]
    );

    if let SpawnModeAccess::InSpawn(mut spawn) = app.spawn_mode_mut() {
        for c in "fix ci".chars() {
            spawn.enter_char(c);
        }
        spawn.next_field();
        assert_eq!(spawn.focus(), Some(SpawnField::Model));
        spawn.enter_char('z'); // ignored on the selector
        spawn.cycle_model(-1);
        spawn.next_field();
        for c in "ci".chars() {
            spawn.enter_char(c);
        }
    }
    let SpawnModeAccess::InSpawn(spawn) = app.spawn_mode_mut() else {
        panic!("expected spawn mode");
    };
    assert!(spawn.submit());
    assert!(app.spinning());
    assert_eq!(app.input_mode(), InputMode::Normal);

    run_pending(&mut app).await;
    assert!(!app.spinning());
    assert_eq!(app.notice(), Some("Spawned: new-1"));
    assert_eq!(
        gateway.count(
            "spawn root=root-id prompt=fix ci model=Some(\"openai/gpt-4o\") label=Some(\"ci\")"
        ),
        1
    );
    // Success refreshes the session list.
    assert_eq!(gateway.count("sessions"), 1);
}

#[tokio::test]
async fn spawn_escape_discards_form() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.enter_spawn_mode();
    if let SpawnModeAccess::InSpawn(mut spawn) = app.spawn_mode_mut() {
        spawn.enter_char('a');
    }
    if let SpawnModeAccess::InSpawn(spawn) = app.spawn_mode_mut() {
        spawn.cancel();
    }
    assert_eq!(app.input_mode(), InputMode::Normal);
    app.enter_spawn_mode();
    let InteractionMode::Spawning(form) = app.mode() else {
        panic!("expected spawn mode");
    };
    assert!(form.prompt.is_empty());
}

#[tokio::test]
async fn confirm_kills_only_on_yes() {
    let (mut app, gateway) = test_app(FakeGateway::default());
    app.apply_event(AppEvent::Processes(Ok(vec![process("calm-reef")])));

    // Sessions tab: no kill target.
    assert!(!app.enter_confirm_mode());

    app.select_tab(Tab::Processes);
    assert!(app.enter_confirm_mode());
    assert_eq!(app.status_line().confirm, Some("calm-reef"));
    if let ConfirmModeAccess::InConfirm(confirm) = app.confirm_mode_mut() {
        confirm.cancel();
    }
    assert_eq!(app.input_mode(), InputMode::Normal);
    assert_eq!(gateway.count("kill"), 0);

    assert!(app.enter_confirm_mode());
    if let ConfirmModeAccess::InConfirm(confirm) = app.confirm_mode_mut() {
        confirm.confirm();
    }
    run_pending(&mut app).await;
    assert_eq!(gateway.count("kill calm-reef"), 1);
    assert_eq!(app.notice(), Some("Killed calm-reef"));
}

#[tokio::test]
async fn modes_are_exclusive() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    with_sessions(&mut app, vec![session("agent:main:main", "m", "")]);
    app.enter_search_mode();
    assert!(!app.enter_message_mode());
    app.enter_spawn_mode();
    assert_eq!(app.input_mode(), InputMode::Searching);
    assert!(matches!(app.spawn_mode_mut(), SpawnModeAccess::NotSpawn));
}

#[tokio::test]
async fn verbosity_rerenders_cached_messages_without_refetch() {
    let (mut app, gateway) = test_app(FakeGateway {
        records: vec![
            user("run tests"),
            json!({"role": "assistant", "content": [
                {"type": "toolCall", "name": "exec", "arguments": {"command": "cargo test"}}
            ]}),
            json!({"role": "toolResult", "toolName": "exec", "content": [{"type": "text", "text": "ok"}]}),
            json!({"role": "assistant", "content": [{"type": "text", "text": "all green"}]}),
        ],
        ..FakeGateway::default()
    });
    with_sessions(&mut app, vec![session("agent:main:main", "m", "")]);
    run_pending(&mut app).await;
    app.select_current();
    run_pending(&mut app).await;
    assert!(app.log().content().contains("$ cargo test"));

    app.cycle_verbosity();
    assert_eq!(app.verbosity(), Verbosity::Full);
    assert!(app.log().content().contains("TOOL CALL"));

    app.cycle_verbosity();
    assert_eq!(app.verbosity(), Verbosity::Off);
    let content = app.log().content();
    assert!(content.contains("run tests"));
    assert!(content.contains("all green"));
    assert!(!content.contains("cargo test"));
    assert_eq!(gateway.count("transcript"), 1);
}

#[tokio::test]
async fn failures_set_error_and_clear_busy_flags() {
    let (mut app, _gateway) = test_app(FakeGateway {
        fail_sessions: true,
        ..FakeGateway::default()
    });
    app.status.sending = true;
    app.status.spinning = true;
    app.fetch_sessions(Instant::now());
    settle(&mut app, 1).await;

    assert!(!app.sending());
    assert!(!app.spinning());
    assert!(
        app.last_error()
            .is_some_and(|e| e.contains("connection refused"))
    );
    assert!(!app.should_quit());

    // A later success clears it.
    app.apply_event(AppEvent::Sessions(Ok(Vec::new())));
    assert_eq!(app.last_error(), None);

    app.apply_event(AppEvent::Health(Err(GatewayError::Fetch("down".to_string()))));
    assert!(app.health().is_none());
    assert_eq!(app.last_error(), Some("health: down"));
}

#[tokio::test]
async fn log_scroll_keys_drive_buffer() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.set_log_viewport(clawdeck_core::Viewport {
        width: 40,
        height: 12,
    });
    app.apply_event(AppEvent::Processes(Ok(vec![process("p")])));
    app.select_tab(Tab::Processes);
    app.select_current();
    let long: String = (0..50).map(|i| format!("line {i}\n")).collect();
    app.apply_event(AppEvent::ProcessLog(Ok(long)));

    let max = app.log().max_scroll();
    assert_eq!(app.log().scroll_offset(), max);
    app.scroll_log_to(ScrollTo::Top);
    assert_eq!(app.log().scroll_offset(), 0);
    assert!(!app.log().follow());
    app.page_log_down();
    assert_eq!(app.log().scroll_offset(), app.log().visible_height());
    app.scroll_log_to(ScrollTo::Bottom);
    assert!(app.log().follow());
}

#[tokio::test]
async fn escape_returns_to_list() {
    let (mut app, _gateway) = test_app(FakeGateway::default());
    app.focus_panel(Panel::Log);
    app.escape();
    assert_eq!(app.panel(), Panel::List);
    app.toggle_panel();
    assert_eq!(app.panel(), Panel::Log);
}
