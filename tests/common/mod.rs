//! Shared test utilities and fixtures
//!
//! A mock OpenClaw gateway plus a throwaway `~/.openclaw` directory, wired
//! into a real [`App`] through [`GatewayClient`].

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clawdeck_engine::{App, GatewayClient, OpenclawPaths, Settings, Viewport};

/// Mock gateway and OpenClaw home for one test.
pub struct Fixture {
    pub server: MockServer,
    pub home: TempDir,
}

impl Fixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            home: tempfile::tempdir().unwrap(),
        }
    }

    pub fn paths(&self) -> OpenclawPaths {
        OpenclawPaths::new(self.home.path())
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::defaults(self.paths());
        settings.gateway_url = self.server.uri();
        settings
    }

    /// An app talking to the mock gateway, sized like a 120x40 terminal.
    pub fn app(&self) -> App {
        self.app_with(GatewayClient::from_settings(&self.settings()).unwrap())
    }

    /// Like [`Fixture::app`], with `openclaw agent` replaced by a script
    /// that prints `stdout`.
    #[cfg(unix)]
    pub fn app_with_agent(&self, stdout: &str) -> App {
        use std::os::unix::fs::PermissionsExt;

        let script = self.home.path().join("fake-openclaw");
        fs::write(&script, format!("#!/bin/sh\ncat <<'OUT'\n{stdout}\nOUT\n")).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let gateway = GatewayClient::from_settings(&self.settings())
            .unwrap()
            .with_agent_program(script);
        self.app_with(gateway)
    }

    fn app_with(&self, gateway: GatewayClient) -> App {
        let mut app = App::new(Arc::new(gateway), &self.settings());
        app.set_log_viewport(Viewport {
            width: 76,
            height: 36,
        });
        app
    }

    /// Write `<sessions_dir>/<id>.jsonl`.
    pub fn write_transcript(&self, session_id: &str, lines: &[Value]) -> PathBuf {
        let path = self.paths().transcript_file(session_id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let text: String = lines.iter().map(|line| format!("{line}\n")).collect();
        fs::write(&path, text).unwrap();
        path
    }

    pub fn write_process_list(&self, processes: &Value) {
        fs::write(
            self.paths().process_list(),
            json!({ "processes": processes }).to_string(),
        )
        .unwrap();
    }
}

/// Answer `POST /tools/invoke` for `tool` with an `ok` envelope.
pub async fn mount_tool(server: &MockServer, tool: &str, result: Value) {
    Mock::given(method("POST"))
        .and(path("/tools/invoke"))
        .and(body_partial_json(json!({ "tool": tool })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": result
        })))
        .mount(server)
        .await;
}

/// Answer `POST /tools/invoke` for `tool` with `ok: false`.
pub async fn mount_tool_error(server: &MockServer, tool: &str, error: &str) {
    Mock::given(method("POST"))
        .and(path("/tools/invoke"))
        .and(body_partial_json(json!({ "tool": tool })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error": { "message": error }
        })))
        .mount(server)
        .await;
}

pub async fn mount_sessions(server: &MockServer, sessions: Value) {
    mount_tool(server, "sessions_list", json!({ "details": { "sessions": sessions } })).await;
}

pub async fn mount_history(server: &MockServer, messages: Value) {
    mount_tool(
        server,
        "sessions_history",
        json!({ "details": { "messages": messages } }),
    )
    .await;
}

pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// First tick against a gateway that lists sessions: sessions, processes,
/// health, then the archive scan the session list triggers.
pub async fn boot(app: &mut App) {
    app.tick(Instant::now());
    settle(app, 4).await;
}

/// Wait for `n` background results and apply each.
pub async fn settle(app: &mut App, n: usize) {
    for _ in 0..n {
        let event = tokio::time::timeout(Duration::from_secs(5), app.next_event())
            .await
            .expect("timed out waiting for a gateway result")
            .expect("event channel closed");
        app.apply_event(event);
    }
}

pub fn session(key: &str, session_id: &str) -> Value {
    json!({ "key": key, "sessionId": session_id, "kind": "direct" })
}

/// A transcript file line holding a user message.
pub fn file_user(text: &str) -> Value {
    json!({
        "type": "message",
        "message": { "role": "user", "content": [{ "type": "text", "text": text }] }
    })
}

/// A transcript file line holding an assistant message.
pub fn file_assistant(text: &str) -> Value {
    json!({
        "type": "message",
        "message": { "role": "assistant", "content": [{ "type": "text", "text": text }] }
    })
}

pub fn user(text: &str) -> Value {
    json!({ "role": "user", "content": text })
}

pub fn assistant(text: &str) -> Value {
    json!({ "role": "assistant", "content": [{ "type": "text", "text": text }] })
}

/// An assistant turn that only calls `tool` with `args`.
pub fn tool_call(tool: &str, args: Value) -> Value {
    json!({
        "role": "assistant",
        "content": [{ "type": "toolCall", "name": tool, "arguments": args }]
    })
}

pub fn tool_result(tool: &str, text: &str, is_error: bool) -> Value {
    json!({
        "role": "toolResult",
        "toolName": tool,
        "isError": is_error,
        "content": [{ "type": "text", "text": text }]
    })
}
