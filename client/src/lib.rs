//! Everything clawdeck talks to outside its own process.
//!
//! # Architecture
//!
//! - [`Gateway`] - the seam the engine dispatches through; one boxed future
//!   per call so results can be awaited on a spawned task
//! - [`GatewayClient`] - the real implementation:
//!   - `POST /tools/invoke` on the OpenClaw gateway (sessions, history,
//!     process logs, kill)
//!   - `GET /health`
//!   - transcript files and the process list under `~/.openclaw`
//!   - the `openclaw agent` CLI for sending messages and spawning sessions
//!
//! # Error Handling
//!
//! Every call returns [`GatewayError`]. Nothing here retries; the engine
//! polls again on its next tick.

mod agent;
mod gateway;
mod local;
mod processes;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use clawdeck_config::{OpenclawPaths, Settings};
use clawdeck_core::{Normalized, normalize_records, normalize_transcript};
use clawdeck_types::{ArchivedRun, Health, ModelOption, Process, Session, SpawnResult};

pub use agent::{parse_reply, parse_spawn_output};
pub use local::{scan_archived_runs, transcript_label};
pub use processes::{parse_process_list, parse_ps_output};

/// Per-request timeout for gateway HTTP calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for one `openclaw agent` invocation; a turn can run long.
pub const AGENT_TIMEOUT: Duration = Duration::from_secs(600);

const CONNECT_TIMEOUT_SECS: u64 = 5;
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure, timeout, or non-2xx status.
    #[error("{0}")]
    Fetch(String),
    /// The body wasn't JSON or didn't have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),
    /// The gateway refused to show this transcript.
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// A send, spawn, or kill command failed.
    #[error("{action} failed: {detail}")]
    Action {
        action: &'static str,
        detail: String,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Parse(err.to_string())
        } else if err.is_timeout() {
            GatewayError::Fetch(format!("gateway timed out: {err}"))
        } else {
            GatewayError::Fetch(format!("gateway request failed: {err}"))
        }
    }
}

pub type GatewayFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// What a transcript fetch came back with.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTranscript {
    /// Records from `sessions_history`.
    Records(Vec<Value>),
    /// JSONL text read from disk.
    File(String),
}

impl RawTranscript {
    #[must_use]
    pub fn normalize(&self) -> Normalized {
        match self {
            RawTranscript::Records(records) => normalize_records(records),
            RawTranscript::File(text) => normalize_transcript(text),
        }
    }
}

/// Which transcript to load, with enough detail for the on-disk fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRequest {
    pub key: String,
    pub session_id: String,
    pub transcript_path: Option<PathBuf>,
    pub limit: usize,
}

impl TranscriptRequest {
    #[must_use]
    pub fn for_session(session: &Session, limit: usize) -> Self {
        Self {
            key: session.key.clone(),
            session_id: session.session_id.clone(),
            transcript_path: (!session.transcript_path.is_empty())
                .then(|| PathBuf::from(&session.transcript_path)),
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// The main session the new run hangs off.
    pub root_session_id: String,
    pub prompt: String,
    /// `None` keeps the agent's configured default.
    pub model: Option<String>,
    pub label: Option<String>,
}

/// Every external operation the engine needs.
pub trait Gateway: Send + Sync {
    fn fetch_sessions(&self) -> GatewayFut<'_, Vec<Session>>;

    fn fetch_processes(&self) -> GatewayFut<'_, Vec<Process>>;

    /// Transcript files on disk with no entry in `active`.
    fn fetch_archived_runs(&self, active: Vec<Session>) -> GatewayFut<'_, Vec<ArchivedRun>>;

    fn fetch_transcript(&self, request: TranscriptRequest) -> GatewayFut<'_, RawTranscript>;

    fn read_transcript_file(&self, path: PathBuf) -> GatewayFut<'_, RawTranscript>;

    fn fetch_process_log(&self, name: String, limit: usize) -> GatewayFut<'_, String>;

    /// Returns the agent's reply text.
    fn send_message(&self, session_id: String, text: String) -> GatewayFut<'_, String>;

    fn spawn_session(&self, request: SpawnRequest) -> GatewayFut<'_, SpawnResult>;

    fn kill_process(&self, name: String) -> GatewayFut<'_, ()>;

    fn fetch_health(&self) -> GatewayFut<'_, Health>;

    fn fetch_configured_models(&self) -> GatewayFut<'_, Vec<ModelOption>>;
}

fn base_client_builder() -> reqwest::ClientBuilder {
    // The gateway listens on plain http on loopback; no https_only here.
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Read an error body, capped so a misbehaving server can't balloon memory.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// The production [`Gateway`].
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    paths: OpenclawPaths,
    agent_program: PathBuf,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("paths", &self.paths)
            .field("agent_program", &self.agent_program)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        paths: OpenclawPaths,
    ) -> Result<Self, GatewayError> {
        let http = base_client_builder()
            .build()
            .map_err(|err| GatewayError::Fetch(format!("failed to build HTTP client: {err}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            token,
            paths,
            agent_program: PathBuf::from("openclaw"),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        Self::new(
            settings.gateway_url.clone(),
            settings.token.clone(),
            settings.openclaw.clone(),
        )
    }

    /// Run a different executable in place of `openclaw`.
    #[must_use]
    pub fn with_agent_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.agent_program = program.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn paths(&self) -> &OpenclawPaths {
        &self.paths
    }
}

impl Gateway for GatewayClient {
    fn fetch_sessions(&self) -> GatewayFut<'_, Vec<Session>> {
        Box::pin(self.sessions())
    }

    fn fetch_processes(&self) -> GatewayFut<'_, Vec<Process>> {
        Box::pin(processes::fetch_processes(self.paths.process_list()))
    }

    fn fetch_archived_runs(&self, active: Vec<Session>) -> GatewayFut<'_, Vec<ArchivedRun>> {
        let dir = self.paths.sessions_dir();
        Box::pin(async move {
            let active_ids = active.into_iter().map(|s| s.session_id).collect();
            tokio::task::spawn_blocking(move || scan_archived_runs(&dir, &active_ids))
                .await
                .map_err(|err| GatewayError::Fetch(format!("archive scan panicked: {err}")))?
        })
    }

    fn fetch_transcript(&self, request: TranscriptRequest) -> GatewayFut<'_, RawTranscript> {
        Box::pin(self.transcript(request))
    }

    fn read_transcript_file(&self, path: PathBuf) -> GatewayFut<'_, RawTranscript> {
        Box::pin(async move { local::read_transcript(&path).await.map(RawTranscript::File) })
    }

    fn fetch_process_log(&self, name: String, limit: usize) -> GatewayFut<'_, String> {
        Box::pin(async move { self.process_log(&name, limit).await })
    }

    fn send_message(&self, session_id: String, text: String) -> GatewayFut<'_, String> {
        Box::pin(async move { agent::send_message(&self.agent_program, &session_id, &text).await })
    }

    fn spawn_session(&self, request: SpawnRequest) -> GatewayFut<'_, SpawnResult> {
        Box::pin(async move { agent::spawn_session(&self.agent_program, &request).await })
    }

    fn kill_process(&self, name: String) -> GatewayFut<'_, ()> {
        Box::pin(async move {
            match name.strip_prefix("pid:") {
                Some(pid) => processes::kill_pid(pid).await,
                None => self.kill(&name).await,
            }
        })
    }

    fn fetch_health(&self) -> GatewayFut<'_, Health> {
        Box::pin(self.health())
    }

    fn fetch_configured_models(&self) -> GatewayFut<'_, Vec<ModelOption>> {
        let path = self.paths.config_file();
        Box::pin(async move {
            let config = clawdeck_config::read_openclaw_json(&path)
                .map_err(|err| GatewayError::Parse(err.to_string()))?;
            Ok(config
                .as_ref()
                .map(clawdeck_config::configured_models)
                .unwrap_or_default())
        })
    }
}
