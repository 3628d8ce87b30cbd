//! Fire-and-forget gateway calls and the handlers for their results.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clawdeck_client::{AGENT_TIMEOUT, GatewayError, REQUEST_TIMEOUT, SpawnRequest};
use clawdeck_core::{clean, render_log, render_transcript};
use clawdeck_types::ui::{InteractionMode, MessageTarget};

use super::App;
use crate::event::AppEvent;
use crate::poll::PollKind;
use crate::source::LogSource;

impl App {
    /// Run `call` on the runtime and post its result, bounded by `timeout`.
    fn spawn_call<T, F>(
        &self,
        what: &'static str,
        timeout: Duration,
        call: F,
        wrap: impl FnOnce(Result<T, GatewayError>) -> AppEvent + Send + 'static,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, GatewayError>> + Send + 'static,
    {
        tracing::debug!(what, "dispatching");
        let tx = self.runtime.events_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Fetch(format!(
                    "{what} timed out after {}s",
                    timeout.as_secs()
                ))),
            };
            // The receiver only goes away when the app shuts down.
            let _ = tx.send(wrap(result));
        });
    }

    pub(crate) fn fetch_sessions(&mut self, now: Instant) {
        self.runtime.poll.mark(PollKind::Sessions, now);
        let gateway = Arc::clone(&self.runtime.gateway);
        self.spawn_call(
            "sessions",
            REQUEST_TIMEOUT,
            async move { gateway.fetch_sessions().await },
            AppEvent::Sessions,
        );
    }

    pub(crate) fn fetch_processes(&mut self, now: Instant) {
        self.runtime.poll.mark(PollKind::Processes, now);
        let gateway = Arc::clone(&self.runtime.gateway);
        self.spawn_call(
            "processes",
            REQUEST_TIMEOUT,
            async move { gateway.fetch_processes().await },
            AppEvent::Processes,
        );
    }

    pub(crate) fn fetch_health(&mut self, now: Instant) {
        self.runtime.poll.mark(PollKind::Health, now);
        let gateway = Arc::clone(&self.runtime.gateway);
        self.spawn_call(
            "health",
            REQUEST_TIMEOUT,
            async move { gateway.fetch_health().await },
            AppEvent::Health,
        );
    }

    fn fetch_archived(&self) {
        let gateway = Arc::clone(&self.runtime.gateway);
        let active = self.data.sessions.clone();
        self.spawn_call(
            "archived runs",
            REQUEST_TIMEOUT,
            async move { gateway.fetch_archived_runs(active).await },
            AppEvent::Archived,
        );
    }

    pub(crate) fn fetch_models(&self) {
        let gateway = Arc::clone(&self.runtime.gateway);
        self.spawn_call(
            "models",
            REQUEST_TIMEOUT,
            async move { gateway.fetch_configured_models().await },
            AppEvent::Models,
        );
    }

    /// Refetch the selected log source, if any.
    pub(crate) fn fetch_log(&mut self, now: Instant) {
        let Some(source) = self.view.log_source.clone() else {
            return;
        };
        self.runtime.poll.mark(PollKind::Logs, now);
        let gateway = Arc::clone(&self.runtime.gateway);
        let limit = self.runtime.history_limit;
        match source {
            LogSource::Session { request, .. } => self.spawn_call(
                "transcript",
                REQUEST_TIMEOUT,
                async move { gateway.fetch_transcript(request).await },
                AppEvent::Transcript,
            ),
            LogSource::Archived { path, .. } => self.spawn_call(
                "archived transcript",
                REQUEST_TIMEOUT,
                async move { gateway.read_transcript_file(path).await },
                AppEvent::Transcript,
            ),
            LogSource::Process { name } => self.spawn_call(
                "process log",
                REQUEST_TIMEOUT,
                async move { gateway.fetch_process_log(name, limit).await },
                AppEvent::ProcessLog,
            ),
        }
    }

    pub(crate) fn send_message(&mut self, target: MessageTarget, text: String) {
        self.status.sending = true;
        self.status.last_error = None;
        let gateway = Arc::clone(&self.runtime.gateway);
        let session_id = target.session_id.clone();
        self.spawn_call(
            "send",
            AGENT_TIMEOUT,
            async move { gateway.send_message(session_id, text).await },
            move |result| AppEvent::MessageSent { target, result },
        );
    }

    pub(crate) fn spawn_session(&mut self, request: SpawnRequest) {
        self.status.spinning = true;
        self.status.last_error = None;
        let gateway = Arc::clone(&self.runtime.gateway);
        self.spawn_call(
            "spawn",
            AGENT_TIMEOUT,
            async move { gateway.spawn_session(request).await },
            AppEvent::Spawned,
        );
    }

    pub(crate) fn kill_process(&mut self, name: String) {
        let gateway = Arc::clone(&self.runtime.gateway);
        let target = name.clone();
        self.spawn_call(
            "kill",
            REQUEST_TIMEOUT,
            async move { gateway.kill_process(target).await },
            move |result| AppEvent::Killed { name, result },
        );
    }

    /// Record a failed call. Never fatal; the next poll retries.
    fn fail(&mut self, context: &str, err: &GatewayError) {
        tracing::warn!("{context}: {err}");
        self.status.sending = false;
        self.status.spinning = false;
        self.status.last_error = Some(format!("{context}: {err}"));
    }

    /// Apply one finished call to the state.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Sessions(Ok(sessions)) => {
                self.data.sessions = sessions;
                self.status.last_error = None;
                self.clamp_cursors();
                self.fetch_archived();
            }
            AppEvent::Sessions(Err(err)) => self.fail("sessions", &err),

            AppEvent::Processes(Ok(processes)) => {
                self.data.processes = processes;
                self.status.last_error = None;
                self.clamp_cursors();
            }
            AppEvent::Processes(Err(err)) => self.fail("processes", &err),

            AppEvent::Archived(Ok(runs)) => {
                self.data.archived = runs;
                self.clamp_cursors();
            }
            AppEvent::Archived(Err(err)) => self.fail("archived runs", &err),

            AppEvent::Transcript(Ok(raw)) => {
                let normalized = raw.normalize();
                if normalized.skipped > 0 {
                    tracing::debug!(skipped = normalized.skipped, "dropped malformed transcript records");
                }
                self.data.messages = normalized.messages;
                let rendered = render_transcript(&self.data.messages, self.view.verbosity);
                self.view.log.update(rendered.content, rendered.query);
            }
            AppEvent::Transcript(Err(err)) => self.fail("transcript", &err),

            AppEvent::ProcessLog(Ok(raw)) => {
                self.data.messages.clear();
                let rendered = render_log(&raw);
                self.view.log.update(rendered.content, rendered.query);
            }
            AppEvent::ProcessLog(Err(err)) => self.fail("process log", &err),

            AppEvent::Health(Ok(health)) => {
                self.data.health = Some(health);
                self.status.last_error = None;
            }
            AppEvent::Health(Err(err)) => {
                self.data.health = None;
                self.fail("health", &err);
            }

            AppEvent::Models(Ok(models)) => {
                self.data.models = models;
                let options = self.data.models.len() + 1;
                if let InteractionMode::Spawning(form) = &mut self.view.mode {
                    form.model_index = form.model_index.min(options - 1);
                }
            }
            AppEvent::Models(Err(err)) => self.fail("models", &err),

            AppEvent::MessageSent { target, result } => match result {
                Ok(reply) => {
                    self.status.sending = false;
                    let showing_target = self
                        .view
                        .log_source
                        .as_ref()
                        .and_then(LogSource::session_key)
                        == Some(target.key.as_str());
                    if showing_target {
                        self.view
                            .log
                            .append(&format!("\n--- SENT ---\n{}\n", clean(&reply)));
                    } else {
                        self.status.notice = Some(format!("Reply from {}", target.name));
                    }
                    self.fetch_log(Instant::now());
                }
                Err(err) => self.fail("send", &err),
            },

            AppEvent::Spawned(Ok(result)) => {
                self.status.spinning = false;
                self.status.last_error = None;
                self.status.notice = Some(match result.session_id {
                    Some(id) => format!("Spawned: {id}"),
                    None => "Spawned".to_string(),
                });
                self.fetch_sessions(Instant::now());
            }
            AppEvent::Spawned(Err(err)) => self.fail("spawn", &err),

            AppEvent::Killed { name, result } => match result {
                Ok(()) => {
                    self.status.notice = Some(format!("Killed {name}"));
                    self.fetch_processes(Instant::now());
                }
                Err(err) => self.fail("kill", &err),
            },
        }
    }
}
