//! Tool calls over `POST /tools/invoke`, plus the health probe.

use std::time::Instant;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use clawdeck_types::{Health, Session, strip_ansi};

use crate::{GatewayClient, GatewayError, RawTranscript, TranscriptRequest, local, read_capped_error_body};

/// Phrases the gateway uses when a session's history is not visible to us.
const DENIAL_MARKERS: [&str; 4] = ["forbidden", "visibility", "access", "not allowed"];

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
}

fn error_text(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_denial(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    DENIAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// `result.details.<field>` as an array.
fn details_array(result: &Value, field: &str, tool: &str) -> Result<Vec<Value>, GatewayError> {
    result
        .get("details")
        .and_then(|details| details.get(field))
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| GatewayError::Parse(format!("{tool}: missing details.{field}")))
}

/// Some tools report refusal inside a successful envelope.
fn check_details_denial(result: &Value, tool: &str) -> Result<(), GatewayError> {
    let Some(details) = result.get("details") else {
        return Ok(());
    };
    let status = details.get("status").and_then(Value::as_str).unwrap_or("");
    if status.eq_ignore_ascii_case("forbidden") {
        let reason = details
            .get("error")
            .map(error_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "forbidden".to_string());
        return Err(GatewayError::AccessDenied(format!("{tool}: {reason}")));
    }
    Ok(())
}

impl GatewayClient {
    /// Invoke a gateway tool and return the envelope's `result`.
    async fn invoke(&self, tool: &str, args: Value) -> Result<Value, GatewayError> {
        let url = format!("{}/tools/invoke", self.base_url);
        tracing::debug!(tool, "invoking gateway tool");

        let mut request = self.http.post(&url).json(&json!({ "tool": tool, "args": args }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = read_capped_error_body(response).await;
            return Err(GatewayError::AccessDenied(format!("{tool}: {status} {body}")));
        }
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(GatewayError::Fetch(format!("{tool}: gateway {status}: {body}")));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|err| GatewayError::Parse(format!("{tool}: {err}")))?;
        if !envelope.ok {
            let reason = error_text(&envelope.error);
            if is_denial(&reason) {
                return Err(GatewayError::AccessDenied(format!("{tool}: {reason}")));
            }
            let reason = if reason.is_empty() {
                "ok=false".to_string()
            } else {
                reason
            };
            return Err(GatewayError::Fetch(format!("{tool}: gateway returned {reason}")));
        }
        Ok(envelope.result)
    }

    pub(crate) async fn sessions(&self) -> Result<Vec<Session>, GatewayError> {
        let result = self.invoke("sessions_list", json!({})).await?;
        let raw = details_array(&result, "sessions", "sessions_list")?;

        let total = raw.len();
        let sessions: Vec<Session> = raw
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if sessions.len() < total {
            tracing::warn!(
                dropped = total - sessions.len(),
                "Dropped malformed sessions from sessions_list"
            );
        }
        Ok(sessions)
    }

    async fn history(&self, key: &str, limit: usize) -> Result<Vec<Value>, GatewayError> {
        let result = self
            .invoke(
                "sessions_history",
                json!({ "sessionKey": key, "limit": limit, "includeTools": true }),
            )
            .await?;
        check_details_denial(&result, "sessions_history")?;
        details_array(&result, "messages", "sessions_history")
    }

    /// History from the gateway, or the transcript file when the gateway
    /// won't show it.
    pub(crate) async fn transcript(
        &self,
        request: TranscriptRequest,
    ) -> Result<RawTranscript, GatewayError> {
        let reason = match self.history(&request.key, request.limit).await {
            Ok(records) => return Ok(RawTranscript::Records(records)),
            Err(GatewayError::AccessDenied(reason)) => reason,
            Err(err) => return Err(err),
        };

        let path = request.transcript_path.clone().or_else(|| {
            (!request.session_id.is_empty())
                .then(|| self.paths.transcript_file(&request.session_id))
        });
        let Some(path) = path else {
            return Err(GatewayError::AccessDenied(reason));
        };

        tracing::debug!(key = %request.key, path = %path.display(), "history denied, reading transcript file");
        match local::read_transcript(&path).await {
            Ok(text) => Ok(RawTranscript::File(text)),
            Err(err) => Err(GatewayError::AccessDenied(format!(
                "{reason}; transcript fallback failed: {err}"
            ))),
        }
    }

    pub(crate) async fn process_log(&self, name: &str, limit: usize) -> Result<String, GatewayError> {
        let result = self
            .invoke(
                "process",
                json!({ "action": "log", "sessionId": name, "limit": limit }),
            )
            .await?;
        let content = result
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::Parse("process log: missing content".to_string()))?;

        let text: String = content
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();
        Ok(strip_ansi(&text).into_owned())
    }

    pub(crate) async fn kill(&self, name: &str) -> Result<(), GatewayError> {
        self.invoke("process", json!({ "action": "kill", "sessionId": name }))
            .await
            .map(|_| ())
            .map_err(|err| GatewayError::Action {
                action: "kill",
                detail: err.to_string(),
            })
    }

    pub(crate) async fn health(&self) -> Result<Health, GatewayError> {
        let url = format!("{}/health", self.base_url);
        let started = Instant::now();
        let response = self.http.get(&url).send().await?;
        let duration_ms = started.elapsed().as_millis() as u64;
        Ok(Health {
            ok: response.status() == StatusCode::OK,
            duration_ms,
            checked_at: chrono::Utc::now().timestamp_millis(),
        })
    }
}
