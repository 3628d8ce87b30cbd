//! The `openclaw agent` CLI: sending into a session and spawning new ones.

use std::path::Path;

use serde_json::Value;
use tokio::process::Command;

use clawdeck_types::SpawnResult;

use crate::{AGENT_TIMEOUT, GatewayError, SpawnRequest};

async fn run_agent(
    program: &Path,
    action: &'static str,
    args: &[&str],
) -> Result<String, GatewayError> {
    tracing::debug!(action, program = %program.display(), "running openclaw agent");
    let run = Command::new(program)
        .arg("agent")
        .args(args)
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(AGENT_TIMEOUT, run)
        .await
        .map_err(|_| GatewayError::Action {
            action,
            detail: format!("timed out after {}s", AGENT_TIMEOUT.as_secs()),
        })?
        .map_err(|err| GatewayError::Action {
            action,
            detail: format!("{}: {err}", program.display()),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        return Err(GatewayError::Action {
            action,
            detail: combined.trim().to_string(),
        });
    }
    Ok(combined)
}

pub(crate) async fn send_message(
    program: &Path,
    session_id: &str,
    text: &str,
) -> Result<String, GatewayError> {
    let output = run_agent(
        program,
        "send",
        &["--session-id", session_id, "--message", text, "--json"],
    )
    .await?;
    Ok(parse_reply(&output))
}

pub(crate) async fn spawn_session(
    program: &Path,
    request: &SpawnRequest,
) -> Result<SpawnResult, GatewayError> {
    let mut args = vec!["--message", request.prompt.as_str(), "--json"];
    if let Some(model) = request.model.as_deref() {
        args.extend(["--model", model]);
    }
    if let Some(label) = request.label.as_deref() {
        args.extend(["--session-id", label]);
    }
    tracing::debug!(root = %request.root_session_id, "spawning session");

    let output = run_agent(program, "spawn", &args).await?;
    Ok(parse_spawn_output(&output, request))
}

/// Reply text from `--json` output; the raw output if it isn't JSON.
#[must_use]
pub fn parse_reply(output: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(output.trim()) else {
        return output.trim().to_string();
    };
    for field in ["reply", "text"] {
        if let Some(text) = value.get(field).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    let payloads: Vec<&str> = value
        .pointer("/result/payloads")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if payloads.is_empty() {
        output.trim().to_string()
    } else {
        payloads.join("\n")
    }
}

#[must_use]
pub fn parse_spawn_output(output: &str, request: &SpawnRequest) -> SpawnResult {
    let session_id = serde_json::from_str::<Value>(output.trim())
        .ok()
        .and_then(|value| {
            ["sessionId", "session"]
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_str))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        });
    SpawnResult {
        session_id,
        label: request.label.clone(),
        model: request.model.clone(),
    }
}
