//! Transcript files under `~/.openclaw/agents/main/sessions`.

use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde_json::Value;

use clawdeck_types::{ArchivedRun, truncate_with_ellipsis};

use crate::GatewayError;

const LABEL_MAX: usize = 60;

pub(crate) async fn read_transcript(path: &Path) -> Result<String, GatewayError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| GatewayError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Every `*.jsonl` in `dir` whose stem is not an active session id, newest
/// first. A missing directory yields an empty list.
pub fn scan_archived_runs(
    dir: &Path,
    active_ids: &HashSet<String>,
) -> Result<Vec<ArchivedRun>, GatewayError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(GatewayError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut runs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if active_ids.contains(session_id) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }

        let modified_at = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_millis() as i64);
        let label = transcript_label(&path).unwrap_or_else(|| session_id.to_string());

        runs.push(ArchivedRun {
            session_id: session_id.to_string(),
            label,
            size: meta.len(),
            modified_at,
            path: path.clone(),
        });
    }

    runs.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(runs)
}

/// First line of the first user text in a transcript, capped at 60 chars.
#[must_use]
pub fn transcript_label(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<Value>(&line).ok())
        .find_map(|record| first_user_text(&record))
        .map(|text| {
            let first = text.lines().next().unwrap_or_default();
            truncate_with_ellipsis(first, LABEL_MAX)
        })
        .filter(|label| !label.is_empty())
}

fn first_user_text(record: &Value) -> Option<String> {
    let message = record
        .get("message")
        .filter(|m| m.get("role").is_some())
        .unwrap_or(record);
    if message.get("role").and_then(Value::as_str) != Some("user") {
        return None;
    }
    match message.get("content")? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .find(|t| !t.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}
