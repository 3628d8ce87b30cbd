//! Files owned by the OpenClaw installation under `~/.openclaw`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use clawdeck_types::ModelOption;

use crate::ConfigError;

/// Locations inside an OpenClaw home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenclawPaths {
    root: PathBuf,
}

impl Default for OpenclawPaths {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        Self::new(home.join(".openclaw"))
    }
}

impl OpenclawPaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `openclaw.json`: gateway auth and agent model defaults.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join("openclaw.json")
    }

    /// Directory of `<sessionId>.jsonl` transcripts for the main agent.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("agents").join("main").join("sessions")
    }

    /// Transcript file for a session id.
    #[must_use]
    pub fn transcript_file(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{session_id}.jsonl"))
    }

    /// Snapshot of exec processes written by the gateway.
    #[must_use]
    pub fn process_list(&self) -> PathBuf {
        self.root.join("process-list.json")
    }
}

/// Parse `openclaw.json`. `Ok(None)` when it doesn't exist.
pub fn read_openclaw_json(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// `gateway.auth.token`.
#[must_use]
pub fn openclaw_token(config: &Value) -> Option<String> {
    config
        .pointer("/gateway/auth/token")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Models configured for agents, in preference order: the primary model,
/// its fallbacks, then any other entry in `agents.defaults.models`.
/// Duplicates keep their first position. Aliases come from the models map.
#[must_use]
pub fn configured_models(config: &Value) -> Vec<ModelOption> {
    let defaults = config.pointer("/agents/defaults");
    let model = defaults.and_then(|d| d.get("model"));
    let models = defaults
        .and_then(|d| d.get("models"))
        .and_then(Value::as_object);

    let alias_of = |id: &str| {
        models
            .and_then(|m| m.get(id))
            .and_then(|entry| entry.get("alias"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    };

    match model {
        // `"model": "provider/name"` is shorthand for a bare primary.
        Some(Value::String(primary)) => push(primary.as_str()),
        Some(model) => {
            if let Some(primary) = model.get("primary").and_then(Value::as_str) {
                push(primary);
            }
            for fallback in model
                .get("fallbacks")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
            {
                push(fallback);
            }
        }
        None => {}
    }
    for id in models.into_iter().flat_map(|m| m.keys()) {
        push(id.as_str());
    }

    ids.into_iter()
        .map(|id| {
            let alias = alias_of(&id);
            ModelOption::new(id, alias)
        })
        .collect()
}
