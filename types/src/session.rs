//! Gateway-facing records: sessions, processes, archived runs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An agent session as reported by `sessions_list`.
///
/// Every field is optional on the wire; missing values fall back to their
/// defaults so one sparse entry doesn't sink the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub key: String,
    pub kind: String,
    pub channel: String,
    pub display_name: String,
    pub label: String,
    pub model: String,
    /// Last activity, milliseconds since the Unix epoch.
    pub updated_at: i64,
    pub age_ms: i64,
    pub session_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub context_tokens: u64,
    pub transcript_path: String,
    pub system_sent: bool,
    pub aborted_last_run: bool,
    pub status: String,
    pub error_message: String,
}

impl Session {
    /// The root session spawns are attached to.
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.kind == "main" || self.key.ends_with(":main")
    }
}

/// A worker process running on behalf of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Process {
    #[serde(alias = "sessionName")]
    pub name: String,
    pub status: String,
    pub runtime: String,
    pub command: String,
}

/// A transcript file on disk with no matching active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedRun {
    pub session_id: String,
    pub label: String,
    pub size: u64,
    /// Modification time, milliseconds since the Unix epoch.
    pub modified_at: i64,
    pub path: PathBuf,
}

/// Result of one gateway health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub ok: bool,
    pub duration_ms: u64,
    /// When the probe finished, milliseconds since the Unix epoch.
    pub checked_at: i64,
}

/// A model the spawn form can offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub id: String,
    pub alias: Option<String>,
}

impl ModelOption {
    #[must_use]
    pub fn new(id: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            id: id.into(),
            alias: alias.filter(|a| !a.is_empty()),
        }
    }
}

impl fmt::Display for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}  ({alias})", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// Outcome of a successful spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnResult {
    pub session_id: Option<String>,
    pub label: Option<String>,
    pub model: Option<String>,
}
