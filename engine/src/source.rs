//! What the log panel is showing.

use std::path::PathBuf;

use clawdeck_client::TranscriptRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// Live session history from the gateway.
    Session {
        name: String,
        request: TranscriptRequest,
    },
    /// Output of an exec process.
    Process { name: String },
    /// A transcript file with no active session.
    Archived {
        session_id: String,
        label: String,
        path: PathBuf,
    },
}

impl LogSource {
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            LogSource::Session { name, .. } | LogSource::Process { name } => name,
            LogSource::Archived { label, .. } => label,
        }
    }

    /// Transcripts are re-rendered from cached messages; process logs are
    /// plain text.
    #[must_use]
    pub fn is_transcript(&self) -> bool {
        !matches!(self, LogSource::Process { .. })
    }

    /// Session key for live sessions.
    #[must_use]
    pub fn session_key(&self) -> Option<&str> {
        match self {
            LogSource::Session { request, .. } => Some(&request.key),
            _ => None,
        }
    }
}
