//! Presentation helpers for list rows: names, status, model aliases, sizes.

use std::time::Duration;

use clawdeck_types::{Session, truncate_to_fit};

/// Sessions with activity this recent still count as running.
const ACTIVE_WINDOW: Duration = Duration::from_secs(5 * 60);

const MODEL_ALIASES: [(&str, &str); 17] = [
    ("claude-opus-4-6", "opus"),
    ("claude-opus-4", "opus"),
    ("claude-sonnet-4", "sonnet"),
    ("claude-3-5-sonnet", "sonnet-3.5"),
    ("claude-3-5-haiku", "haiku-3.5"),
    ("claude-3-haiku", "haiku"),
    ("kimi-coding/k2p5", "k2p5"),
    ("gpt-4o-mini", "4o-mini"),
    ("gpt-4o", "4o"),
    ("o1-mini", "o1-mini"),
    ("o1", "o1"),
    ("o3-mini", "o3-mini"),
    ("o3", "o3"),
    ("gemini-2.5-pro", "gem-pro"),
    ("gemini-2.5-flash", "gem-flash"),
    ("deepseek-chat", "ds-chat"),
    ("deepseek-reasoner", "ds-r1"),
];

/// Coarse lifecycle of a session, inferred from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Idle,
    Completed,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Idle => "idle",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

/// Label, display name, `kind#abcd`, or the first 20 characters of the key.
#[must_use]
pub fn display_name(session: &Session) -> String {
    if !session.label.is_empty() {
        return session.label.clone();
    }
    if !session.display_name.is_empty() {
        return session.display_name.clone();
    }
    if !session.kind.is_empty() && !session.channel.is_empty() {
        let id = &session.session_id;
        let tail: String = id.chars().skip(id.chars().count().saturating_sub(4)).collect();
        return format!("{}#{tail}", session.kind);
    }
    session.key.chars().take(20).collect()
}

/// Explicit status fields win; otherwise a session is running if it saw
/// activity in the last five minutes. `now_ms` is the current Unix time in
/// milliseconds.
#[must_use]
pub fn session_status(session: &Session, now_ms: i64) -> SessionStatus {
    let status = session.status.as_str();
    if !session.error_message.is_empty() || matches!(status, "failed" | "error") {
        return SessionStatus::Failed;
    }
    if matches!(status, "completed" | "done") {
        return SessionStatus::Completed;
    }
    if session.aborted_last_run {
        return SessionStatus::Failed;
    }

    let age_ms = if session.age_ms > 0 {
        session.age_ms
    } else if session.updated_at > 0 {
        now_ms.saturating_sub(session.updated_at).max(0)
    } else {
        0
    };
    if Duration::from_millis(age_ms as u64) < ACTIVE_WINDOW {
        SessionStatus::Running
    } else {
        SessionStatus::Idle
    }
}

/// Short alias for a model id, e.g. `anthropic/claude-opus-4` -> `opus`.
#[must_use]
pub fn model_alias(model: &str) -> String {
    if let Some((_, alias)) = MODEL_ALIASES.iter().find(|(id, _)| *id == model) {
        return (*alias).to_string();
    }
    let by_suffix = MODEL_ALIASES
        .iter()
        .find(|(id, _)| id.len() > 5 && model.len() > id.len() && model.ends_with(id));
    let by_substring = || {
        MODEL_ALIASES
            .iter()
            .find(|(id, _)| id.len() > 8 && model.contains(id))
    };
    if let Some((_, alias)) = by_suffix.or_else(by_substring) {
        return (*alias).to_string();
    }

    let short = model
        .rsplit(['/', ':'])
        .find(|part| !part.is_empty())
        .unwrap_or(model);
    short.chars().take(12).collect()
}

/// `42s`, `7m`, `3h`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3600)
    }
}

/// `950`, `12.3k`, `1.2M`.
#[must_use]
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1000 {
        format!("{:.1}k", tokens as f64 / 1000.0)
    } else {
        tokens.to_string()
    }
}

/// `512B`, `3.4K`, `1.2M`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1}M", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}B")
    }
}

/// Fit a list row into `width` columns with a trailing ellipsis.
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    truncate_to_fit(text, width, "\u{2026}")
}
