//! List filtering for the three tabs.

use clawdeck_types::ui::SourceFilter;
use clawdeck_types::{ArchivedRun, Process, Session};

fn matches_any(needle: &str, fields: &[&str]) -> bool {
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(needle))
}

/// Sessions whose key, model, kind, display name, label or channel contain
/// `needle` (case-insensitive) and whose channel passes `source`.
#[must_use]
pub fn filter_sessions<'a>(
    sessions: &'a [Session],
    needle: &str,
    source: SourceFilter,
) -> Vec<&'a Session> {
    let needle = needle.trim().to_lowercase();
    sessions
        .iter()
        .filter(|s| source.channel().is_none_or(|c| s.channel.eq_ignore_ascii_case(c)))
        .filter(|s| {
            matches_any(
                &needle,
                &[
                    s.key.as_str(),
                    s.model.as_str(),
                    s.kind.as_str(),
                    s.display_name.as_str(),
                    s.label.as_str(),
                    s.channel.as_str(),
                ],
            )
        })
        .collect()
}

#[must_use]
pub fn filter_processes<'a>(processes: &'a [Process], needle: &str) -> Vec<&'a Process> {
    let needle = needle.trim().to_lowercase();
    processes
        .iter()
        .filter(|p| matches_any(&needle, &[p.name.as_str(), p.command.as_str()]))
        .collect()
}

#[must_use]
pub fn filter_archived<'a>(runs: &'a [ArchivedRun], needle: &str) -> Vec<&'a ArchivedRun> {
    let needle = needle.trim().to_lowercase();
    runs.iter()
        .filter(|r| matches_any(&needle, &[r.label.as_str(), r.session_id.as_str()]))
        .collect()
}

/// Clamp a list cursor to `[0, len - 1]`; zero for an empty list.
#[must_use]
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}
