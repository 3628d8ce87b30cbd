//! Current-query extraction.

const USER_MARKERS: [&str; 3] = ["USER", "user:", "[user]"];
const QUERY_MAX: usize = 200;

/// Find the first user-message marker and return the query it introduces.
///
/// The query is the next non-empty line after the marker, unless that line
/// is itself a banner; otherwise the text after the first `:` on the marker
/// line.
#[must_use]
pub fn extract_query(formatted: &str) -> Option<String> {
    let mut lines = formatted.lines();
    let marker = lines
        .by_ref()
        .find(|line| USER_MARKERS.iter().any(|m| line.contains(m)))?;

    let next = lines.map(str::trim).find(|line| !line.is_empty());
    if let Some(next) = next.filter(|line| !is_banner(line)) {
        return Some(clawdeck_types::truncate_with_ellipsis(next, QUERY_MAX));
    }

    marker
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .map(|rest| clawdeck_types::truncate_with_ellipsis(rest, QUERY_MAX))
}

fn is_banner(line: &str) -> bool {
    line.starts_with("---") || line.starts_with('\u{2500}') || line.starts_with('\u{2014}')
}
