//! Grapheme-aware truncation for labels, queries and argument summaries.

use unicode_segmentation::UnicodeSegmentation;

/// Cut `raw` to at most `limit` grapheme clusters, ending in `marker` when
/// anything was removed. The marker is part of the limit.
#[must_use]
pub fn truncate_to_fit(raw: &str, limit: usize, marker: &str) -> String {
    if raw.graphemes(true).nth(limit).is_none() {
        return raw.to_string();
    }
    let keep = limit.saturating_sub(marker.graphemes(true).count());
    let end = raw
        .grapheme_indices(true)
        .nth(keep)
        .map_or(raw.len(), |(idx, _)| idx);
    let mut out = String::with_capacity(end + marker.len());
    out.push_str(&raw[..end]);
    out.push_str(marker);
    out
}

/// Trim, then cut to `limit` graphemes with a `...` marker. Limits below 3
/// are raised to 3 so the marker always fits.
#[must_use]
pub fn truncate_with_ellipsis(raw: &str, limit: usize) -> String {
    truncate_to_fit(raw.trim(), limit.max(3), "...")
}
