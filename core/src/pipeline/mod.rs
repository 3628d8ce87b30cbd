//! Transcript text pipeline: format, clean, compress.
//!
//! Transcripts go through all three stages; raw process logs are only
//! cleaned, since they carry no role banners or narration to compress.

mod clean;
mod compress;
mod format;
mod query;

pub use clean::clean;
pub use compress::compress;
pub use format::{format_messages, tool_glyph};
pub use query::extract_query;

use clawdeck_types::{CanonicalMessage, Verbosity};

/// Display-ready text plus the query line shown above it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub query: Option<String>,
}

/// Format, clean and compress a transcript.
///
/// The query is taken before compression, while the user banners it keys
/// off are still present.
#[must_use]
pub fn render_transcript(messages: &[CanonicalMessage], verbosity: Verbosity) -> Rendered {
    let cleaned = clean(&format_messages(messages, verbosity));
    let query = extract_query(&cleaned);
    Rendered {
        content: compress(&cleaned),
        query,
    }
}

/// Clean a raw process log.
#[must_use]
pub fn render_log(raw: &str) -> Rendered {
    let content = clean(raw);
    let query = extract_query(&content);
    Rendered { content, query }
}
