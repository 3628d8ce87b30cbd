//! Core domain logic for clawdeck.
//!
//! Everything between a raw gateway payload and the lines the renderer
//! draws: message normalization, the clean/compress/format pipeline, the
//! scrollable display buffer, and list filtering. No IO, no async.

mod display;
mod filter;
mod normalize;
mod pipeline;
pub mod present;

pub use display::{DisplayBuffer, LOG_CHROME_LINES, Viewport, wrap_lines};
pub use filter::{clamp_cursor, filter_archived, filter_processes, filter_sessions};
pub use normalize::{Normalized, normalize_records, normalize_transcript, summarize_args};
pub use pipeline::{
    Rendered, clean, compress, extract_query, format_messages, render_log, render_transcript,
    tool_glyph,
};
