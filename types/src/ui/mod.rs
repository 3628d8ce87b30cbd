//! UI state types for the TUI layer.
//!
//! Pure data types with no IO, no async, no ratatui dependency.
//! Used by both the engine (state ownership) and tui (rendering/input).

mod input;
mod scroll;
mod view;

pub use input::{DraftInput, InputMode, InteractionMode, MessageTarget, SpawnField, SpawnForm};
pub use scroll::ScrollTo;
pub use view::{Panel, SourceFilter, Tab, UiOptions};
