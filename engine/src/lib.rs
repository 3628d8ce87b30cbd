//! Control loop for clawdeck - state machine and orchestration.
//!
//! This crate owns the dashboard state without any terminal dependencies.
//! The TUI reads it through accessors and drives it through the Normal-mode
//! methods and the per-mode guards on [`App`].

mod app;
mod event;
mod poll;
mod source;

pub use app::{
    App, ConfirmMode, ConfirmModeAccess, DEFAULT_MODEL_LABEL, MessageMode, MessageModeAccess,
    SearchMode, SearchModeAccess, SpawnMode, SpawnModeAccess, StatusLine,
};
pub use event::AppEvent;
pub use poll::{PollKind, PollSchedule};
pub use source::LogSource;

pub use clawdeck_client::{
    Gateway, GatewayClient, GatewayError, GatewayFut, RawTranscript, SpawnRequest,
    TranscriptRequest,
};
pub use clawdeck_config::{OpenclawPaths, Overrides, PollIntervals, Settings, log_dir};
pub use clawdeck_core::{DisplayBuffer, LOG_CHROME_LINES, Viewport, present};
pub use clawdeck_types::ui::{
    DraftInput, InputMode, InteractionMode, MessageTarget, Panel, ScrollTo, SourceFilter,
    SpawnField, SpawnForm, Tab, UiOptions,
};
pub use clawdeck_types::{
    ArchivedRun, CanonicalMessage, Health, ModelOption, Process, Role, Session, SpawnResult,
    Verbosity,
};
