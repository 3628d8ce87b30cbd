//! Core domain types for clawdeck.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod message;
mod sanitize;
mod session;
mod text;
pub mod ui;

pub use message::{CanonicalMessage, Role, Verbosity};
pub use sanitize::strip_ansi;
pub use session::{ArchivedRun, Health, ModelOption, Process, Session, SpawnResult};
pub use text::{truncate_to_fit, truncate_with_ellipsis};
