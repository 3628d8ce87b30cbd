//! Scroll requests for the log view.

/// Absolute scroll target, resolved against the current maximum offset at
/// the moment it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTo {
    Top,
    Bottom,
    /// Wrapped-line offset from the top; clamped on resolve.
    Line(usize),
}
