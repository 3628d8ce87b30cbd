//! Canonical transcript messages.
//!
//! Raw gateway and transcript-file records come in several shapes. The
//! normalizer in `clawdeck-core` folds them into [`CanonicalMessage`], which is
//! the only message type the formatting pipeline understands.

use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    ToolCall,
    ToolResult,
}

impl Role {
    /// Upper-case label used in role banners.
    #[must_use]
    pub const fn banner(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::ToolCall => "TOOL CALL",
            Role::ToolResult => "TOOL RESULT",
        }
    }

    #[must_use]
    pub const fn is_tool(self) -> bool {
        matches!(self, Role::ToolCall | Role::ToolResult)
    }
}

/// A normalized transcript entry.
///
/// Built once by the normalizer and never mutated afterwards; the fields are
/// private and only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMessage {
    role: Role,
    model: Option<String>,
    text: String,
    tool_name: Option<String>,
    tool_args: Option<String>,
    tool_error: bool,
    timestamp: Option<i64>,
}

impl CanonicalMessage {
    fn new(role: Role, text: String) -> Self {
        Self {
            role,
            model: None,
            text,
            tool_name: None,
            tool_args: None,
            tool_error: false,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into())
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>, model: Option<String>) -> Self {
        Self {
            model,
            ..Self::new(Role::Assistant, text.into())
        }
    }

    #[must_use]
    pub fn tool_call(name: Option<String>, args: Option<String>) -> Self {
        Self {
            tool_name: name,
            tool_args: args,
            ..Self::new(Role::ToolCall, String::new())
        }
    }

    #[must_use]
    pub fn tool_result(
        name: Option<String>,
        args: Option<String>,
        text: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            tool_name: name,
            tool_args: args,
            tool_error: is_error,
            ..Self::new(Role::ToolResult, text.into())
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Option<i64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    #[must_use]
    pub fn tool_args(&self) -> Option<&str> {
        self.tool_args.as_deref()
    }

    #[must_use]
    pub fn tool_error(&self) -> bool {
        self.tool_error
    }

    /// Milliseconds since the Unix epoch, when the record carried one.
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

/// How much tool activity the transcript view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// One line per tool result.
    #[default]
    Summary,
    /// Every message with its full text.
    Full,
    /// Tool activity hidden.
    Off,
}

impl Verbosity {
    /// Cycle order: Summary, Full, Off.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Verbosity::Summary => Verbosity::Full,
            Verbosity::Full => Verbosity::Off,
            Verbosity::Off => Verbosity::Summary,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Verbosity::Summary => "summary",
            Verbosity::Full => "full",
            Verbosity::Off => "off",
        }
    }
}
