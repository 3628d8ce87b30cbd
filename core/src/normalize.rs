//! Raw transcript records to [`CanonicalMessage`]s.
//!
//! Two sources feed this module: the `sessions_history` gateway tool, which
//! returns flat `{role, content, toolName, isError}` records, and `.jsonl`
//! transcript files, where each line wraps the same fields in a `message`
//! object next to a `type` discriminator. Both go through one [`Normalizer`].
//!
//! Tool calls are queued as they are emitted and handed out to tool results
//! strictly in arrival order. Nothing matches on call ids.

use std::collections::VecDeque;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use clawdeck_types::{CanonicalMessage, truncate_to_fit};

/// Argument keys worth showing, most informative first.
const ARG_PRIORITY: [&str; 7] = ["command", "file_path", "path", "query", "url", "action", "tool"];
/// Per-value cap for argument summaries.
const ARG_VALUE_MAX: usize = 50;

/// Output of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub messages: Vec<CanonicalMessage>,
    /// Records dropped because they could not be parsed or had no role.
    pub skipped: usize,
}

/// Normalize records returned by the history API.
#[must_use]
pub fn normalize_records(records: &[Value]) -> Normalized {
    let mut normalizer = Normalizer::default();
    for record in records {
        normalizer.push_value(record);
    }
    normalizer.finish()
}

/// Normalize a newline-delimited transcript file.
///
/// Blank lines are ignored. Lines that are not JSON count as skipped.
#[must_use]
pub fn normalize_transcript(text: &str) -> Normalized {
    let mut normalizer = Normalizer::default();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => normalizer.push_value(&value),
            Err(_) => normalizer.skipped += 1,
        }
    }
    normalizer.finish()
}

/// Short human summary of a tool's argument object.
///
/// Values for the priority keys are joined with spaces; if none are present
/// the first value is used. Each value is capped at 50 characters. Some
/// providers send arguments as a JSON-encoded string, which is decoded first.
#[must_use]
pub fn summarize_args(args: &Value) -> Option<String> {
    let map = match args {
        Value::Object(map) => map,
        Value::String(s) => {
            return match serde_json::from_str::<Value>(s) {
                Ok(decoded @ Value::Object(_)) => summarize_args(&decoded),
                _ => non_empty(truncate_to_fit(s.trim(), ARG_VALUE_MAX, "...")),
            };
        }
        _ => return None,
    };

    let parts: Vec<String> = ARG_PRIORITY
        .iter()
        .filter_map(|key| map.get(*key))
        .map(value_summary)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        return map.values().next().map(value_summary).and_then(non_empty);
    }
    Some(parts.join(" "))
}

fn value_summary(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate_to_fit(&raw, ARG_VALUE_MAX, "...")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<RawContent>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default, alias = "tool_name")]
    tool_name: Option<String>,
    #[serde(default, alias = "is_error")]
    is_error: bool,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    message: Option<Box<RawRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<Value>,
    #[serde(default)]
    input: Option<Value>,
    /// Body of an embedded `tool_result` block.
    #[serde(default)]
    content: Option<Value>,
    #[serde(default, alias = "is_error")]
    is_error: bool,
}

impl RawBlock {
    fn is_text(&self) -> bool {
        self.kind == "text"
    }

    fn is_tool_call(&self) -> bool {
        matches!(self.kind.as_str(), "toolCall" | "tool_use" | "toolUse")
    }

    fn is_tool_result(&self) -> bool {
        matches!(self.kind.as_str(), "toolResult" | "tool_result")
    }
}

/// Logical fields of a record after unwrapping a transcript `message`.
struct Flat {
    role: String,
    blocks: Vec<RawBlock>,
    model: Option<String>,
    tool_name: Option<String>,
    is_error: bool,
    timestamp: Option<i64>,
    own_args: Option<Value>,
}

enum Parsed {
    Record(Flat),
    /// Valid but not a message (session headers, model changes, ...).
    Ignored,
    Malformed,
}

impl RawRecord {
    fn flatten(self) -> Parsed {
        if !self.kind.is_empty() && self.kind != "message" {
            return Parsed::Ignored;
        }
        let RawRecord {
            role,
            content,
            model,
            tool_name,
            is_error,
            timestamp,
            args,
            input,
            message,
            ..
        } = self;

        let flat = match message {
            Some(inner) => {
                let inner = *inner;
                Flat {
                    role: if inner.role.is_empty() { role } else { inner.role },
                    blocks: blocks_of(inner.content.or(content)),
                    model: inner.model.or(model),
                    tool_name: inner.tool_name.or(tool_name),
                    is_error: inner.is_error || is_error,
                    timestamp: parse_timestamp(inner.timestamp.as_ref())
                        .or_else(|| parse_timestamp(timestamp.as_ref())),
                    own_args: inner.args.or(inner.input).or(args).or(input),
                }
            }
            None => Flat {
                role,
                blocks: blocks_of(content),
                model,
                tool_name,
                is_error,
                timestamp: parse_timestamp(timestamp.as_ref()),
                own_args: args.or(input),
            },
        };

        if flat.role.is_empty() {
            Parsed::Malformed
        } else {
            Parsed::Record(flat)
        }
    }
}

fn blocks_of(content: Option<RawContent>) -> Vec<RawBlock> {
    match content {
        Some(RawContent::Blocks(blocks)) => blocks,
        Some(RawContent::Text(text)) => vec![RawBlock {
            kind: "text".to_string(),
            text: Some(text),
            name: None,
            arguments: None,
            input: None,
            content: None,
            is_error: false,
        }],
        None => Vec::new(),
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

fn join_text<'a>(blocks: impl IntoIterator<Item = &'a RawBlock>) -> String {
    let mut text = String::new();
    for block in blocks {
        let Some(part) = block.text.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(part);
    }
    text
}

/// Text of a `tool_result` block body, which may be a string or nested blocks.
fn nested_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

enum RecordKind {
    User,
    Assistant,
    ToolCall,
    ToolResult,
}

fn classify(role: &str) -> RecordKind {
    match role {
        "assistant" => RecordKind::Assistant,
        "toolResult" | "tool_result" | "tool" => RecordKind::ToolResult,
        "toolUse" | "toolCall" | "tool_use" => RecordKind::ToolCall,
        _ => RecordKind::User,
    }
}

#[derive(Debug)]
struct PendingCall {
    name: Option<String>,
    args: Option<String>,
}

#[derive(Default)]
struct Normalizer {
    messages: Vec<CanonicalMessage>,
    pending: VecDeque<PendingCall>,
    skipped: usize,
}

impl Normalizer {
    fn push_value(&mut self, value: &Value) {
        let Ok(record) = RawRecord::deserialize(value) else {
            self.skipped += 1;
            return;
        };
        match record.flatten() {
            Parsed::Record(flat) => self.push(flat),
            Parsed::Ignored => {}
            Parsed::Malformed => self.skipped += 1,
        }
    }

    fn push(&mut self, flat: Flat) {
        match classify(&flat.role) {
            RecordKind::Assistant => self.push_assistant(flat),
            RecordKind::ToolCall => {
                let args = flat.own_args.as_ref().and_then(summarize_args);
                self.emit_call(flat.tool_name, args, flat.timestamp);
            }
            RecordKind::ToolResult => {
                let text = join_text(&flat.blocks);
                let own_args = flat.own_args.as_ref().and_then(summarize_args);
                self.emit_result(flat.tool_name, own_args, text, flat.is_error, flat.timestamp);
            }
            RecordKind::User => self.push_user(flat),
        }
    }

    fn push_assistant(&mut self, flat: Flat) {
        let mut emitted_calls = false;
        for block in flat.blocks.iter().filter(|b| b.is_tool_call()) {
            let args = block
                .arguments
                .as_ref()
                .or(block.input.as_ref())
                .and_then(summarize_args);
            self.emit_call(block.name.clone(), args, flat.timestamp);
            emitted_calls = true;
        }

        let text = join_text(flat.blocks.iter().filter(|b| b.is_text()));
        if !text.is_empty() || !emitted_calls {
            self.messages.push(
                CanonicalMessage::assistant(text, flat.model).with_timestamp(flat.timestamp),
            );
        }
    }

    fn push_user(&mut self, flat: Flat) {
        // Anthropic-style transcripts return tool output inside user turns.
        for block in flat.blocks.iter().filter(|b| b.is_tool_result()) {
            let text = nested_text(block.content.as_ref());
            self.emit_result(None, None, text, block.is_error, flat.timestamp);
        }

        let text = join_text(flat.blocks.iter().filter(|b| b.is_text()));
        if !text.is_empty() {
            self.messages
                .push(CanonicalMessage::user(text).with_timestamp(flat.timestamp));
        }
    }

    fn emit_call(&mut self, name: Option<String>, args: Option<String>, timestamp: Option<i64>) {
        self.pending.push_back(PendingCall {
            name: name.clone(),
            args: args.clone(),
        });
        self.messages
            .push(CanonicalMessage::tool_call(name, args).with_timestamp(timestamp));
    }

    fn emit_result(
        &mut self,
        name: Option<String>,
        own_args: Option<String>,
        text: String,
        is_error: bool,
        timestamp: Option<i64>,
    ) {
        let (name, args) = match self.pending.pop_front() {
            Some(call) => (name.or(call.name), call.args.or(own_args)),
            None => (name, own_args),
        };
        self.messages.push(
            CanonicalMessage::tool_result(name, args, text, is_error).with_timestamp(timestamp),
        );
    }

    fn finish(self) -> Normalized {
        Normalized {
            messages: self.messages,
            skipped: self.skipped,
        }
    }
}
