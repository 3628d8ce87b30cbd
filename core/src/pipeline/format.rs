//! Format stage: canonical messages to transcript text.

use clawdeck_types::{CanonicalMessage, Role, Verbosity};

/// Error lines shown under a failed tool in Summary mode.
const ERROR_PREVIEW_LINES: usize = 6;
const BANNER_RULE: &str = "\u{2500}\u{2500}\u{2500}";

/// Render messages as text at the given verbosity.
#[must_use]
pub fn format_messages(messages: &[CanonicalMessage], verbosity: Verbosity) -> String {
    let mut out = String::new();
    for msg in messages {
        match (msg.role(), verbosity) {
            (Role::ToolCall | Role::ToolResult, Verbosity::Off) | (Role::ToolCall, Verbosity::Summary) => {}
            (Role::ToolResult, Verbosity::Summary) => push_summary(&mut out, msg),
            _ => push_block(&mut out, msg),
        }
    }
    out
}

fn push_block(out: &mut String, msg: &CanonicalMessage) {
    let detail = match msg.role() {
        Role::User => None,
        Role::Assistant => msg.model(),
        Role::ToolCall | Role::ToolResult => Some(msg.tool_name().unwrap_or("tool")),
    };
    let failed = if msg.role() == Role::ToolResult && msg.tool_error() {
        " failed"
    } else {
        ""
    };
    match detail {
        Some(detail) => out.push_str(&format!(
            "{BANNER_RULE} {} ({detail}){failed} {BANNER_RULE}\n",
            msg.role().banner()
        )),
        None => out.push_str(&format!("{BANNER_RULE} {} {BANNER_RULE}\n", msg.role().banner())),
    }

    let body = match msg.role() {
        Role::ToolCall => msg.tool_args().unwrap_or_default(),
        _ => msg.text(),
    };
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push('\n');
}

fn push_summary(out: &mut String, msg: &CanonicalMessage) {
    let name = msg.tool_name().unwrap_or("tool");
    let status = if msg.tool_error() { '\u{2717}' } else { '\u{2713}' };
    let summary = tool_summary(name, msg.tool_args().unwrap_or_default(), msg.tool_error());
    out.push_str(&format!(" {status} {} {summary}\n", tool_glyph(name)));

    if msg.tool_error() && !msg.text().is_empty() {
        let mut lines = msg.text().lines();
        for line in lines.by_ref().take(ERROR_PREVIEW_LINES) {
            out.push_str("   ");
            out.push_str(line);
            out.push('\n');
        }
        if lines.next().is_some() {
            out.push_str("   \u{2026}\n");
        }
    }
}

/// One-line description of a tool invocation.
fn tool_summary(name: &str, args: &str, failed: bool) -> String {
    let with_subject = |verb: &str, subject: String| {
        if subject.is_empty() {
            verb.to_string()
        } else {
            format!("{verb} {subject}")
        }
    };

    match name.to_ascii_lowercase().as_str() {
        "read" | "file_read" => with_subject("read", shorten_path(args)),
        "write" | "file_write" => with_subject("write", shorten_path(args)),
        "edit" | "file_edit" => with_subject("edit", shorten_path(args)),
        "exec" | "bash" | "shell" => {
            let mut line = with_subject("$", args.to_string());
            if failed {
                line.push_str(" (failed)");
            }
            line
        }
        "web_search" | "search" => {
            if args.is_empty() {
                "search".to_string()
            } else {
                format!("search \"{args}\"")
            }
        }
        "web_fetch" | "fetch" => with_subject("fetch", args.to_string()),
        _ => {
            if args.is_empty() {
                name.to_string()
            } else {
                format!("{name}  {args}")
            }
        }
    }
}

/// Keep the last two components of a long path.
fn shorten_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() <= 2 {
        return path.to_string();
    }
    format!("\u{2026}/{}", parts[parts.len() - 2..].join("/"))
}

/// Glyph shown before a tool summary.
#[must_use]
pub fn tool_glyph(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "read" | "file_read" => "📖",
        "write" | "file_write" => "✍️",
        "edit" | "file_edit" => "✏️",
        "exec" | "bash" | "shell" => "🛠️",
        "web_search" | "search" => "🔎",
        "web_fetch" | "fetch" => "🌐",
        "browser" => "🖥️",
        "message" => "💬",
        "image" => "🖼️",
        "tts" => "🔊",
        "process" => "⚙️",
        "nodes" => "📱",
        "canvas" => "🎨",
        _ => "🔧",
    }
}
