//! Records through normalization and the render pipeline.

use serde_json::json;

use clawdeck_core::{clean, compress, normalize_records, normalize_transcript, render_transcript};
use clawdeck_types::{CanonicalMessage, Role, Verbosity};

use crate::common::{assistant, tool_call, tool_result, user};

fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.trim().is_empty()).collect()
}

#[test]
fn tool_results_take_call_arguments_in_order() {
    let records = [
        tool_call("exec", json!({"command": "cargo fmt"})),
        tool_call("read", json!({"path": "/srv/app/src/main.rs"})),
        assistant("checking both"),
        tool_result("exec", "", false),
        user("hurry up"),
        tool_result("read", "fn main() {}", false),
    ];
    let normalized = normalize_records(&records);
    assert_eq!(normalized.skipped, 0);

    let results: Vec<&CanonicalMessage> = normalized
        .messages
        .iter()
        .filter(|m| m.role() == Role::ToolResult)
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_args(), Some("cargo fmt"));
    assert_eq!(results[1].tool_args(), Some("/srv/app/src/main.rs"));

    let rendered = render_transcript(&normalized.messages, Verbosity::Summary);
    let fmt_at = rendered.content.find("$ cargo fmt").unwrap();
    let read_at = rendered.content.find("read \u{2026}/src/main.rs").unwrap();
    assert!(fmt_at < read_at);
}

#[test]
fn verbosity_off_keeps_only_the_conversation() {
    let messages = [
        CanonicalMessage::user("list the files"),
        CanonicalMessage::tool_call(Some("exec".to_string()), Some("ls -la".to_string())),
        CanonicalMessage::tool_result(
            Some("exec".to_string()),
            Some("ls -la".to_string()),
            "Cargo.toml\nsrc",
            false,
        ),
        CanonicalMessage::assistant("Two entries.", Some("gpt-4o".to_string())),
    ];

    let rendered = render_transcript(&messages, Verbosity::Off);
    assert_eq!(non_blank_lines(&rendered.content), ["list the files", "Two entries."]);
    assert_eq!(rendered.query.as_deref(), Some("list the files"));

    let full = render_transcript(&messages, Verbosity::Full);
    assert!(full.content.contains("TOOL CALL (exec)"));
    assert!(full.content.contains("ls -la"));
    assert!(full.content.contains("Cargo.toml"));
}

#[test]
fn failed_tool_shows_error_preview_in_summary() {
    let records = [
        user("run the tests"),
        tool_call("exec", json!({"command": "cargo test"})),
        tool_result("exec", "error[E0425]: cannot find value `x`", true),
    ];
    let normalized = normalize_records(&records);
    let rendered = render_transcript(&normalized.messages, Verbosity::Summary);
    assert!(rendered.content.contains("\u{2717}"));
    assert!(rendered.content.contains("$ cargo test (failed)"));
    assert!(rendered.content.contains("   error[E0425]"));
}

#[test]
fn transcript_file_counts_malformed_lines() {
    let text = [
        json!({"type": "session", "id": "abc"}).to_string(),
        json!({"type": "message", "message": {"role": "user", "content": "hello"}}).to_string(),
        "{not json".to_string(),
        String::new(),
        json!({"type": "message", "message": {"content": "no role"}}).to_string(),
        json!({"type": "message", "message": {"role": "assistant", "content": [{"type": "text", "text": "hi"}]}}).to_string(),
    ]
    .join("\n");

    let normalized = normalize_transcript(&text);
    assert_eq!(normalized.messages.len(), 2);
    assert_eq!(normalized.skipped, 2);
}

#[test]
fn compression_is_idempotent_on_real_output() {
    let raw = "\u{2500}\u{2500}\u{2500} USER \u{2500}\u{2500}\u{2500}\r\n\r\nfix it\n\n\n\n\
               \u{2500}\u{2500}\u{2500} ASSISTANT (claude) \u{2500}\u{2500}\u{2500}\n\
               Now let me look at the config:\n\u{1b}[1mbold\u{1b}[0m claim\n\n\n \u{2713} done\n";
    let once = compress(&clean(raw));
    assert_eq!(compress(&once), once);
    assert!(!once.contains("USER"));
    assert!(!once.contains("Now let me"));
    assert!(!once.contains("\n\n\n"));
}

#[test]
fn clean_leaves_no_escape_bytes() {
    let inputs = [
        "\u{1b}[31mred\u{1b}[0m",
        "\u{1b}]0;window title\u{7}after",
        "\u{1b}]8;;https://example.com\u{1b}\\link\u{1b}]8;;\u{1b}\\",
        "\u{1b}[2J\u{1b}[H\u{1b}[?25lcursor",
        "trailing\u{1b}",
        "\u{1b}P1$r0m\u{1b}\\dcs",
    ];
    for input in inputs {
        let cleaned = clean(input);
        assert!(!cleaned.contains('\u{1b}'), "{input:?} -> {cleaned:?}");
    }
    assert_eq!(clean("\u{1b}]0;title\u{7}after"), "after");
}
