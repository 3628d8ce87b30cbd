//! ANSI escape stripping for log and transcript text.
//!
//! Process logs arrive with terminal colour codes, cursor movement and the
//! occasional OSC title or hyperlink. None of it may reach the terminal we
//! draw into, so every escape sequence is removed wholesale. Plain control
//! characters such as tabs and newlines are left alone.

use std::borrow::Cow;
use std::iter::Peekable;

/// ASCII escape character that starts ANSI sequences.
const ESC: char = '\x1b';
/// ASCII bell character that can terminate OSC sequences.
const BEL: char = '\x07';
/// Single-character C1 equivalent of `ESC [`.
const C1_CSI: char = '\u{009b}';

/// Remove ANSI escape sequences (CSI, OSC, DCS and two-byte escapes).
///
/// Returns `Cow::Borrowed` when the input holds no escape introducer.
///
/// ```
/// use clawdeck_types::strip_ansi;
///
/// assert_eq!(strip_ansi("plain"), "plain");
/// assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
/// ```
#[must_use]
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    if !input.contains([ESC, C1_CSI]) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape_sequence(&mut chars),
            C1_CSI => skip_csi_params(&mut chars),
            _ => result.push(c),
        }
    }

    Cow::Owned(result)
}

/// Skip an escape sequence starting after ESC.
fn skip_escape_sequence<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    let Some(&next) = chars.peek() else {
        return;
    };

    match next {
        // CSI: ESC [ params final
        '[' => {
            chars.next();
            skip_csi_params(chars);
        }
        // OSC: ESC ] ... (BEL | ESC \)
        ']' => {
            chars.next();
            skip_osc_sequence(chars);
        }
        // DCS, PM, APC: ESC P/^/_ ... ST
        'P' | '^' | '_' => {
            chars.next();
            skip_until_st(chars);
        }
        // Charset and line attribute selectors take one argument byte.
        '(' | ')' | '*' | '+' | '#' | ' ' => {
            chars.next();
            chars.next_if(|c| *c != ESC);
        }
        // Anything else is a two-byte escape; a second ESC starts its own sequence.
        ESC => {}
        _ => {
            chars.next();
        }
    }
}

/// Skip CSI parameters until the final byte (0x40-0x7E).
fn skip_csi_params<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x40'..='\x7e').contains(&c) {
            chars.next();
            return;
        } else if ('\x20'..='\x3f').contains(&c) {
            chars.next();
        } else {
            return;
        }
    }
}

/// Skip an OSC body until BEL or ST (ESC \).
fn skip_osc_sequence<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}

fn skip_until_st<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
