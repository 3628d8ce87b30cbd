//! Clean stage: line endings, escape sequences, unsafe glyph ranges.

use clawdeck_types::strip_ansi;

/// Normalize line endings, strip ANSI escapes and remap glyph ranges that
/// misalign in terminals (box drawing, block elements, braille) to ASCII.
#[must_use]
pub fn clean(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    strip_ansi(&normalized).chars().map(remap).collect()
}

fn remap(c: char) -> char {
    match c {
        '\u{2500}'..='\u{257f}' => box_drawing(c),
        '\u{2580}'..='\u{259f}' => '#',
        '\u{2800}'..='\u{28ff}' => '.',
        _ => c,
    }
}

fn box_drawing(c: char) -> char {
    match c {
        // light/heavy/dashed/double horizontals and horizontal half-lines
        '\u{2500}' | '\u{2501}' | '\u{2504}' | '\u{2505}' | '\u{2508}' | '\u{2509}'
        | '\u{254c}' | '\u{254d}' | '\u{2550}' | '\u{2574}' | '\u{2576}' | '\u{2578}'
        | '\u{257a}' | '\u{257c}' | '\u{257e}' => '-',
        // the same for verticals
        '\u{2502}' | '\u{2503}' | '\u{2506}' | '\u{2507}' | '\u{250a}' | '\u{250b}'
        | '\u{254e}' | '\u{254f}' | '\u{2551}' | '\u{2575}' | '\u{2577}' | '\u{2579}'
        | '\u{257b}' | '\u{257d}' | '\u{257f}' => '|',
        _ => '+',
    }
}
