//! Display buffer scrolling against rendered content.

use clawdeck_core::{DisplayBuffer, LOG_CHROME_LINES, Viewport, wrap_lines};
use clawdeck_engine::ScrollTo;

/// A buffer with `rows` content rows visible and no query line.
fn buffer(width: u16, rows: u16) -> DisplayBuffer {
    DisplayBuffer::new(Viewport {
        width,
        height: rows + LOG_CHROME_LINES,
    })
}

fn numbered(n: usize) -> String {
    (1..=n).map(|i| format!("entry {i}\n")).collect()
}

#[test]
fn long_line_wraps_to_viewport_width() {
    let line = "x".repeat(200);
    assert_eq!(wrap_lines(&line, 40).len(), 5);

    let mut log = buffer(40, 10);
    log.update(line, None);
    assert_eq!(log.total_lines(), 5);
    assert_eq!(log.max_scroll(), 0);
}

#[test]
fn following_pins_to_bottom_as_content_grows() {
    let mut log = buffer(80, 10);
    for n in [4, 12, 30, 31] {
        assert!(log.update(numbered(n), None));
        assert_eq!(log.scroll_offset(), n.saturating_sub(10));
        assert_eq!(log.visible_lines().last().map(String::as_str), Some(format!("entry {n}").as_str()));
    }
}

#[test]
fn paused_view_keeps_its_distance_from_the_bottom() {
    let mut log = buffer(80, 10);
    log.update(numbered(50), None);
    log.scroll_up(15);
    assert!(!log.follow());

    let before_max = log.max_scroll();
    let before = log.scroll_offset();
    let first_visible = log.visible_lines()[0].clone();

    log.update(numbered(70), None);
    let after_max = log.max_scroll();
    assert_eq!(log.scroll_offset(), after_max.saturating_sub(before_max - before));
    assert_ne!(log.visible_lines()[0], first_visible);
    assert!(!log.follow());

    // The anchor is the distance from the bottom, even at the top.
    log.scroll_to(ScrollTo::Top);
    log.update(numbered(71), None);
    assert_eq!(log.scroll_offset(), 1);
}

#[test]
fn identical_content_changes_nothing() {
    let mut log = buffer(80, 10);
    log.update(numbered(40), Some("why".to_string()));
    log.scroll_up(5);
    let offset = log.scroll_offset();
    let fingerprint = *log.fingerprint().unwrap();

    assert!(!log.update(numbered(40), Some("why".to_string())));
    assert_eq!(log.scroll_offset(), offset);
    assert_eq!(log.fingerprint(), Some(&fingerprint));
    assert!(!log.follow());
}

#[test]
fn query_line_takes_a_row() {
    let mut log = buffer(80, 10);
    log.update(numbered(30), None);
    assert_eq!(log.visible_height(), 10);
    log.update(numbered(31), Some("deploy".to_string()));
    assert_eq!(log.visible_height(), 9);
    assert_eq!(log.visible_lines().len(), 9);
    assert_eq!(log.scroll_offset(), 31 - 9);
}

#[test]
fn scrolling_back_to_the_end_resumes_following() {
    let mut log = buffer(80, 10);
    log.update(numbered(40), None);
    log.page_up();
    assert!(!log.follow());
    log.page_down();
    assert!(log.follow());

    log.update(numbered(45), None);
    assert_eq!(log.scroll_offset(), 35);
}

#[test]
fn narrowing_the_viewport_rewraps_and_stays_pinned() {
    let mut log = buffer(80, 10);
    log.update(format!("{}\n{}", "y".repeat(60), numbered(12)), None);
    assert_eq!(log.total_lines(), 13);

    log.resize(Viewport {
        width: 30,
        height: 10 + LOG_CHROME_LINES,
    });
    assert_eq!(log.total_lines(), 14);
    assert_eq!(log.scroll_offset(), log.max_scroll());
}
