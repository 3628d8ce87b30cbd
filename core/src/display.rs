//! Scrollable log/transcript buffer.
//!
//! The buffer owns the rendered text, its SHA-256 fingerprint, the wrapped
//! lines for the current viewport width, and the scroll/follow state. The
//! wrap cache is refreshed eagerly whenever content or width changes, so
//! readers never see a stale wrap and rendering needs only `&self`.

use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use clawdeck_types::ui::ScrollTo;

/// Rows of the log panel taken by the title and separator lines.
pub const LOG_CHROME_LINES: u16 = 2;

/// Inner size of the log panel, chrome included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct WrapCache {
    key: Option<([u8; 32], u16)>,
    lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    content: String,
    fingerprint: Option<[u8; 32]>,
    query: Option<String>,
    wrapped: WrapCache,
    scroll_offset: usize,
    follow: bool,
    viewport: Viewport,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self {
            content: String::new(),
            fingerprint: None,
            query: None,
            wrapped: WrapCache::default(),
            scroll_offset: 0,
            follow: true,
            viewport: Viewport::default(),
        }
    }
}

fn fingerprint(content: &str) -> [u8; 32] {
    Sha256::digest(content.as_bytes()).into()
}

impl DisplayBuffer {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Drop all content and return to following. Used when a new log source
    /// is selected.
    pub fn reset(&mut self) {
        *self = Self::new(self.viewport);
    }

    /// Replace the content.
    ///
    /// Returns `false` without touching any state when neither the content
    /// fingerprint nor the query changed.
    pub fn update(&mut self, content: String, query: Option<String>) -> bool {
        let new_fingerprint = fingerprint(&content);
        let query = query.filter(|q| !q.is_empty());
        if self.fingerprint == Some(new_fingerprint) {
            if self.query == query {
                return false;
            }
            // Same rows, one more or one fewer visible.
            self.query = query;
            self.scroll_offset = if self.follow {
                self.max_scroll()
            } else {
                self.scroll_offset.min(self.max_scroll())
            };
            return true;
        }

        let was_empty = self.content.is_empty();
        let old_total = self.wrapped.lines.len();
        let old_distance = self.max_scroll().saturating_sub(self.scroll_offset);

        self.content = content;
        self.fingerprint = Some(new_fingerprint);
        self.query = query;
        self.rewrap();

        let new_max = self.max_scroll();
        if self.follow {
            if was_empty || self.wrapped.lines.len() > old_total {
                self.scroll_offset = new_max;
            } else {
                self.scroll_offset = self.scroll_offset.min(new_max);
            }
        } else {
            self.scroll_offset = new_max.saturating_sub(old_distance);
        }
        true
    }

    /// Append text to the current content, e.g. a reply to a sent message.
    pub fn append(&mut self, text: &str) {
        let mut content = self.content.clone();
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(text);
        let query = self.query.clone();
        self.update(content, query);
    }

    /// Apply a new viewport size. Rewraps only if the width changed.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let width_changed = viewport.width != self.viewport.width;
        self.viewport = viewport;
        if width_changed {
            self.rewrap();
        }
        if self.follow {
            self.scroll_offset = self.max_scroll();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        }
    }

    /// Scroll towards the top. Always leaves follow mode.
    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Scroll towards the bottom; reaching the last line (with one line of
    /// slack) resumes following.
    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.max_scroll();
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max);
        if self.scroll_offset >= max.saturating_sub(1) {
            self.follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size());
    }

    /// Resolve an absolute scroll target against the current maximum.
    pub fn scroll_to(&mut self, target: ScrollTo) {
        let max = self.max_scroll();
        self.scroll_offset = match target {
            ScrollTo::Top => 0,
            ScrollTo::Bottom => max,
            ScrollTo::Line(line) => line.min(max),
        };
        self.follow = matches!(target, ScrollTo::Bottom);
    }

    /// Flip follow mode; turning it on jumps to the bottom.
    pub fn toggle_follow(&mut self) {
        if self.follow {
            self.follow = false;
        } else {
            self.scroll_to(ScrollTo::Bottom);
        }
    }

    /// Rows available for content after chrome and the query line.
    #[must_use]
    pub fn visible_height(&self) -> usize {
        let chrome = LOG_CHROME_LINES + u16::from(self.query.is_some());
        usize::from(self.viewport.height.saturating_sub(chrome)).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.visible_height()
    }

    #[must_use]
    pub fn max_scroll(&self) -> usize {
        self.wrapped.lines.len().saturating_sub(self.visible_height())
    }

    /// Wrapped lines currently inside the viewport.
    #[must_use]
    pub fn visible_lines(&self) -> &[String] {
        let total = self.wrapped.lines.len();
        let start = self.scroll_offset.min(total);
        let end = start.saturating_add(self.visible_height()).min(total);
        &self.wrapped.lines[start..end]
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn fingerprint(&self) -> Option<&[u8; 32]> {
        self.fingerprint.as_ref()
    }

    #[must_use]
    pub fn follow(&self) -> bool {
        self.follow
    }

    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.wrapped.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn rewrap(&mut self) {
        let key = self.fingerprint.map(|fp| (fp, self.viewport.width));
        if key.is_some() && key == self.wrapped.key {
            return;
        }
        self.wrapped = WrapCache {
            key,
            lines: wrap_lines(&self.content, self.viewport.width),
        };
    }
}

/// Split `content` into rows no wider than `width` terminal columns.
///
/// Each raw line yields at least one row; long lines are chunked in order.
/// Widths are measured per grapheme cluster, so emoji presentation
/// sequences count as two columns and are never split. A cluster wider than
/// the whole viewport gets a row of its own.
#[must_use]
pub fn wrap_lines(content: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();

    for line in content.lines() {
        let mut row = String::new();
        let mut row_width = 0;
        for grapheme in line.graphemes(true) {
            let w = grapheme.width();
            if row_width + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push_str(grapheme);
            row_width += w;
        }
        rows.push(row);
    }
    rows
}
