//! Interaction modes and their field state.

use unicode_segmentation::UnicodeSegmentation;

/// Payload-free projection of [`InteractionMode`], used for key dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Searching,
    Messaging,
    Spawning,
    Confirming,
}

/// Single-line text field with grapheme-aware cursor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DraftInput {
    text: String,
    cursor: usize,
}

impl DraftInput {
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut draft = Self::default();
        draft.set_text(text.into());
        draft
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index_at(self.cursor);
        self.text.insert(index, new_char);
        self.move_cursor_right();
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.move_cursor_left();
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.grapheme_count();
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.min(self.grapheme_count())
    }
}

/// Session a message is being composed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTarget {
    /// Gateway session key, used to refetch the transcript after sending.
    pub key: String,
    /// Agent session id passed to `openclaw agent --session-id`.
    pub session_id: String,
    pub name: String,
}

/// Spawn form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnField {
    #[default]
    Prompt,
    Model,
    Label,
}

impl SpawnField {
    pub const ALL: [Self; 3] = [Self::Prompt, Self::Model, Self::Label];

    /// Next field, wrapping from Label back to Prompt.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Prompt => Self::Model,
            Self::Model => Self::Label,
            Self::Label => Self::Prompt,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prompt => "Prompt",
            Self::Model => "Model",
            Self::Label => "Label",
        }
    }
}

/// State of the spawn form.
///
/// `model_index` 0 is the "(default)" choice; index `n > 0` refers to the
/// `n - 1`th configured model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnForm {
    pub prompt: DraftInput,
    pub label: DraftInput,
    pub model_index: usize,
    pub focus: SpawnField,
    pub error: Option<String>,
}

impl SpawnForm {
    /// Move the model selector by `delta`, wrapping within `option_count`
    /// entries (the "(default)" entry included).
    pub fn cycle_model(&mut self, delta: isize, option_count: usize) {
        if option_count == 0 {
            self.model_index = 0;
            return;
        }
        let len = option_count as isize;
        let next = (self.model_index as isize + delta).rem_euclid(len);
        self.model_index = next as usize;
    }

    /// Text field that currently owns typed characters, if any.
    pub fn focused_field_mut(&mut self) -> Option<&mut DraftInput> {
        match self.focus {
            SpawnField::Prompt => Some(&mut self.prompt),
            SpawnField::Label => Some(&mut self.label),
            SpawnField::Model => None,
        }
    }
}

/// The one mode that currently owns keyboard input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Normal,
    Searching {
        field: DraftInput,
    },
    Messaging {
        target: MessageTarget,
        field: DraftInput,
    },
    Spawning(SpawnForm),
    Confirming {
        /// Process name the kill applies to.
        target: String,
    },
}

impl InteractionMode {
    #[must_use]
    pub fn mode(&self) -> InputMode {
        match self {
            InteractionMode::Normal => InputMode::Normal,
            InteractionMode::Searching { .. } => InputMode::Searching,
            InteractionMode::Messaging { .. } => InputMode::Messaging,
            InteractionMode::Spawning(_) => InputMode::Spawning,
            InteractionMode::Confirming { .. } => InputMode::Confirming,
        }
    }

    #[must_use]
    pub fn searching(initial: &str) -> Self {
        InteractionMode::Searching {
            field: DraftInput::with_text(initial),
        }
    }

    #[must_use]
    pub fn messaging(target: MessageTarget) -> Self {
        InteractionMode::Messaging {
            target,
            field: DraftInput::default(),
        }
    }

    #[must_use]
    pub fn spawning() -> Self {
        InteractionMode::Spawning(SpawnForm::default())
    }

    #[must_use]
    pub fn confirming(target: impl Into<String>) -> Self {
        InteractionMode::Confirming {
            target: target.into(),
        }
    }
}
