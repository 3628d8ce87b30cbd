//! Borrow-scoped guards for mode-specific operations.
//!
//! Each guard exists only while the app is in its mode, so an operation for
//! one mode can never run while another owns the keyboard.

use std::mem;

use clawdeck_client::SpawnRequest;
use clawdeck_types::ui::{DraftInput, InteractionMode, SpawnField};

use super::App;

pub struct SearchMode<'a> {
    app: &'a mut App,
}

pub struct MessageMode<'a> {
    app: &'a mut App,
}

pub struct SpawnMode<'a> {
    app: &'a mut App,
}

pub struct ConfirmMode<'a> {
    app: &'a mut App,
}

pub enum SearchModeAccess<'a> {
    InSearch(SearchMode<'a>),
    NotSearch,
}

pub enum MessageModeAccess<'a> {
    InMessage(MessageMode<'a>),
    NotMessage,
}

pub enum SpawnModeAccess<'a> {
    InSpawn(SpawnMode<'a>),
    NotSpawn,
}

pub enum ConfirmModeAccess<'a> {
    InConfirm(ConfirmMode<'a>),
    NotConfirm,
}

impl App {
    pub fn search_mode_mut(&mut self) -> SearchModeAccess<'_> {
        match &self.view.mode {
            InteractionMode::Searching { .. } => SearchModeAccess::InSearch(SearchMode { app: self }),
            _ => SearchModeAccess::NotSearch,
        }
    }

    pub fn message_mode_mut(&mut self) -> MessageModeAccess<'_> {
        match &self.view.mode {
            InteractionMode::Messaging { .. } => {
                MessageModeAccess::InMessage(MessageMode { app: self })
            }
            _ => MessageModeAccess::NotMessage,
        }
    }

    pub fn spawn_mode_mut(&mut self) -> SpawnModeAccess<'_> {
        match &self.view.mode {
            InteractionMode::Spawning(_) => SpawnModeAccess::InSpawn(SpawnMode { app: self }),
            _ => SpawnModeAccess::NotSpawn,
        }
    }

    pub fn confirm_mode_mut(&mut self) -> ConfirmModeAccess<'_> {
        match &self.view.mode {
            InteractionMode::Confirming { .. } => {
                ConfirmModeAccess::InConfirm(ConfirmMode { app: self })
            }
            _ => ConfirmModeAccess::NotConfirm,
        }
    }
}

/// Field edits shared by the text-entry modes.
trait FieldEdit {
    fn field_mut(&mut self) -> Option<&mut DraftInput>;
    fn after_edit(&mut self) {}

    fn edit(&mut self, op: impl FnOnce(&mut DraftInput)) {
        if let Some(field) = self.field_mut() {
            op(field);
            self.after_edit();
        }
    }
}

impl FieldEdit for SearchMode<'_> {
    fn field_mut(&mut self) -> Option<&mut DraftInput> {
        match &mut self.app.view.mode {
            InteractionMode::Searching { field } => Some(field),
            _ => None,
        }
    }

    // The list narrows as you type.
    fn after_edit(&mut self) {
        if let InteractionMode::Searching { field } = &self.app.view.mode {
            self.app.view.filter = field.text().to_string();
        }
        self.app.clamp_cursors();
    }
}

impl FieldEdit for MessageMode<'_> {
    fn field_mut(&mut self) -> Option<&mut DraftInput> {
        match &mut self.app.view.mode {
            InteractionMode::Messaging { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl FieldEdit for SpawnMode<'_> {
    fn field_mut(&mut self) -> Option<&mut DraftInput> {
        match &mut self.app.view.mode {
            InteractionMode::Spawning(form) => form.focused_field_mut(),
            _ => None,
        }
    }
}

macro_rules! field_edit_methods {
    ($($mode:ident),*) => {$(
        impl $mode<'_> {
            pub fn enter_char(&mut self, c: char) {
                self.edit(|field| field.enter_char(c));
            }

            pub fn delete_char(&mut self) {
                self.edit(DraftInput::delete_char);
            }

            pub fn move_cursor_left(&mut self) {
                self.edit(DraftInput::move_cursor_left);
            }

            pub fn move_cursor_right(&mut self) {
                self.edit(DraftInput::move_cursor_right);
            }

            pub fn clear_line(&mut self) {
                self.edit(DraftInput::clear);
            }
        }
    )*};
}

field_edit_methods!(SearchMode, MessageMode, SpawnMode);

impl SearchMode<'_> {
    /// Enter: keep the typed filter and return to Normal.
    pub fn commit(self) {
        if let InteractionMode::Searching { field } =
            mem::replace(&mut self.app.view.mode, InteractionMode::Normal)
        {
            self.app.view.filter = field.text().trim().to_string();
        }
        self.app.clamp_cursors();
    }

    /// Escape: clear the filter and return to Normal.
    pub fn cancel(self) {
        self.app.view.mode = InteractionMode::Normal;
        self.app.view.filter.clear();
        self.app.clamp_cursors();
    }
}

impl MessageMode<'_> {
    /// Enter: send the draft. An empty draft just closes the prompt.
    /// Returns whether a message went out.
    pub fn submit(self) -> bool {
        let InteractionMode::Messaging { target, field } =
            mem::replace(&mut self.app.view.mode, InteractionMode::Normal)
        else {
            return false;
        };
        let text = field.text().trim();
        if text.is_empty() {
            return false;
        }
        let text = text.to_string();
        tracing::debug!(session = %target.session_id, "sending message");
        self.app.send_message(target, text);
        true
    }

    /// Escape: drop the draft.
    pub fn cancel(self) {
        self.app.view.mode = InteractionMode::Normal;
    }
}

impl SpawnMode<'_> {
    /// Tab: next field, wrapping.
    pub fn next_field(&mut self) {
        if let InteractionMode::Spawning(form) = &mut self.app.view.mode {
            form.focus = form.focus.next();
        }
    }

    /// Up/Down on the model field; ignored elsewhere.
    pub fn cycle_model(&mut self, delta: isize) {
        let options = self.app.data.models.len() + 1;
        if let InteractionMode::Spawning(form) = &mut self.app.view.mode
            && form.focus == SpawnField::Model
        {
            form.cycle_model(delta, options);
        }
    }

    #[must_use]
    pub fn focus(&self) -> Option<SpawnField> {
        match &self.app.view.mode {
            InteractionMode::Spawning(form) => Some(form.focus),
            _ => None,
        }
    }

    /// Enter: validate and spawn. On a validation failure the form stays
    /// open with its error set. Returns whether a spawn was started.
    pub fn submit(self) -> bool {
        let root = self.app.main_session().map(|s| s.session_id.clone());
        let model = {
            let InteractionMode::Spawning(form) = &self.app.view.mode else {
                return false;
            };
            form.model_index
                .checked_sub(1)
                .and_then(|i| self.app.data.models.get(i))
                .map(|m| m.id.clone())
        };

        let InteractionMode::Spawning(form) = &mut self.app.view.mode else {
            return false;
        };
        let prompt = form.prompt.text().trim().to_string();
        if prompt.is_empty() {
            form.error = Some("prompt is required".to_string());
            return false;
        }
        let Some(root_session_id) = root else {
            form.error = Some("no main session found".to_string());
            return false;
        };
        let label = form.label.text().trim().to_string();

        let request = SpawnRequest {
            root_session_id,
            prompt,
            model,
            label: (!label.is_empty()).then_some(label),
        };
        self.app.view.mode = InteractionMode::Normal;
        self.app.spawn_session(request);
        true
    }

    /// Escape: discard the form.
    pub fn cancel(self) {
        self.app.view.mode = InteractionMode::Normal;
    }
}

impl ConfirmMode<'_> {
    /// `y`: kill the target.
    pub fn confirm(self) {
        if let InteractionMode::Confirming { target } =
            mem::replace(&mut self.app.view.mode, InteractionMode::Normal)
        {
            tracing::debug!(process = %target, "killing process");
            self.app.kill_process(target);
        }
    }

    /// `n` or Escape.
    pub fn cancel(self) {
        self.app.view.mode = InteractionMode::Normal;
    }
}
