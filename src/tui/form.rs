//! Add/edit form for the terminal user interface.
//!
//! The same three-field form backs both task creation and editing; which one
//! a submit performs is decided by whether a task id is currently marked as
//! being edited.

use crate::clock::to_input_string;
use crate::task::Task;
use crate::tui::input::InputField;

/// Field order in the form.
pub const TITLE_FIELD: usize = 0;
pub const START_FIELD: usize = 1;
pub const DUE_FIELD: usize = 2;
const FIELD_COUNT: usize = 3;

/// Form state for creating or editing a task.
pub struct TaskForm {
    pub title: InputField,
    pub start: InputField,
    pub due: InputField,
    pub current_field: usize,
}

impl TaskForm {
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            start: InputField::new(),
            due: InputField::new(),
            current_field: TITLE_FIELD,
        };
        form.update_active_field();
        form
    }

    /// Prefill the form from an existing task, converting timestamps to
    /// local-time input strings.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self {
            title: InputField::with_value(&task.title),
            start: InputField::with_value(&to_input_string(task.start_time)),
            due: InputField::with_value(&to_input_string(task.due_time)),
            current_field: TITLE_FIELD,
        };
        form.update_active_field();
        form
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_FIELD;
        self.start.active = self.current_field == START_FIELD;
        self.due.active = self.current_field == DUE_FIELD;
    }

    fn current(&mut self) -> &mut InputField {
        match self.current_field {
            START_FIELD => &mut self.start,
            DUE_FIELD => &mut self.due,
            _ => &mut self.title,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        self.current().handle_char(c);
    }

    pub fn handle_backspace(&mut self) {
        self.current().handle_backspace();
    }

    pub fn handle_delete(&mut self) {
        self.current().handle_delete();
    }

    pub fn handle_left(&mut self) {
        self.current().move_cursor_left();
    }

    pub fn handle_right(&mut self) {
        self.current().move_cursor_right();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_cycling_wraps() {
        let mut form = TaskForm::new();
        assert!(form.title.active);
        form.next_field();
        assert!(form.start.active);
        form.next_field();
        assert!(form.due.active);
        form.next_field();
        assert!(form.title.active);
        form.prev_field();
        assert!(form.due.active);
    }

    #[test]
    fn from_task_prefills_input_strings() {
        let task = Task {
            id: 7,
            title: "review notes".to_string(),
            start_time: 0,
            due_time: 0,
            completion_time: None,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.title.value, "review notes");
        // Timestamps render as datetime-local style strings.
        assert_eq!(form.start.value.len(), "1970-01-01T00:00".len());
        assert!(form.start.value.contains('T'));
    }
}
