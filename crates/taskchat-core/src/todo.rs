//! Todo panel state
//!
//! The local list mirrors the backend's collection. Every network-bound
//! operation is split in two: a `begin_*` step that decides whether a request
//! goes out, and a `finish_*` step that applies the outcome to the list as it
//! is when the response arrives.

use tracing::{debug, warn};

use crate::error::BackendResult;
use crate::input::InputField;
use crate::state::{Todo, TodoId};

/// Orders load requests so an older response never overwrites a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct TodoPanel {
    todos: Vec<Todo>,
    input: InputField,
    issued_loads: u64,
    applied_load: Option<LoadTicket>,
}

impl TodoPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued_loads += 1;
        LoadTicket(self.issued_loads)
    }

    /// Returns whether the outcome replaced the list.
    pub fn finish_load(&mut self, ticket: LoadTicket, outcome: BackendResult<Vec<Todo>>) -> bool {
        if self.applied_load.is_some_and(|applied| ticket < applied) {
            debug!(?ticket, "discarding stale todo load");
            return false;
        }

        match outcome {
            Ok(todos) => {
                self.todos = todos;
                self.applied_load = Some(ticket);
                true
            }
            Err(e) => {
                warn!(error = %e, "Error fetching todos");
                false
            }
        }
    }

    /// Text to send for a new task, or `None` when the input is blank.
    pub fn begin_add(&self) -> Option<String> {
        if self.input.is_blank() {
            return None;
        }
        Some(self.input.text().to_string())
    }

    pub fn finish_add(&mut self, submitted: &str, outcome: BackendResult<Todo>) {
        match outcome {
            Ok(todo) => {
                self.todos.push(todo);
                self.input.clear();
            }
            Err(e) => {
                warn!(error = %e, task = submitted, "Error adding todo");
            }
        }
    }

    /// Returns whether an entry was removed.
    pub fn finish_delete(&mut self, id: &TodoId, outcome: BackendResult<()>) -> bool {
        if let Err(e) = outcome {
            warn!(error = %e, %id, "Error deleting todo");
            return false;
        }

        match self.todos.iter().position(|todo| &todo.id == id) {
            Some(idx) => {
                self.todos.remove(idx);
                true
            }
            None => false,
        }
    }
}
