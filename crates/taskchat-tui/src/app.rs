use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use taskchat_core::{BackendClient, ChatPanel, Config, TodoPanel};
use tokio::sync::mpsc;
use tracing::debug;

use crate::tui::{AppEvent, BackendEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    TodoList,
    TodoInput,
    ChatInput,
    Transcript,
}

impl FocusPane {
    /// Tab order: todo list -> todo input -> chat input -> transcript
    pub fn next(self) -> Self {
        match self {
            FocusPane::TodoList => FocusPane::TodoInput,
            FocusPane::TodoInput => FocusPane::ChatInput,
            FocusPane::ChatInput => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::TodoList,
        }
    }

    pub fn is_input(self) -> bool {
        matches!(self, FocusPane::TodoInput | FocusPane::ChatInput)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Panels
    pub todos: TodoPanel,
    pub chat: ChatPanel,

    // Todo list selection
    pub todo_state: ListState,

    // Transcript scrolling
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Layout areas for mouse hit-testing
    pub todo_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    backend: BackendClient,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, backend: BackendClient, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::TodoList,
            todos: TodoPanel::new(),
            chat: ChatPanel::new(config.fallback_reply()),
            todo_state: ListState::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            todo_area: None,
            chat_area: None,
            backend,
            events,
        }
    }

    pub fn backend_url(&self) -> &str {
        self.backend.base_url()
    }

    /// Fetch the full todo collection in the background
    pub fn load_todos(&mut self) {
        let ticket = self.todos.begin_load();
        let backend = self.backend.clone();
        self.spawn(async move {
            let outcome = backend.list_todos().await;
            BackendEvent::TodosLoaded { ticket, outcome }
        });
    }

    pub fn submit_todo(&mut self) {
        let Some(submitted) = self.todos.begin_add() else {
            return;
        };
        let backend = self.backend.clone();
        self.spawn(async move {
            let outcome = backend.create_todo(&submitted).await;
            BackendEvent::TodoAdded { submitted, outcome }
        });
    }

    pub fn delete_selected_todo(&mut self) {
        let Some(todo) = self
            .todo_state
            .selected()
            .and_then(|i| self.todos.todos().get(i))
        else {
            return;
        };
        let id = todo.id.clone();
        let backend = self.backend.clone();
        self.spawn(async move {
            let outcome = backend.delete_todo(&id).await;
            BackendEvent::TodoDeleted { id, outcome }
        });
    }

    pub fn send_chat(&mut self) {
        let Some(outgoing) = self.chat.begin_send() else {
            return;
        };
        self.scroll_chat_to_bottom();
        let backend = self.backend.clone();
        self.spawn(async move {
            let outcome = backend.chat(&outgoing.text).await;
            BackendEvent::ChatReplied { outgoing, outcome }
        });
    }

    /// Apply a completed backend call to the owning panel
    pub fn apply(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::TodosLoaded { ticket, outcome } => {
                self.todos.finish_load(ticket, outcome);
                self.clamp_todo_selection();
            }
            BackendEvent::TodoAdded { submitted, outcome } => {
                self.todos.finish_add(&submitted, outcome);
                self.clamp_todo_selection();
            }
            BackendEvent::TodoDeleted { id, outcome } => {
                self.todos.finish_delete(&id, outcome);
                self.clamp_todo_selection();
            }
            BackendEvent::ChatReplied { outgoing, outcome } => {
                self.chat.finish_send(&outgoing, outcome);
                self.scroll_chat_to_bottom();
            }
        }
    }

    fn spawn<F>(&self, request: F)
    where
        F: std::future::Future<Output = BackendEvent> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let event = request.await;
            if tx.send(AppEvent::Backend(event)).is_err() {
                debug!("event loop gone, dropping backend result");
            }
        });
    }

    // Todo list navigation
    pub fn todo_nav_down(&mut self) {
        let len = self.todos.todos().len();
        if len > 0 {
            let i = self.todo_state.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.todo_state.select(Some(i));
        }
    }

    pub fn todo_nav_up(&mut self) {
        if !self.todos.todos().is_empty() {
            let i = self.todo_state.selected().unwrap_or(0);
            self.todo_state.select(Some(i.saturating_sub(1)));
        }
    }

    fn clamp_todo_selection(&mut self) {
        let len = self.todos.todos().len();
        match self.todo_state.selected() {
            _ if len == 0 => self.todo_state.select(None),
            Some(i) if i >= len => self.todo_state.select(Some(len - 1)),
            None => self.todo_state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Scroll the transcript so the newest message is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.chat.transcript() {
            // "You: " / "Bot: " shares the first line with the text
            let mut prefix = msg.sender.label().chars().count() + 2;
            let mut lines = msg.text.lines().peekable();
            if lines.peek().is_none() {
                total_lines = total_lines.saturating_add(1);
            }
            for line in lines {
                let char_count = prefix + line.chars().count();
                total_lines = total_lines.saturating_add(((char_count / wrap_width) + 1) as u16);
                prefix = 0;
            }
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskchat_core::{ChatMessage, Todo, TodoId};

    /// App pointed at a port nobody listens on
    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (tx, rx) = mpsc::unbounded_channel();
        let backend = BackendClient::new(&format!("http://127.0.0.1:{}", port));
        (App::new(&Config::new(), backend, tx), rx)
    }

    fn todo(id: i64, task: &str) -> Todo {
        Todo {
            id: TodoId::Int(id),
            task: task.to_string(),
            completed: false,
        }
    }

    #[test]
    fn test_focus_cycles_through_all_panes() {
        let mut focus = FocusPane::TodoList;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, FocusPane::TodoList);
        assert!(FocusPane::TodoList.next().is_input());
        assert!(!FocusPane::Transcript.is_input());
    }

    #[test]
    fn test_load_result_selects_first_todo() {
        let (mut app, _rx) = test_app();
        let ticket = app.todos.begin_load();
        app.apply(BackendEvent::TodosLoaded {
            ticket,
            outcome: Ok(vec![todo(1, "a"), todo(2, "b")]),
        });
        assert_eq!(app.todo_state.selected(), Some(0));

        app.todo_nav_down();
        app.todo_nav_down();
        assert_eq!(app.todo_state.selected(), Some(1));
        app.todo_nav_up();
        assert_eq!(app.todo_state.selected(), Some(0));
    }

    #[test]
    fn test_deleting_last_entry_moves_selection_up() {
        let (mut app, _rx) = test_app();
        let ticket = app.todos.begin_load();
        app.apply(BackendEvent::TodosLoaded {
            ticket,
            outcome: Ok(vec![todo(1, "a"), todo(2, "b")]),
        });
        app.todo_state.select(Some(1));

        app.apply(BackendEvent::TodoDeleted {
            id: TodoId::Int(2),
            outcome: Ok(()),
        });
        assert_eq!(app.todo_state.selected(), Some(0));

        app.apply(BackendEvent::TodoDeleted {
            id: TodoId::Int(1),
            outcome: Ok(()),
        });
        assert_eq!(app.todo_state.selected(), None);
    }

    #[tokio::test]
    async fn test_blank_submissions_spawn_nothing() {
        let (mut app, mut rx) = test_app();
        app.todos.input_mut().set("  ");
        app.chat.input_mut().set("");
        app.submit_todo();
        app.send_chat();
        app.delete_selected_todo();

        drop(app);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_chat_against_dead_backend_reports_fallback() {
        let (mut app, mut rx) = test_app();
        app.chat.input_mut().set("Hello");
        app.send_chat();
        assert_eq!(app.chat.transcript(), &[ChatMessage::user("Hello")]);

        let Some(AppEvent::Backend(event)) = rx.recv().await else {
            panic!("expected a backend event");
        };
        app.apply(event);

        assert_eq!(
            app.chat.transcript().last(),
            Some(&ChatMessage::bot("Sorry, I couldn't find an answer."))
        );
        assert_eq!(app.chat.input().text(), "");
    }

    #[test]
    fn test_scroll_to_bottom_with_short_transcript_stays_at_top() {
        let (mut app, _rx) = test_app();
        app.chat_height = 10;
        app.chat_width = 40;
        app.chat_scroll = 5;
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 0);
    }
}
