use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Backend(result) => app.apply(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

/// Move focus to the next pane, editing straight away if it is an input
fn cycle_focus(app: &mut App) {
    app.focus = app.focus.next();
    app.input_mode = if app.focus.is_input() {
        InputMode::Editing
    } else {
        InputMode::Normal
    };
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => cycle_focus(app),

        // Jump straight into either input
        KeyCode::Char('a') => {
            app.focus = FocusPane::TodoInput;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('/') => {
            app.focus = FocusPane::ChatInput;
            app.input_mode = InputMode::Editing;
        }

        _ => match app.focus {
            FocusPane::TodoList => handle_todo_list(app, key),
            FocusPane::Transcript => handle_transcript(app, key),
            FocusPane::TodoInput | FocusPane::ChatInput => {
                if matches!(key.code, KeyCode::Char('i') | KeyCode::Enter) {
                    app.input_mode = InputMode::Editing;
                }
            }
        },
    }
}

fn handle_todo_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.todo_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.todo_nav_up(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_todo(),
        KeyCode::Char('r') => app.load_todos(),
        KeyCode::Char('i') | KeyCode::Enter => {
            app.focus = FocusPane::TodoInput;
            app.input_mode = InputMode::Editing;
        }
        _ => {}
    }
}

fn handle_transcript(app: &mut App, key: KeyEvent) {
    let half_page = (app.chat_height / 2).max(1);
    match key.code {
        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(half_page);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(half_page);
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Tab => {
            cycle_focus(app);
            return;
        }
        KeyCode::Enter => {
            match app.focus {
                FocusPane::TodoInput => app.submit_todo(),
                FocusPane::ChatInput => app.send_chat(),
                _ => {}
            }
            return;
        }
        _ => {}
    }

    let input = match app.focus {
        FocusPane::TodoInput => app.todos.input_mut(),
        FocusPane::ChatInput => app.chat.input_mut(),
        FocusPane::TodoList | FocusPane::Transcript => {
            app.input_mode = InputMode::Normal;
            return;
        }
    };

    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Position-based scrolling
    let in_todos = app.todo_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_todos {
                app.todo_nav_down();
            } else if in_chat {
                app.scroll_chat_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_todos {
                app.todo_nav_up();
            } else if in_chat {
                app.scroll_chat_up(3);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::BackendEvent;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use taskchat_core::{BackendClient, Config, Todo, TodoId};
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(&Config::new(), BackendClient::new("http://127.0.0.1:8000"), tx);
        (app, rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_tab_enters_editing_on_inputs_only() {
        let (mut app, _rx) = test_app();
        assert_eq!(app.focus, FocusPane::TodoList);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::TodoInput);
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::ChatInput);
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusPane::Transcript);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_typing_goes_to_focused_input() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "hey");

        assert_eq!(app.todos.input().text(), "mil");
        assert_eq!(app.chat.input().text(), "hey");
    }

    #[test]
    fn test_q_types_while_editing_but_quits_otherwise() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.chat.input().text(), "q");

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('/'));
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(key)).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_enter_on_blank_chat_adds_nothing() {
        let (mut app, _rx) = test_app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.chat.transcript().is_empty());
    }

    #[test]
    fn test_backend_events_are_applied() {
        let (mut app, _rx) = test_app();
        let ticket = app.todos.begin_load();
        let event = BackendEvent::TodosLoaded {
            ticket,
            outcome: Ok(vec![Todo {
                id: TodoId::Int(1),
                task: "Buy milk".to_string(),
                completed: false,
            }]),
        };
        handle_event(&mut app, AppEvent::Backend(event)).unwrap();
        assert_eq!(app.todos.todos().len(), 1);
    }

    #[test]
    fn test_transcript_scroll_keys() {
        let (mut app, _rx) = test_app();
        app.focus = FocusPane::Transcript;
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.chat_scroll, 2);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.chat_scroll, 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.chat_scroll, 0);
    }
}
