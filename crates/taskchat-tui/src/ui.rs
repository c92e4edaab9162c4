use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use taskchat_core::{InputField, Sender};
use crate::app::{App, FocusPane, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else if found_close {
                // empty pair
                current_text.push_str("****");
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    spans
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [todo_area, chat_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(body_area);

    render_todo_panel(app, frame, todo_area);
    render_chat_panel(app, frame, chat_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Todo & Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.backend_url()), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    match (app.focus, app.input_mode) {
        (FocusPane::TodoInput, InputMode::Editing) => {
            hints.extend(hint("Enter", "add task"));
            hints.extend(hint("Esc", "stop typing"));
        }
        (FocusPane::ChatInput, InputMode::Editing) => {
            hints.extend(hint("Enter", "send"));
            hints.extend(hint("Esc", "stop typing"));
        }
        (FocusPane::TodoList, _) => {
            hints.extend(hint("j/k", "select"));
            hints.extend(hint("d", "delete"));
            hints.extend(hint("r", "reload"));
        }
        (FocusPane::Transcript, _) => {
            hints.extend(hint("j/k", "scroll"));
            hints.extend(hint("g/G", "top/bottom"));
        }
        (_, InputMode::Normal) => {
            hints.extend(hint("i", "edit"));
        }
    }
    hints.extend(hint("Tab", "focus"));
    if app.input_mode == InputMode::Normal {
        hints.extend(hint("a", "new task"));
        hints.extend(hint("/", "chat"));
        hints.extend(hint("q", "quit"));
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn border_color(focused: bool) -> Color {
    if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

fn render_todo_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.todo_area = Some(list_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::TodoList)))
        .title(format!(" Todo List ({}) ", app.todos.todos().len()));

    if app.todos.todos().is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No tasks yet. Press 'a' to add one.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = app
            .todos
            .todos()
            .iter()
            .map(|todo| {
                let marker = if todo.completed { "[x]" } else { "[ ]" };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", marker), Style::default().fg(Color::DarkGray)),
                    Span::raw(todo.task.clone()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, list_area, &mut app.todo_state);
    }

    render_input(
        frame,
        input_area,
        app.todos.input(),
        " Add a new task ",
        app.focus == FocusPane::TodoInput,
        app.input_mode == InputMode::Editing,
    );
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let [transcript_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store area and inner size for mouse hit-testing and scroll calculations
    app.chat_area = Some(transcript_area);
    app.chat_height = transcript_area.height.saturating_sub(2);
    app.chat_width = transcript_area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app.focus == FocusPane::Transcript)))
        .title(" Chatbot ");

    let transcript = if app.chat.transcript().is_empty() {
        Text::from(Span::styled(
            "Ask a question...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.chat.transcript() {
            let label_style = match msg.sender {
                Sender::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Sender::Bot => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            };
            let mut label = Some(Span::styled(format!("{}: ", msg.sender.label()), label_style));

            let mut text_lines = msg.text.lines().peekable();
            if text_lines.peek().is_none() {
                lines.extend(label.take().map(Line::from));
            }
            for text_line in text_lines {
                let mut spans: Vec<Span> = label.take().into_iter().collect();
                match msg.sender {
                    Sender::User => spans.push(Span::raw(text_line.to_string())),
                    Sender::Bot => spans.extend(parse_markdown_line(text_line)),
                }
                lines.push(Line::from(spans));
            }
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(transcript)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, transcript_area);

    render_input(
        frame,
        input_area,
        app.chat.input(),
        " Ask a question ",
        app.focus == FocusPane::ChatInput,
        app.input_mode == InputMode::Editing,
    );
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    input: &InputField,
    title: &str,
    focused: bool,
    editing: bool,
) {
    let border = if focused && editing {
        Color::Yellow
    } else {
        border_color(focused)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title.to_string());

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(paragraph, area);

    // Show cursor when editing
    if focused && editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
