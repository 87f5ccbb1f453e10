use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::message::{Redaction, Role};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let error_height = if app.errors.is_empty() {
        0
    } else {
        (app.errors.len().min(3) + 2) as u16 // +2 for borders
    };

    let [main_area, error_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(3),
    ])
    .areas(area);

    let (chat_area, payload_area) = if app.show_payload_panel {
        let [chat, payload] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(main_area);
        (chat, Some(payload))
    } else {
        (main_area, None)
    };

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_chat(app, frame, chat_area);

    if let Some(payload_area) = payload_area {
        render_payload_panel(app, frame, payload_area);
    }

    if error_height > 0 {
        render_errors(app, frame, error_area);
    }

    render_input(app, frame, input_area);
}

fn role_label(role: Role) -> Line<'static> {
    match role {
        Role::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Role::Assistant => Line::from(Span::styled(
            "AI:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    }
}

fn render_chat(app: &App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Chat: {} ", app.client.endpoint()));

    let chat_text = if app.conversation.turns().is_empty() && !app.loading {
        Text::from(Span::styled(
            "Type a message. The backend redacts it before the model sees it.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);

        for turn in app.conversation.turns() {
            lines.push(role_label(turn.message.role));
            for line in turn.message.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            match &turn.redaction {
                Redaction::Pending => {
                    lines.push(Line::from(Span::styled(
                        format!("redacting{dots}"),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
                Redaction::Resolved(text) => {
                    lines.push(Line::from(Span::styled(
                        format!("redacted: {text}"),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            lines.push(Line::default());
        }

        if app.loading {
            lines.push(role_label(Role::Assistant));
            lines.push(Line::from(Span::styled(
                format!("Thinking{dots}"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_payload_panel(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Redaction Payloads (p to hide) ");

    if app.user_payload.is_empty() && app.assistant_payload.is_empty() {
        let placeholder = Paragraph::new(
            "No payloads yet.\nThe raw redaction responses for the latest turn appear here.",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        "user input",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    for line in app.user_payload.lines() {
        lines.push(Line::from(line.to_string()));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "model reply",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    for line in app.assistant_payload.lines() {
        lines.push(Line::from(line.to_string()));
    }

    let panel = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(block);

    frame.render_widget(panel, area);
}

fn render_errors(app: &App, frame: &mut Frame, area: Rect) {
    let error_lines: Vec<Line> = app
        .errors
        .iter()
        .take(3)
        .map(|error| Line::from(error.clone()))
        .collect();

    let errors = Paragraph::new(Text::from(error_lines))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" Errors ({}) (x to dismiss) ", app.errors.len())),
        );

    frame.render_widget(errors, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let (title, border_color) = if app.loading {
        (" Message (waiting for the backend) ", Color::DarkGray)
    } else if editing {
        (" Message (Enter to send, Esc to browse) ", Color::Yellow)
    } else {
        (" Message (i to edit) ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor while editing (the cursor disappears with the disabled
    // input while a request is in flight)
    if editing && !app.loading {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
