use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use ragchat::{Message, Origin};

use crate::app::{App, ServiceStatus};

const SEND_BUTTON_WIDTH: u16 = 14;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input row, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, status_color) = match app.service_status {
        ServiceStatus::Checking => ("checking", Color::Gray),
        ServiceStatus::Online => ("online", Color::Green),
        ServiceStatus::Unreachable => ("unreachable", Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" RAG Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(format!("[{}]", status_text), Style::default().fg(status_color)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Stored for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let busy = app.exchange.is_busy();
    let text = if app.exchange.transcript().is_empty() && !busy {
        Text::from(Span::styled(
            "Ask a question to get started.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(chat_lines(app.exchange.transcript().messages(), busy, app.animation_frame))
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    let total = app.transcript_line_count();
    if total > app.chat_height {
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(app.chat_height) as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

/// User lines hug the right edge, agent lines the left
pub fn chat_lines(messages: &[Message], busy: bool, animation_frame: u8) -> Vec<Line<'_>> {
    let mut lines: Vec<Line> = Vec::new();

    for msg in messages {
        let (label, color, alignment) = match msg.origin() {
            Origin::User => ("You", Color::Cyan, Alignment::Right),
            Origin::Agent => ("Assistant", Color::Yellow, Alignment::Left),
        };
        lines.push(
            Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );
        for body in msg.text().lines() {
            lines.push(Line::from(body).alignment(alignment));
        }
        lines.push(Line::default());
    }

    if busy {
        lines.push(Line::from(Span::styled(
            "Assistant",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let [field_area, button_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);

    let busy = app.exchange.is_busy();
    let draft = app.exchange.draft();
    let border_color = if busy { Color::DarkGray } else { Color::Yellow };

    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ");

    // Keep the cursor visible by scrolling the field horizontally
    let inner_width = field_area.width.saturating_sub(2) as usize;
    let cursor = draft.cursor();
    let scroll_offset = if inner_width > 0 && cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let field = if draft.text().is_empty() {
        Paragraph::new("Ask a question...").style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = draft
            .text()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        let fg = if busy { Color::DarkGray } else { Color::Cyan };
        Paragraph::new(visible).style(Style::default().fg(fg))
    };
    frame.render_widget(field.block(field_block), field_area);

    let (label, button_style) = if busy {
        ("Sending...", Style::default().fg(Color::Gray).bg(Color::DarkGray))
    } else {
        ("Send", Style::default().fg(Color::White).bg(Color::Blue).bold())
    };
    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(button_style)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border_color)));
    frame.render_widget(button, button_area);

    if !busy {
        let cursor_x = (cursor - scroll_offset) as u16;
        frame.set_cursor_position((field_area.x + cursor_x + 1, field_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.exchange.is_busy() {
        " Waiting for answer... | ↑↓ PgUp/PgDn scroll | Esc quit "
    } else {
        " Enter send | ↑↓ PgUp/PgDn scroll | Ctrl+L new session | Esc quit "
    };
    let footer = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}
