use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use xinchao_core::ChatRole;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' {
            if chars.peek().map(|(_, c)| *c) == Some('*') {
                // Consume the second *
                chars.next();

                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }

                // Find closing **
                let mut bold_text = String::new();
                let mut found_close = false;

                while let Some((_, c)) = chars.next() {
                    if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
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
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            } else {
                current_text.push(c);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
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

    if app.panel_open {
        render_chat_panel(app, frame, body_area);
    } else {
        render_welcome(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let ready_badge = if app.ready {
        Span::styled("● sẵn sàng", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ đang tải trợ lý…", Style::default().fg(Color::Yellow))
    };

    let title = Line::from(vec![
        Span::styled(
            " Trợ lý du lịch Việt Nam ",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(format!("[{}] ", app.model), Style::default().fg(Color::Gray)),
        ready_badge,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Landing screen shown while the chat panel is closed
fn render_welcome(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Xin chào!",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("Bạn muốn biết gì về du lịch Việt Nam?"),
        Line::default(),
        Line::from(Span::styled("Ví dụ:", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            "“Ba ngày ở Hà Nội nên đi đâu?”",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "“Tháng 12 có nên đi Sapa không?”",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "“Đặc sản miền Tây là gì?”",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "💬 nhấn o để mở trợ lý",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];

    if !app.ready {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "(đang tải trợ lý…)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let welcome = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(welcome, area);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_messages(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_messages(app: &App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Hội thoại ");

    let chat_text = if app.messages.is_empty() && !app.loading {
        Text::from(Span::styled(
            "Hỏi bất cứ điều gì về du lịch Việt Nam...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.messages {
            match msg.role {
                ChatRole::User => {
                    lines.push(role_line("Bạn", msg.time_label(), Color::Cyan));
                    lines.push(Line::from(msg.content.as_str()));
                    lines.push(Line::default());
                }
                ChatRole::Assistant => {
                    lines.push(role_line("Trợ lý", msg.time_label(), Color::Yellow));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if app.loading {
            lines.push(Line::from(Span::styled(
                "Trợ lý:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Đang suy nghĩ{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
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

fn role_line(name: &str, time: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}:", name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
    ])
}

fn render_input(app: &App, frame: &mut Frame, input_area: Rect) {
    let (title, border_color) = if !app.ready {
        (" Đang tải trợ lý… ", Color::DarkGray)
    } else if app.loading {
        (" Đang trả lời… ", Color::DarkGray)
    } else if app.input_mode == InputMode::Editing {
        (" Câu hỏi (Enter để gửi) ", Color::Yellow)
    } else {
        (" Câu hỏi (nhấn i để nhập) ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor in view for long questions.
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
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

    let text_color = if app.input_enabled() {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(input, input_area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " DUYỆT ",
        InputMode::Editing => " NHẬP ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if !app.panel_open {
        vec![
            Span::styled(" o ", key_style),
            Span::styled(" mở trợ lý ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" thoát ", label_style),
        ]
    } else if app.input_mode == InputMode::Editing {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" gửi ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" xong ", label_style),
        ]
    } else {
        vec![
            Span::styled(" i ", key_style),
            Span::styled(" nhập câu hỏi ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" cuộn ", label_style),
            Span::styled(" o ", key_style),
            Span::styled(" đóng ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" thoát ", label_style),
        ]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}
