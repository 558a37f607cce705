use chatpane_core::{
    transcript::{WELCOME_BODY, WELCOME_TITLE},
    ChatRole, Entry, CLEAR_PROMPT,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// The input box grows with its content up to this many lines
const MAX_INPUT_LINES: usize = 8;

/// Style `**bold**` and `` `code` `` spans in a line of assistant output.
/// Unclosed markers are kept as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Earliest marker that has a non-empty closing counterpart
        let found = ["**", "`"]
            .iter()
            .filter_map(|marker| {
                let start = rest.find(marker)?;
                let after = &rest[start + marker.len()..];
                let len = after.find(marker)?;
                (len > 0).then_some((start, *marker, len))
            })
            .min_by_key(|(start, _, _)| *start);

        let Some((start, marker, len)) = found else {
            spans.push(Span::raw(rest.to_string()));
            break;
        };

        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        let inner_start = start + marker.len();
        let inner = &rest[inner_start..inner_start + len];
        let style = if marker == "**" {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        spans.push(Span::styled(inner.to_string(), style));
        rest = &rest[inner_start + len + marker.len()..];
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_lines = app.view().input_line_count().clamp(1, MAX_INPUT_LINES) as u16;

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.confirm_clear {
        render_confirm_clear(frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" chatpane ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.server_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in app.view().transcript.entries() {
        match entry {
            Entry::Welcome => {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!("✨ {}", WELCOME_TITLE),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    WELCOME_BODY,
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::default());
            }
            Entry::Message(msg) => {
                match msg.role {
                    ChatRole::User => {
                        lines.push(Line::from(Span::styled(
                            format!("{}:", app.user_label),
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        )));
                        for line in msg.content.lines() {
                            lines.push(Line::from(line.to_string()));
                        }
                    }
                    ChatRole::Assistant => {
                        lines.push(Line::from(Span::styled(
                            "AI:",
                            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                        )));
                        for line in msg.content.lines() {
                            lines.push(parse_markdown_line(line));
                        }
                    }
                }
                lines.push(Line::default());
            }
            Entry::Loading => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
                lines.push(Line::default());
            }
            Entry::Error(message) => {
                lines.push(Line::from(Span::styled(
                    Entry::error_text(message),
                    Style::default().fg(Color::Red),
                )));
                lines.push(Line::default());
            }
        }
    }

    lines
}

/// Rows the text occupies when word-wrapped to `width` columns, using the
/// same wrapping as the chat paragraph
fn wrapped_height(text: &Text<'static>, width: u16) -> u16 {
    if width == 0 {
        return text.height().min(u16::MAX as usize) as u16;
    }
    Paragraph::new(text.clone())
        .wrap(Wrap { trim: false })
        .line_count(width)
        .min(u16::MAX as usize) as u16
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let text = Text::from(transcript_lines(app));
    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);
    let max_scroll = wrapped_height(&text, inner_width).saturating_sub(inner_height);

    let view = app.controller.view_mut();
    if view.follow_bottom || view.scroll >= max_scroll {
        view.scroll = max_scroll;
        view.follow_bottom = true;
    }
    let scroll = view.scroll;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.view();

    let (title, border_color) = if app.controller.is_processing() {
        (" Waiting for reply... ", Color::DarkGray)
    } else if !view.input_focused {
        (" Message ", Color::DarkGray)
    } else if view.send_enabled {
        (" Message (Enter to send) ", Color::Yellow)
    } else {
        (" Message ", Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Scroll both ways so the cursor stays inside the box
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let (row, col) = view.cursor_row_col();
    let scroll_y = row.saturating_sub(inner_height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner_width.saturating_sub(1));

    let input = Paragraph::new(view.input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((scroll_y as u16, scroll_x as u16));

    frame.render_widget(input, area);

    if view.input_focused && inner_width > 0 {
        let cursor_x = (col - scroll_x) as u16;
        let cursor_y = (row - scroll_y) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + cursor_y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(status) = &app.status {
        let footer = Paragraph::new(format!(" {} ", status))
            .style(Style::default().bg(Color::Red).fg(Color::White));
        frame.render_widget(footer, area);
        return;
    }

    let (mode_text, mode_style) = if app.controller.is_processing() {
        (" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let hints = if app.confirm_clear {
        vec![(" y ", " clear "), (" n ", " cancel ")]
    } else {
        vec![
            (" Enter ", " send "),
            (" Alt+Enter ", " newline "),
            (" PgUp/PgDn ", " scroll "),
            (" Ctrl+L ", " clear "),
            (" Esc ", " quit "),
        ]
    };
    for (key, label) in hints {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_confirm_clear(frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 44.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Clear conversation ");

    let text = Text::from(vec![
        Line::from(CLEAR_PROMPT),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Yellow).bold()),
            Span::raw(" confirm   "),
            Span::styled("n", Style::default().fg(Color::Yellow).bold()),
            Span::raw(" cancel"),
        ]),
    ]);

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_app, StubBackend};
    use chatpane_core::{ChatMessage, ChatReply, ChatView};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_markdown_bold_and_code() {
        let line = parse_markdown_line("use **care** with `rm`");
        let texts: Vec<_> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(texts, vec!["use ", "care", " with ", "rm"]);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_marker_is_literal() {
        let line = parse_markdown_line("2 ** 3");
        let texts: Vec<_> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(texts, vec!["2 ** 3"]);
    }

    #[test]
    fn test_wrapped_height_breaks_at_words() {
        // three 6-char words never share a 10-column row
        let text = Text::from(vec![Line::from("aaaaaa bbbbbb cccccc"), Line::default()]);
        assert_eq!(wrapped_height(&text, 10), 4);
    }

    #[test]
    fn test_renders_welcome() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        let screen = draw(&mut app);

        assert!(screen.contains(WELCOME_TITLE));
        assert!(screen.contains(" Message "));
        assert!(screen.contains("READY"));
    }

    #[test]
    fn test_renders_messages_and_errors() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        app.controller.view_mut().input = "Hello".into();
        let pending = app.controller.begin_submit().unwrap();

        let screen = draw(&mut app);
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("Waiting for reply"));
        assert!(!screen.contains(WELCOME_TITLE));

        app.controller.finish_submit(pending, Ok(ChatReply::error("No message provided")));
        let screen = draw(&mut app);
        assert!(screen.contains("You:"));
        assert!(screen.contains("Hello"));
        assert!(screen.contains("Error: No message provided"));
        assert!(!screen.contains("Thinking"));
    }

    #[test]
    fn test_renders_clear_popup() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        app.open_clear_prompt();

        let screen = draw(&mut app);
        assert!(screen.contains(CLEAR_PROMPT));
    }

    #[test]
    fn test_follow_bottom_scrolls_long_transcript() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        for i in 0..40 {
            app.controller.view_mut().append_error(&format!("line {}", i));
        }

        let screen = draw(&mut app);
        assert!(screen.contains("line 39"));
        assert!(!screen.contains("line 0 "));
        assert!(app.view().scroll > 0);
    }

    fn long_reply() -> String {
        let words: Vec<String> = (0..40).map(|i| format!("{:0>60}", i)).collect();
        format!("{} ENDMARK", words.join(" "))
    }

    #[test]
    fn test_word_wrapped_reply_tail_visible_at_bottom() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        app.controller
            .view_mut()
            .append_message(&ChatMessage::assistant(long_reply()));

        let screen = draw(&mut app);
        assert!(screen.contains("ENDMARK"));
        assert!(screen.contains(&format!("{:0>60}", 39)));
    }

    #[test]
    fn test_page_down_reaches_end_of_wrapped_reply() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        app.controller
            .view_mut()
            .append_message(&ChatMessage::assistant(long_reply()));
        draw(&mut app);

        app.controller.view_mut().scroll_up(30);
        let screen = draw(&mut app);
        assert!(!screen.contains("ENDMARK"));

        for _ in 0..5 {
            app.controller.view_mut().scroll_down(10);
        }
        let screen = draw(&mut app);
        assert!(screen.contains("ENDMARK"));
        assert!(app.view().follow_bottom);
    }

    #[test]
    fn test_long_input_scrolls_to_cursor() {
        let mut app = test_app(Arc::new(StubBackend::default()));
        app.edit_input(|view| {
            for c in format!("HEADSTART{}TAILEND", "a".repeat(140)).chars() {
                view.insert_char(c);
            }
        });

        let screen = draw(&mut app);
        assert!(screen.contains("TAILEND"));
        assert!(!screen.contains("HEADSTART"));
    }
}
