use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode};
use crate::format::format_content;
use crate::message::{Message, MessageKind};

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

    // Body: conversation column plus the schema panel
    let [chat_area, schema_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(34),
    ])
    .areas(body_area);

    let [log_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    render_log(app, frame, log_area);
    render_input(app, frame, input_area);
    render_schema_panel(app, frame, schema_area);

    render_footer(app, frame, footer_area);

    if app.show_example_picker {
        render_example_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, status_color) = if app.connected {
        ("● Connected", Color::Green)
    } else {
        ("● Disconnected", Color::Red)
    };

    let title = Line::from(vec![
        Span::styled(" datachat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::styled(
            format!("  {}", app.client.base_url()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn kind_color(kind: MessageKind) -> Color {
    match kind {
        MessageKind::User => Color::Cyan,
        MessageKind::Assistant => Color::Yellow,
        MessageKind::Error => Color::Red,
        MessageKind::Sql => Color::Magenta,
        MessageKind::DataResult => Color::Green,
    }
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(
            message.kind.label().to_string(),
            Style::default()
                .fg(kind_color(message.kind))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", message.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    match message.kind {
        // Conversational text gets the markdown-lite treatment
        MessageKind::User | MessageKind::Assistant => {
            lines.extend(format_content(&message.content));
        }
        MessageKind::Error => {
            for line in message.content.split('\n') {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Red),
                )));
            }
        }
        // SQL and tables are verbatim; markdown markers in them are data
        MessageKind::Sql => {
            for line in message.content.split('\n') {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::Magenta),
                )));
            }
        }
        MessageKind::DataResult => {
            for line in message.content.split('\n') {
                lines.push(Line::from(Span::raw(line.to_string())));
            }
        }
    }

    lines.push(Line::default());
    lines
}

fn render_log(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store inner dimensions for wrap and scroll calculations
    app.log_area = Some(area);
    app.log_height = area.height.saturating_sub(2);
    app.log_width = area.width.saturating_sub(2);

    let log_focused = app.focus == FocusPane::Log && app.input_mode == InputMode::Normal;
    let border_color = if log_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");

    let text = if app.messages.is_empty() && !app.query_loading {
        Text::from(Span::styled(
            "Ask a question about your data, or press 'e' for examples...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for message in &app.messages {
            lines.extend(message_lines(message));
        }

        if app.query_loading {
            lines.push(Line::from(Span::styled(
                MessageKind::Assistant.label(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let log = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.log_scroll, 0));

    frame.render_widget(log, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    // Relabel while a request is outstanding
    let title = if app.query_loading {
        " Processing... "
    } else {
        " Ask a question (Enter to send) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor visible in long inputs
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

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
        .block(block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.show_example_picker {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_schema_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    app.schema_area = Some(area);

    let schema_focused = app.focus == FocusPane::Schema && app.input_mode == InputMode::Normal;
    let border_color = if schema_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Available Data ");

    let has_tables = app
        .schema
        .as_ref()
        .map(|s| !s.tables.is_empty())
        .unwrap_or(false);

    if !has_tables {
        let placeholder = Paragraph::new("No schema loaded.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    if let Some(schema) = &app.schema {
        for table in schema.tables.keys() {
            lines.push(Line::from(Span::styled(
                table.clone(),
                Style::default().fg(Color::Yellow).bold(),
            )));
            for column in schema.columns(table) {
                lines.push(Line::from(format!("  {}", column)));
            }
            lines.push(Line::default());
        }
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.schema_scroll, 0));

    frame.render_widget(panel, area);
}

fn render_example_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = (app.example_queries.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Example Queries (Enter to ask, Esc to cancel) ");

    let items: Vec<ListItem> = app
        .example_queries
        .iter()
        .map(|query| ListItem::new(format!(" {} ", query)))
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

    frame.render_stateful_widget(list, popup_area, &mut app.example_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " VIEW ",
        InputMode::Editing => " ASK ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" e ", key_style),
            Span::styled(" examples ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" reconnect ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

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
