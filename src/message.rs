use chrono::Local;
use serde_json::{Map, Value};

use crate::client::QueryResponse;

/// Display cap for result tables, matching the server-side default page size.
pub const MAX_TABLE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
    Error,
    Sql,
    DataResult,
}

impl MessageKind {
    pub fn label(self) -> &'static str {
        match self {
            MessageKind::User => "You",
            MessageKind::Assistant => "AI Assistant",
            MessageKind::Error => "Error",
            MessageKind::Sql => "Generated SQL",
            MessageKind::DataResult => "Data Results",
        }
    }
}

/// One entry in the append-only conversation log. Never mutated or removed
/// once pushed; lives for the session.
#[derive(Debug, Clone)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// Translate a query response into log messages.
///
/// A server-reported `error` short-circuits everything else. Otherwise each
/// present field yields exactly one message, in fixed order: assistant text,
/// data table, generated SQL.
pub fn messages_for_response(payload: &QueryResponse) -> Vec<Message> {
    if let Some(error) = &payload.error {
        return vec![Message::new(MessageKind::Error, error.clone())];
    }

    let mut messages = Vec::new();

    if let Some(text) = &payload.response {
        if !text.is_empty() {
            messages.push(Message::new(MessageKind::Assistant, text.clone()));
        }
    }

    if let Some(rows) = &payload.data {
        if !rows.is_empty() {
            messages.push(Message::new(MessageKind::DataResult, render_table(rows)));
        }
    }

    if let Some(sql) = &payload.sql_query {
        messages.push(Message::new(MessageKind::Sql, sql.clone()));
    }

    messages
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render rows as an aligned text table capped at [`MAX_TABLE_ROWS`].
///
/// Column headers come from the first row's key set, in server order. Rows
/// are not validated for a shared shape; a row missing a column renders an
/// empty cell. Past the cap a truncation note states the total count.
pub fn render_table(rows: &[Map<String, Value>]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<&String> = first.keys().collect();
    let shown = &rows[..rows.len().min(MAX_TABLE_ROWS)];

    // Column widths from header plus every visible cell.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in shown {
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(*header).map(cell_text).unwrap_or_default();
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut lines = Vec::new();

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<width$}", h, width = *w))
        .collect();
    lines.push(header_line.join("  "));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(rule.join("  "));

    for row in shown {
        let cells: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| {
                let cell = row.get(*h).map(cell_text).unwrap_or_default();
                format!("{:<width$}", cell, width = *w)
            })
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }

    if rows.len() > MAX_TABLE_ROWS {
        lines.push(String::new());
        lines.push(format!(
            "Showing first {} of {} results",
            MAX_TABLE_ROWS,
            rows.len()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn error_field_yields_exactly_one_error_message() {
        let payload = QueryResponse {
            error: Some("no such table".to_string()),
            response: Some("ignored".to_string()),
            sql_query: Some("ignored".to_string()),
            data: None,
        };
        let messages = messages_for_response(&payload);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Error);
        assert_eq!(messages[0].content, "no such table");
    }

    #[test]
    fn full_payload_yields_three_messages_in_order() {
        let payload = QueryResponse {
            response: Some("Here are your results.".to_string()),
            data: Some(vec![row(&[("total", Value::from(42))])]),
            sql_query: Some("SELECT SUM(total) FROM orders".to_string()),
            error: None,
        };
        let kinds: Vec<MessageKind> = messages_for_response(&payload)
            .iter()
            .map(|m| m.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                MessageKind::Assistant,
                MessageKind::DataResult,
                MessageKind::Sql
            ]
        );
    }

    #[test]
    fn empty_response_text_and_empty_data_produce_nothing() {
        let payload = QueryResponse {
            response: Some(String::new()),
            data: Some(Vec::new()),
            sql_query: None,
            error: None,
        };
        assert!(messages_for_response(&payload).is_empty());
    }

    #[test]
    fn table_caps_at_ten_rows_with_truncation_note() {
        let rows: Vec<Map<String, Value>> = (0..15)
            .map(|i| row(&[("n", Value::from(i))]))
            .collect();
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        // header + rule + 10 body rows + blank + note
        assert_eq!(lines.len(), 14);
        assert_eq!(*lines.last().unwrap(), "Showing first 10 of 15 results");
        assert!(table.contains("9"));
        assert!(!lines[2..12].iter().any(|l| l.trim() == "10"));
    }

    #[test]
    fn table_headers_follow_first_row_key_order() {
        let rows = vec![row(&[
            ("region", Value::from("west")),
            ("revenue", Value::from(1250.5)),
        ])];
        let table = render_table(&rows);
        let header = table.lines().next().unwrap();
        assert_eq!(header.trim_end(), "region  revenue");
    }

    #[test]
    fn rows_missing_a_column_render_empty_cells() {
        let rows = vec![
            row(&[("a", Value::from("x")), ("b", Value::from("y"))]),
            row(&[("a", Value::from("z"))]),
        ];
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[3].trim_end(), "z");
    }

    #[test]
    fn null_cells_render_empty_and_numbers_render_plain() {
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&Value::from(7)), "7");
        assert_eq!(cell_text(&Value::from(true)), "true");
    }
}
