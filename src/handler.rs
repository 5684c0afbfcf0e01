use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global quit, works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // The example picker swallows keys while open
    if app.show_example_picker {
        handle_example_picker(app, key);
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key).await?,
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_example_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_example_picker = false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.example_nav_down();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.example_nav_up();
        }
        KeyCode::Enter => {
            app.apply_selected_example();
        }
        _ => {}
    }
}

async fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Enter editing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.input.chars().count();
        }

        // Tab switches between the log and the schema panel
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Log => FocusPane::Schema,
                FocusPane::Schema => FocusPane::Log,
            };
        }

        // Scroll whichever pane is focused
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Log => app.scroll_log_down(1),
            FocusPane::Schema => app.scroll_schema_down(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Log => app.scroll_log_up(1),
            FocusPane::Schema => app.scroll_schema_up(1),
        },
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.log_height / 2;
            app.scroll_log_down(half.max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.log_height / 2;
            app.scroll_log_up(half.max(1));
        }
        KeyCode::Char('g') => app.log_scroll = 0,
        KeyCode::Char('G') => app.scroll_log_to_bottom(),

        // Example query picker
        KeyCode::Char('e') => app.open_example_picker(),

        // Manual health re-probe
        KeyCode::Char('r') => app.connect().await,

        _ => {}
    }
    Ok(())
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_query();
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
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

    let in_log = app.log_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_schema = app
        .schema_area
        .map(|r| point_in_rect(x, y, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_schema {
                app.scroll_schema_down(3);
            } else if in_log {
                app.scroll_log_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_schema {
                app.scroll_schema_up(3);
            } else if in_log {
                app.scroll_log_up(3);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::QueryClient;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::new(QueryClient::new("http://127.0.0.1:9"), vec![])
    }

    #[tokio::test]
    async fn typing_inserts_at_cursor() {
        let mut app = test_app();
        for c in "héllo".chars() {
            handle_event(&mut app, AppEvent::Key(key(KeyCode::Char(c))))
                .await
                .unwrap();
        }
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Left)))
            .await
            .unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Backspace)))
            .await
            .unwrap();

        assert_eq!(app.input, "hélo");
        assert_eq!(app.input_cursor, 3);
    }

    #[tokio::test]
    async fn esc_leaves_editing_and_tab_switches_focus() {
        let mut app = test_app();
        assert_eq!(app.input_mode, InputMode::Editing);

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Esc)))
            .await
            .unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Tab)))
            .await
            .unwrap();
        assert_eq!(app.focus, FocusPane::Schema);
    }

    #[tokio::test]
    async fn enter_on_empty_input_does_nothing() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)))
            .await
            .unwrap();
        assert!(app.messages.is_empty());
        assert!(app.query_task.is_none());
    }

    #[tokio::test]
    async fn picker_escape_closes_without_submitting() {
        let mut app = App::new(
            QueryClient::new("http://127.0.0.1:9"),
            vec!["example".to_string()],
        );
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('e'))))
            .await
            .unwrap();
        assert!(app.show_example_picker);

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Esc)))
            .await
            .unwrap();
        assert!(!app.show_example_picker);
        assert!(app.messages.is_empty());
    }
}
