use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use crate::client::{QueryClient, QueryResponse, Schema};
use crate::message::{messages_for_response, Message, MessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Log,
    Schema,
}

/// The console controller. Owns the connectivity flag, the append-only
/// message log, and the single in-flight query task.
///
/// Constructed with an injected client so tests can point it at whatever
/// address they like; nothing here touches the network until asked to.
pub struct App {
    // Core state
    pub should_quit: bool,
    pub connected: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation log (append-only, session lifetime)
    pub messages: Vec<Message>,
    pub log_scroll: u16,
    pub log_height: u16,
    pub log_width: u16,

    // Schema side panel
    pub schema: Option<Schema>,
    pub schema_scroll: u16,

    // Query input
    pub input: String,
    pub input_cursor: usize,

    // In-flight query. At most one: submission is rejected while a task is
    // outstanding, so completions can never interleave out of order.
    pub query_loading: bool,
    pub query_task: Option<tokio::task::JoinHandle<anyhow::Result<QueryResponse>>>,

    // Example query picker
    pub show_example_picker: bool,
    pub example_queries: Vec<String>,
    pub example_state: ListState,

    // Animation state
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub log_area: Option<Rect>,
    pub schema_area: Option<Rect>,

    pub client: QueryClient,
}

impl App {
    pub fn new(client: QueryClient, example_queries: Vec<String>) -> Self {
        Self {
            should_quit: false,
            connected: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Log,

            messages: Vec::new(),
            log_scroll: 0,
            log_height: 0,
            log_width: 0,

            schema: None,
            schema_scroll: 0,

            input: String::new(),
            input_cursor: 0,

            query_loading: false,
            query_task: None,

            show_example_picker: false,
            example_queries,
            example_state: ListState::default(),

            animation_frame: 0,

            log_area: None,
            schema_area: None,

            client,
        }
    }

    /// Probe server liveness and update the connectivity flag. Failures are
    /// logged and degrade the status display; nothing propagates.
    pub async fn connect(&mut self) {
        match self.client.health().await {
            Ok(()) => {
                self.connected = true;
            }
            Err(err) => {
                tracing::warn!("health check against {} failed: {err:#}", self.client.base_url());
                self.connected = false;
            }
        }
    }

    /// Fetch the schema dictionary once. On failure the panel stays empty;
    /// the failure is logged but never surfaced in the conversation.
    pub async fn load_schema(&mut self) {
        match self.client.schema().await {
            Ok(schema) => {
                self.schema = Some(schema);
            }
            Err(err) => {
                tracing::warn!("schema load failed: {err:#}");
            }
        }
    }

    /// Submit the current input as a query.
    ///
    /// Whitespace-only input is ignored outright. While a query is already
    /// in flight the submission is rejected, which keeps log order equal to
    /// submission order.
    pub fn submit_query(&mut self) {
        let query = self.input.trim().to_string();
        if query.is_empty() || self.query_task.is_some() {
            return;
        }

        self.input.clear();
        self.input_cursor = 0;

        self.push_message(Message::new(MessageKind::User, query.clone()));
        self.query_loading = true;
        self.scroll_log_to_bottom();

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.query(&query).await }));
    }

    /// Reap the in-flight query task if it has finished. Success appends the
    /// response messages; any failure appends exactly one error message. The
    /// busy flag is cleared on every exit path.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.query_task.take() {
            match task.await {
                Ok(Ok(payload)) => {
                    for message in messages_for_response(&payload) {
                        self.push_message(message);
                    }
                }
                Ok(Err(err)) => {
                    self.push_message(Message::new(
                        MessageKind::Error,
                        format!("Query failed: {err:#}"),
                    ));
                }
                Err(err) => {
                    self.push_message(Message::new(
                        MessageKind::Error,
                        format!("Query failed: {err}"),
                    ));
                }
            }

            self.query_loading = false;
            self.scroll_log_to_bottom();
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Tick animation frame (driven by the Tick event)
    pub fn tick_animation(&mut self) {
        if self.query_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Log scrolling
    pub fn scroll_log_down(&mut self, lines: u16) {
        let max_scroll = self.total_log_lines().saturating_sub(self.log_height);
        self.log_scroll = self.log_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_log_up(&mut self, lines: u16) {
        self.log_scroll = self.log_scroll.saturating_sub(lines);
    }

    pub fn scroll_log_to_bottom(&mut self) {
        self.log_scroll = self.total_log_lines().saturating_sub(self.log_height);
    }

    /// Total rendered height of the log, accounting for wrapping at the
    /// current log width. Used for scroll clamping and stick-to-bottom.
    /// Accumulated in usize and saturated on return; a long session can
    /// outgrow u16.
    fn total_log_lines(&self) -> u16 {
        let wrap_width = if self.log_width > 0 {
            self.log_width as usize
        } else {
            50
        };

        let mut total: usize = 0;

        for message in &self.messages {
            total += 1; // header line (label + timestamp)
            for line in message.content.split('\n') {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += (char_count - 1) / wrap_width + 1;
                }
            }
            total += 1; // blank line after each message
        }

        if self.query_loading {
            total += 2; // "AI Assistant" header + "Thinking..." line
        }

        total.min(u16::MAX as usize) as u16
    }

    // Schema panel scrolling
    pub fn scroll_schema_down(&mut self, lines: u16) {
        self.schema_scroll = self.schema_scroll.saturating_add(lines);
    }

    pub fn scroll_schema_up(&mut self, lines: u16) {
        self.schema_scroll = self.schema_scroll.saturating_sub(lines);
    }

    // Example picker
    pub fn open_example_picker(&mut self) {
        if self.example_queries.is_empty() {
            return;
        }
        self.example_state.select(Some(0));
        self.show_example_picker = true;
    }

    pub fn example_nav_down(&mut self) {
        let len = self.example_queries.len();
        if len > 0 {
            let i = self.example_state.selected().unwrap_or(0);
            self.example_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn example_nav_up(&mut self) {
        let i = self.example_state.selected().unwrap_or(0);
        self.example_state.select(Some(i.saturating_sub(1)));
    }

    /// Fill the input with the selected example and submit it immediately.
    pub fn apply_selected_example(&mut self) {
        if let Some(i) = self.example_state.selected() {
            if let Some(query) = self.example_queries.get(i).cloned() {
                self.input = query;
                self.input_cursor = self.input.chars().count();
                self.show_example_picker = false;
                self.submit_query();
            }
        }
    }
}
