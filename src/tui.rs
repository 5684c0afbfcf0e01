use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind,
        MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::{interval, Interval};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Merges terminal input with a fixed tick. The tick drives the busy
/// animation and gives the main loop a floor on how often it reaps the
/// in-flight query task.
pub struct EventHandler {
    events: EventStream,
    tick: Interval,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            events: EventStream::new(),
            tick: interval(Duration::from_millis(250)),
        }
    }

    pub async fn next(&mut self) -> AppEvent {
        loop {
            tokio::select! {
                _ = self.tick.tick() => return AppEvent::Tick,
                event = self.events.next() => match event {
                    // Press only; release and repeat are noise on some terminals
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        return AppEvent::Key(key);
                    }
                    Some(Ok(Event::Mouse(mouse))) => return AppEvent::Mouse(mouse),
                    Some(Ok(Event::Resize(w, h))) => return AppEvent::Resize(w, h),
                    // Focus/paste events, key releases, read errors: keep waiting
                    _ => {}
                },
            }
        }
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

    let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;
    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Restore the terminal before the default panic output runs.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
