use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod app;
mod client;
mod config;
mod format;
mod handler;
mod message;
mod tui;
mod ui;

use app::App;
use client::QueryClient;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Keep the guard alive so buffered log lines flush on exit
    let _log_guard = init_logging();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let server_url = config.server_url();
    let examples = config
        .example_queries
        .clone()
        .unwrap_or_else(config::default_example_queries);

    let mut app = App::new(QueryClient::new(&server_url), examples);

    tracing::info!("starting against {}", server_url);

    // Startup sequence: probe liveness, then fetch the data dictionary.
    // Both degrade gracefully; the console stays usable either way.
    app.connect().await;
    app.load_schema().await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        // Reap the in-flight query before drawing so results land this frame
        app.poll_query_task().await;

        terminal.draw(|frame| ui::render(&mut app, frame))?;

        let event = events.next().await;
        handler::handle_event(&mut app, event).await?;
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file under the config dir; stderr belongs to the terminal UI.
fn init_logging() -> Option<WorkerGuard> {
    let dir = config::log_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, "datachat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
