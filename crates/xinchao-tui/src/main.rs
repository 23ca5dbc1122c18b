use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;
use xinchao_core::{Config, FALLBACK_REPLY};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!("could not read the config file, using defaults: {e:#}");
        Config::new()
    });
    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    info!(model = %app.model, "assistant started");

    while !app.should_quit {
        app.refresh_ready();
        reap_answer(app).await;

        terminal.draw(|frame| ui::render(app, frame))?;

        // The tick event wakes this loop even when the user is idle, so
        // readiness flips and finished answers show up promptly.
        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }
    }

    info!("assistant shut down");
    Ok(())
}

/// Fold the background answer into the conversation once its task finishes
async fn reap_answer(app: &mut App) {
    let finished = app
        .answer_task
        .as_ref()
        .map(|task| task.is_finished())
        .unwrap_or(false);
    if !finished {
        return;
    }

    if let Some(task) = app.answer_task.take() {
        match task.await {
            Ok(reply) => handler::finish_answer(app, reply),
            Err(e) => {
                warn!("answer task failed: {e}");
                handler::finish_answer(app, Some(FALLBACK_REPLY.to_string()));
            }
        }
    }
}

fn init_logging() -> Result<()> {
    let log_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("xinchao");
    std::fs::create_dir_all(&log_dir)?;

    // Truncates the previous session's log
    let log_file = File::create(log_dir.join("xinchao.log"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
