use std::sync::Arc;

use anyhow::Result;
use chatpane_core::{ChatBackend, Config, HttpChatClient};
use clap::Parser;
use tracing::{info, warn};

mod app;
mod cli;
mod handler;
mod logging;
mod oneshot;
mod tui;
mod ui;
mod view;

#[cfg(test)]
mod test_support;

use app::App;
use cli::{Cli, Command, Settings};
use tui::{EventHandler, EventSender, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(_) => logging::init_stderr()?,
        None => {
            let log_path = match &cli.log_file {
                Some(path) => path.clone(),
                None => logging::default_log_path()?,
            };
            logging::init_file(&log_path)?;
        }
    }

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "failed to load config, using defaults");
        Config::new()
    });
    let settings = Settings::resolve(&cli, &config);

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatClient::with_timeout(
        &settings.server_url,
        settings.timeout,
    ));

    match cli.command {
        Some(Command::Send { message }) => {
            oneshot::run_send(backend, &message.join(" "), &settings.user_label).await
        }
        Some(Command::Clear { yes }) => oneshot::run_clear(backend, yes).await,
        None => run_tui(backend, settings).await,
    }
}

async fn run_tui(backend: Arc<dyn ChatBackend>, settings: Settings) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let tx = events.sender();
    let mut app = App::new(backend, settings.server_url, settings.user_label);
    info!(server = %app.server_url, "app initialized");

    let result = run_loop(&mut terminal, &mut app, &mut events, &tx).await;

    tui::restore()?;
    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    tx: &EventSender,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event, tx)?;
    }
    Ok(())
}
