use anyhow::Result;
use taskchat_core::{BackendClient, Config};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    match logging::init() {
        Ok(path) => info!(log = %path.display(), "logging initialised"),
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let config = Config::load()?;
    let backend = match config.request_timeout() {
        Some(timeout) => BackendClient::with_timeout(config.api_url(), timeout)?,
        None => BackendClient::new(config.api_url()),
    };
    info!(api_url = backend.base_url(), "starting taskchat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &config, backend).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, config: &Config, backend: BackendClient) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(config, backend, events.sender());

    app.load_todos();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    info!("shutting down");
    Ok(())
}
