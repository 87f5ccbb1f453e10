use anyhow::Result;
use clap::Parser;

mod app;
mod client;
mod config;
mod conversation;
mod handler;
mod message;
mod tui;
mod ui;

use app::App;
use client::ChatClient;
use config::Config;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";

#[derive(Parser)]
#[command(name = "redact-chat")]
#[command(about = "Chat with an LLM through a redaction backend")]
struct Cli {
    /// Chat endpoint of the redaction backend
    #[arg(long, env = "REDACT_CHAT_ENDPOINT")]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flag and env var win over the config file, the file over the default
    let config = Config::load().unwrap_or_default();
    let endpoint = cli
        .endpoint
        .or(config.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(ChatClient::new(&endpoint));

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }

        // Apply the outcome of a finished request; ticks keep this polled
        // while no key or mouse events arrive
        app.poll_chat_task().await;
    }

    tui::restore()?;
    Ok(())
}
