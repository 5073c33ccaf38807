use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;

use ragchat::{logging, AnswerClient, Config, ExchangeController, Origin, Submission};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "ragchat", version)]
#[command(about = "Chat with a retrieval-augmented answering service from the terminal")]
struct Cli {
    /// Answer service endpoint (overrides RAGCHAT_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the exchange
    Ask {
        /// Your question
        query: String,
    },
    /// Check whether the answer service is reachable
    Health,
    /// Show or update the saved configuration
    Config {
        /// Endpoint to save as the default
        #[arg(long)]
        endpoint: Option<String>,
        /// Log level to save (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_from(&config_path)?;

    if let Err(err) = config
        .log_path()
        .and_then(|path| logging::init_file_logging(&path, config.log_level()))
    {
        eprintln!("{}: {}", "Logging disabled".yellow(), err);
    }

    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());

    match cli.command {
        None => run_tui(&endpoint).await,
        Some(Commands::Ask { query }) => ask_once(&endpoint, &query).await,
        Some(Commands::Health) => check_health(&endpoint).await,
        Some(Commands::Config { endpoint, log_level }) => {
            update_config(config, &config_path, endpoint, log_level)
        }
    }
}

async fn run_tui(endpoint: &str) -> Result<()> {
    let client = AnswerClient::new(endpoint);
    let exchange = ExchangeController::new(Arc::new(client.clone()));
    let mut app = App::new(exchange, endpoint.to_string());
    app.start_health_probe(client);

    info!(endpoint, "starting chat session");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!(messages = app.exchange.transcript().len(), "chat session ended");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn ask_once(endpoint: &str, query: &str) -> Result<()> {
    let mut exchange = ExchangeController::new(Arc::new(AnswerClient::new(endpoint)));

    if exchange.submit(query) == Submission::Empty {
        return Err(anyhow!("Query is empty"));
    }

    println!("🤖 Asking {}...\n", endpoint.dimmed());
    exchange.settle().await;

    for message in exchange.transcript().messages() {
        match message.origin() {
            Origin::User => println!("{} {}", "You:".bold().cyan(), message.text()),
            Origin::Agent => println!("{} {}", "Assistant:".bold().yellow(), message.text()),
        }
    }

    Ok(())
}

async fn check_health(endpoint: &str) -> Result<()> {
    let client = AnswerClient::new(endpoint);

    match client.health().await {
        Ok(status) if status == "ok" => {
            println!("{} {} is healthy", "✓".green().bold(), client.endpoint());
            Ok(())
        }
        Ok(status) => Err(anyhow!(
            "{} reported status '{}'",
            client.endpoint(),
            status
        )),
        Err(e) => {
            println!("Set the endpoint with: {}", "ragchat config --endpoint <url>".bold());
            Err(anyhow!("Error connecting to answer service: {}", e))
        }
    }
}

fn update_config(
    mut config: Config,
    path: &Path,
    endpoint: Option<String>,
    log_level: Option<String>,
) -> Result<()> {
    if endpoint.is_none() && log_level.is_none() {
        println!("{}", path.display().to_string().dimmed());
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(endpoint) = endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(level) = log_level {
        config.log_level = Some(level);
    }
    config.save_to(path)?;

    println!("{} {}", "Saved".green().bold(), path.display());
    Ok(())
}
