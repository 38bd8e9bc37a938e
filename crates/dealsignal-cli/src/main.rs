//! Dealsignal CLI - extract investment signals from documents and firm websites.

use clap::Parser;
use dealsignal_cli::commands;
use dealsignal_cli::{App, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdout carries command output only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> dealsignal_cli::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path)?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        // Config commands never touch the database
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter),
        Command::Data(command) => {
            config.resolve_api_key(|name| std::env::var(name).ok());
            let app = App::open(config, cli.db.as_deref())?;
            commands::execute(command, &app, &formatter).await
        }
    }
}
