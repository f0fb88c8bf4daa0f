//! coastwatch CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use coastwatch_cli::cli::{Cli, Command, ConfigAction};
use coastwatch_cli::commands;
use coastwatch_cli::config::AppConfig;
use coastwatch_cli::error::ClientResult;
use coastwatch_core::{LoggingConfig, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let logging = if cli.debug {
        LoggingConfig::debug()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging)?;

    let format = cli.output_format();
    let path = cli.config.clone().unwrap_or_else(AppConfig::default_path);

    if let Command::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        return commands::config::path(&path);
    }

    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
        Command::Weather => commands::report::weather(&config.pipeline()?, format).await,
        Command::History => commands::report::history(&config.pipeline()?, format).await,
        Command::Tides { all } => commands::report::tides(&config.pipeline()?, all, format).await,
        Command::Dashboard { history, all_tides } => {
            commands::report::dashboard(&config.pipeline()?, history, all_tides, format).await
        }
    }
}
