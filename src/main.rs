//! Learning Buddy CLI entry point.

use anyhow::Result;
use clap::Parser;
use learning_buddy::cli::{commands, Cli, Commands};
use learning_buddy::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    init_logging(&cli, &settings);

    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&config_path, &settings)?;
        }

        Commands::Ask { query } => {
            commands::run_ask(query, settings).await?;
        }

        Commands::Faq { question } => {
            commands::run_faq(question, settings).await?;
        }

        Commands::Recommend { areas } => {
            commands::run_recommend(areas, settings).await?;
        }

        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = (*port).unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, cli.config.as_deref(), &settings)?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli, settings: &Settings) {
    let log_level = match cli.verbose {
        0 if matches!(cli.command, Commands::Serve { .. }) => settings.general.log_level.as_str(),
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("learning_buddy={},tower_http={}", log_level, log_level)),
    );

    let json = settings.general.log_format.eq_ignore_ascii_case("json")
        && matches!(cli.command, Commands::Serve { .. });

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
