use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod app;
mod commands;
mod dialog;
mod output;
mod settings;
pub mod ux_error;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ux_error::UxError>() {
            Some(ux) => ux.display(),
            None => output::error(&format!("{err:#}")),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completion(args)) = &cli.command {
        return commands::completion::run(args);
    }

    let config = settings::load(&cli.global)?;
    init_tracing(&config.observability.log_level);
    let app = app::App::start(config).await?;

    match cli.command {
        None | Some(Commands::Shell) => commands::shell::run(&app).await,
        Some(Commands::Login(args)) => commands::auth::run_login(&app, args).await,
        Some(Commands::Logout) => commands::auth::run_logout(&app).await,
        Some(Commands::Whoami(args)) => commands::auth::run_whoami(&app, args),
        Some(Commands::Notes(cmd)) => commands::notes::run(&app, cmd).await,
        Some(Commands::Status(args)) => commands::status::run(&app, args).await,
        Some(Commands::Completion(_)) => Ok(()),
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
