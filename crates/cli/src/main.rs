mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    awswrap_core::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    match &args.command {
        Command::Query(query) => commands::query(&args, query).await,
        Command::Exec(exec) => commands::exec(&args, exec).await,
        Command::Upload(copy) => commands::upload(&args, copy).await,
        Command::Download(copy) => commands::download(&args, copy).await,
        Command::Ls(ls) => commands::ls(&args, ls).await,
    }
}
