//! Clickforge CLI - versioned schema migrations for ClickHouse

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{migrate, render};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::exit(*code),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global).await,
        cli::Commands::Render(args) => render::execute(args, &cli.global).await,
    }
}
