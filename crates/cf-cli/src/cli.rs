//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Clickforge - versioned schema migrations for ClickHouse
#[derive(Parser, Debug)]
#[command(name = "cf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (database connection)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations, or roll back with `down`
    Migrate(MigrateArgs),

    /// Print the rendered SQL of one migration
    Render(RenderArgs),
}

/// Migration direction
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply every pending migration
    Up,
    /// Roll back to a version (default: the latest applied)
    Down,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Direction; omitted means `up`
    #[arg(value_enum)]
    pub direction: Option<Direction>,

    /// Version to roll back to (only with `down`)
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: Option<String>,
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Migration version to render
    pub version: String,

    /// Render the down script instead of the up script
    #[arg(long)]
    pub down: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
