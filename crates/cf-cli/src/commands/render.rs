//! Render command implementation

use anyhow::{Context, Result};
use cf_migrate::Migration;

use crate::cli::{GlobalArgs, RenderArgs};
use crate::commands::common::{load_migrations, load_project, ExitCode};

/// Execute the render command
pub async fn execute(args: &RenderArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let migrations = load_migrations(&project, global)?;

    let Some(migration) = migrations.iter().find(|m| m.version() == args.version) else {
        eprintln!("Migration {} not found", args.version);
        let available: Vec<&str> = migrations.iter().map(|m| m.version()).collect();
        if !available.is_empty() {
            eprintln!("Available migrations: {}", available.join(", "));
        }
        return Err(ExitCode(1).into());
    };

    let sql = if args.down {
        migration.render_down()
    } else {
        migration.render_up()
    }
    .with_context(|| format!("Failed to render migration {}", args.version))?;

    println!("{}", sql.trim_end());
    Ok(())
}
