//! Migrate command implementation

use anyhow::{bail, Context, Result};
use cf_migrate::{Migration, MigrationRunner};

use crate::cli::{Direction, GlobalArgs, MigrateArgs};
use crate::commands::common::{create_client, load_migrations, load_project, ConsoleOutput};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let direction = args.direction.unwrap_or(Direction::Up);
    if direction == Direction::Up && args.target_version.is_some() {
        bail!("option `--version` can be used after `down` argument only");
    }

    let project = load_project(global)?;
    let migrations = load_migrations(&project, global)?;
    let client = create_client(&project, global)?;

    let mut runner = MigrationRunner::new(&client);
    runner.set_output(Box::new(ConsoleOutput));
    for migration in migrations {
        if global.verbose {
            eprintln!("[verbose] Registered migration {}", migration.version());
        }
        runner.add_migration(Box::new(migration));
    }

    match direction {
        Direction::Up => runner.run_up().await.context("Migration failed"),
        Direction::Down => runner
            .run_down(args.target_version.as_deref())
            .await
            .context("Rollback failed"),
    }
}
