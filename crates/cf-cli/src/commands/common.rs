//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use cf_core::Config;
use cf_db::HttpClient;
use cf_migrate::{discover_sql_migrations, MigrationOutput, SqlFileMigration};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Return `Err(ExitCode(N).into())` once the failure has already been
/// reported, so `main` exits without printing it again.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Loaded project configuration plus the directory it was found in
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
    pub(crate) target: Option<String>,
}

impl Project {
    /// Directory holding the `.up.sql`/`.down.sql` files
    pub(crate) fn migration_dir(&self) -> PathBuf {
        self.config.migration_path_absolute(&self.root)
    }
}

/// Load the project config from `--config` or the project directory
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project config")?;

    let target = Config::resolve_target(global.target.as_deref());
    if global.verbose {
        eprintln!(
            "[verbose] Loaded project '{}' from {} (target: {})",
            config.name,
            root.display(),
            target.as_deref().unwrap_or("default")
        );
    }

    Ok(Project {
        root,
        config,
        target,
    })
}

/// Create the HTTP client for the resolved target
pub(crate) fn create_client(project: &Project, global: &GlobalArgs) -> Result<HttpClient> {
    let connection = project
        .config
        .get_connection_config(project.target.as_deref())
        .context("Failed to get connection configuration")?;
    if global.verbose {
        eprintln!(
            "[verbose] Connecting to {} (database: {}, user: {})",
            connection.url, connection.database, connection.user
        );
    }
    HttpClient::new(connection).context("Failed to create ClickHouse client")
}

/// Discover SQL-file migrations with the target's vars
pub(crate) fn load_migrations(
    project: &Project,
    global: &GlobalArgs,
) -> Result<Vec<SqlFileMigration>> {
    let dir = project.migration_dir();
    let vars = project.config.get_merged_vars(project.target.as_deref());
    let migrations = discover_sql_migrations(&dir, &vars)
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
    if global.verbose {
        eprintln!(
            "[verbose] Found {} migrations in {}",
            migrations.len(),
            dir.display()
        );
    }
    Ok(migrations)
}

/// Prints runner progress to stdout
pub(crate) struct ConsoleOutput;

impl MigrationOutput for ConsoleOutput {
    fn writeln(&self, message: &str) {
        println!("{}", message);
    }
}
