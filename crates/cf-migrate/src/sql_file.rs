//! Migrations loaded from `<Version>.up.sql` / `<Version>.down.sql` files
//!
//! Files are minijinja templates rendered at run time, so `env()` sees the
//! environment of the process applying the migration. Each file may hold
//! several `;`-separated statements, executed in order.

use crate::context::MigrationContext;
use crate::error::{MigrateError, MigrateResult};
use crate::migration::Migration;
use async_trait::async_trait;
use cf_jinja::JinjaEnvironment;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// A migration backed by a pair of SQL template files
#[derive(Debug, Clone)]
pub struct SqlFileMigration {
    version: String,
    up_path: PathBuf,
    down_path: Option<PathBuf>,
    vars: HashMap<String, serde_yaml::Value>,
}

impl SqlFileMigration {
    /// Migration for `version`; the down script is optional
    pub fn new(
        version: impl Into<String>,
        up_path: PathBuf,
        down_path: Option<PathBuf>,
        vars: HashMap<String, serde_yaml::Value>,
    ) -> Self {
        Self {
            version: version.into(),
            up_path,
            down_path,
            vars,
        }
    }

    pub fn up_path(&self) -> &Path {
        &self.up_path
    }

    pub fn down_path(&self) -> Option<&Path> {
        self.down_path.as_deref()
    }

    fn render_file(&self, path: &Path) -> MigrateResult<String> {
        let template = std::fs::read_to_string(path).map_err(|e| MigrateError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.version.clone());
        Ok(JinjaEnvironment::new(&self.vars).render(&name, &template)?)
    }

    /// Rendered up script
    pub fn render_up(&self) -> MigrateResult<String> {
        self.render_file(&self.up_path)
    }

    /// Rendered down script
    pub fn render_down(&self) -> MigrateResult<String> {
        match &self.down_path {
            Some(path) => self.render_file(path),
            None => Err(MigrateError::Irreversible(self.version.clone())),
        }
    }
}

async fn run_script(ctx: &MigrationContext<'_>, sql: &str) -> MigrateResult<bool> {
    for statement in split_statements(sql) {
        ctx.run_sql(&statement).await?;
    }
    Ok(true)
}

#[async_trait]
impl Migration for SqlFileMigration {
    fn version(&self) -> &str {
        &self.version
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> MigrateResult<bool> {
        let sql = self.render_up()?;
        run_script(ctx, &sql).await
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> MigrateResult<bool> {
        let sql = self.render_down()?;
        run_script(ctx, &sql).await
    }
}

/// Split a script on `;` outside string literals and comments
///
/// Fragments holding only whitespace or comments are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                has_code = true;
                current.push(c);
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == '\\' {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    } else if inner == '\'' {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            ';' => {
                if has_code {
                    statements.push(current.trim().to_string());
                }
                current.clear();
                has_code = false;
            }
            _ => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
            }
        }
    }
    if has_code {
        statements.push(current.trim().to_string());
    }
    statements
}

/// Load every `<Version>.up.sql` in `dir`, sorted by version
///
/// A `<Version>.down.sql` next to it becomes the down script; a down script
/// without a matching up script is ignored with a warning.
pub fn discover_sql_migrations(
    dir: &Path,
    vars: &HashMap<String, serde_yaml::Value>,
) -> MigrateResult<Vec<SqlFileMigration>> {
    let io_err = |e: std::io::Error| MigrateError::Io {
        path: dir.display().to_string(),
        source: e,
    };

    let mut ups: HashMap<String, PathBuf> = HashMap::new();
    let mut downs: HashMap<String, PathBuf> = HashMap::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(version) = file_name.strip_suffix(UP_SUFFIX) {
            ups.insert(version.to_string(), path.clone());
        } else if let Some(version) = file_name.strip_suffix(DOWN_SUFFIX) {
            downs.insert(version.to_string(), path.clone());
        }
    }

    for version in downs.keys().filter(|v| !ups.contains_key(*v)) {
        log::warn!("Ignoring {}{}: no matching up script", version, DOWN_SUFFIX);
    }

    let mut migrations: Vec<SqlFileMigration> = ups
        .into_iter()
        .map(|(version, up_path)| {
            let down_path = downs.remove(&version);
            SqlFileMigration::new(version, up_path, down_path, vars.clone())
        })
        .collect();
    migrations.sort_by(|a, b| a.version.cmp(&b.version));
    log::debug!("Discovered {} SQL migrations in {}", migrations.len(), dir.display());
    Ok(migrations)
}

#[cfg(test)]
#[path = "sql_file_test.rs"]
mod tests;
