//! Execution context handed to migration bodies

use crate::error::MigrateResult;
use crate::output::MigrationOutput;
use crate::params::{MigrationParam, MigrationParams};
use cf_db::Client;
use cf_sql::{Execution, QueryBuilder};

/// Store access and output for one migration run
pub struct MigrationContext<'a> {
    client: &'a dyn Client,
    output: &'a dyn MigrationOutput,
    declared: Vec<MigrationParam>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(
        client: &'a dyn Client,
        output: &'a dyn MigrationOutput,
        declared: Vec<MigrationParam>,
    ) -> Self {
        Self {
            client,
            output,
            declared,
        }
    }

    pub fn client(&self) -> &'a dyn Client {
        self.client
    }

    /// Fresh builder for one statement
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Render and run a built statement
    pub async fn execute(&self, builder: &QueryBuilder) -> MigrateResult<Execution> {
        Ok(builder.execute(self.client).await?)
    }

    /// Run a raw statement through `Client::write`
    pub async fn run_sql(&self, sql: &str) -> MigrateResult<()> {
        log::debug!("{}", sql);
        Ok(self.client.write(sql).await?)
    }

    /// True if `SHOW CREATE TABLE name` returns a definition
    pub async fn table_exists(&self, name: &str) -> MigrateResult<bool> {
        Ok(!self.client.show_create_table(name).await?.is_empty())
    }

    pub fn console_out(&self, message: &str) {
        self.output.writeln(message);
    }

    /// Declared parameters resolved from the process environment
    pub fn params(&self) -> MigrateResult<MigrationParams> {
        MigrationParams::from_env(&self.declared)
    }
}
