//! Statement builder
//!
//! One [`QueryBuilder`] accumulates the parts of exactly one statement. The
//! statement-initiating call (`create_table`, `drop_view`, `insert`, ...)
//! selects the [`StatementKind`]; parts irrelevant to that kind are ignored
//! when rendering.

use crate::column::{Column, ColumnFlags, ColumnType};
use crate::dictionary::DictionarySource;
use crate::engine::StorageEngine;
use crate::error::{SqlError, SqlResult};
use cf_core::sql_utils::to_sql_literal;
use cf_core::{Params, Value};
use cf_db::{Client, SelectResult};

/// Statement shape a builder renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    CreateTable,
    CreateDictionary,
    CreateMaterializedView,
    #[default]
    Select,
    DropTable,
    DropView,
    DropDictionary,
    Insert,
    Delete,
}

/// Outcome of [`QueryBuilder::execute`]
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Statement sent through `Client::write`
    Written,
    /// Row sent through `Client::insert`
    Inserted,
    /// Rows returned by `Client::select`
    Selected(SelectResult),
}

impl Execution {
    /// Select rows, if this was a select
    pub fn into_result(self) -> Option<SelectResult> {
        match self {
            Execution::Selected(result) => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SelectItem {
    All,
    Aliased { alias: String, source: String },
}

/// Accumulator for one DDL or DML statement
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    kind: StatementKind,
    flags: ColumnFlags,
    table: String,
    to_table: String,
    columns: Vec<Column>,
    selected: Vec<SelectItem>,
    from: String,
    where_clause: String,
    order_by: String,
    limit: Option<u64>,
    offset: Option<u64>,
    primary_key: String,
    engine: Option<StorageEngine>,
    dictionary_source: Option<DictionarySource>,
    bindings: Params,
    insert_data: Vec<(String, Value)>,
}

impl QueryBuilder {
    /// New builder; the statement kind is `Select` until another is chosen
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn start(mut self, kind: StatementKind, table: &str, flags: ColumnFlags) -> Self {
        self.kind = kind;
        self.table = table.to_string();
        self.flags = flags;
        self
    }

    // Columns

    /// Add a column, replacing the type of an existing column of the same name
    pub fn add_column(mut self, name: &str, column_type: ColumnType, flags: ColumnFlags) -> Self {
        let column = Column::new(name, column_type, flags);
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    /// `DateTime{size}`; ClickHouse callers normally pass 64
    pub fn add_date_time(self, name: &str, flags: ColumnFlags, size: u8) -> Self {
        self.add_column(name, ColumnType::DateTime { size }, flags)
    }

    pub fn add_uuid(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_column(name, ColumnType::Uuid, flags)
    }

    pub fn add_string(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_column(name, ColumnType::String, flags)
    }

    pub fn add_decimal(self, name: &str, flags: ColumnFlags, precision: u8, scale: u8) -> Self {
        self.add_column(name, ColumnType::Decimal { precision, scale }, flags)
    }

    /// `Enum{size}` with labels in the given order
    pub fn add_enum<L: Into<String>>(
        self,
        name: &str,
        values: impl IntoIterator<Item = (L, i64)>,
        flags: ColumnFlags,
        size: u8,
    ) -> Self {
        let values = values.into_iter().map(|(l, n)| (l.into(), n)).collect();
        self.add_column(name, ColumnType::Enum { size, values }, flags)
    }

    pub fn add_int(self, name: &str, flags: ColumnFlags, size: u8) -> Self {
        self.add_column(name, ColumnType::Int { size }, flags)
    }

    pub fn add_int8(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_int(name, flags, 8)
    }

    pub fn add_int16(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_int(name, flags, 16)
    }

    pub fn add_int32(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_int(name, flags, 32)
    }

    pub fn add_int64(self, name: &str, flags: ColumnFlags) -> Self {
        self.add_int(name, flags, 64)
    }

    pub fn add_uint(self, name: &str, flags: ColumnFlags, size: u8) -> Self {
        self.add_column(name, ColumnType::UInt { size }, flags)
    }

    // Statement kinds

    pub fn create_table(self, name: &str, flags: ColumnFlags) -> Self {
        self.start(StatementKind::CreateTable, name, flags)
    }

    pub fn create_dictionary(self, name: &str) -> Self {
        self.start(StatementKind::CreateDictionary, name, ColumnFlags::NONE)
    }

    /// Materialized view `name` writing into `to`; the select parts of this
    /// builder become its `AS` query
    pub fn create_materialized_view(mut self, name: &str, to: &str, flags: ColumnFlags) -> Self {
        self.to_table = to.to_string();
        self.start(StatementKind::CreateMaterializedView, name, flags)
    }

    pub fn drop_table(self, name: &str, flags: ColumnFlags) -> Self {
        self.start(StatementKind::DropTable, name, flags)
    }

    pub fn drop_view(self, name: &str, flags: ColumnFlags) -> Self {
        self.start(StatementKind::DropView, name, flags)
    }

    pub fn drop_dictionary(self, name: &str) -> Self {
        self.start(StatementKind::DropDictionary, name, ColumnFlags::NONE)
    }

    /// Insert one row, given as column/value pairs in column order
    pub fn insert<K, V>(mut self, table: &str, row: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert_data = row.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.start(StatementKind::Insert, table, ColumnFlags::NONE)
    }

    /// `ALTER TABLE ... DELETE`, filtered by [`where_clause`](Self::where_clause)
    pub fn delete(self, table: &str) -> Self {
        self.start(StatementKind::Delete, table, ColumnFlags::NONE)
    }

    // Select parts

    pub fn from(mut self, table: &str) -> Self {
        self.from = table.to_string();
        self
    }

    pub fn where_clause(mut self, predicate: &str) -> Self {
        self.where_clause = predicate.to_string();
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by = expr.to_string();
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Replace the select list with `alias -> source expression` pairs
    pub fn select_columns<A, S>(mut self, columns: impl IntoIterator<Item = (A, S)>) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        self.selected = columns
            .into_iter()
            .map(|(alias, source)| SelectItem::Aliased {
                alias: alias.into(),
                source: source.into(),
            })
            .collect();
        self
    }

    pub fn select_all_columns(mut self) -> Self {
        self.selected = vec![SelectItem::All];
        self
    }

    /// Named parameters bound to `:name` placeholders of a select
    pub fn bindings(mut self, params: Params) -> Self {
        self.bindings = params;
        self
    }

    // DDL parts

    pub fn engine(mut self, engine: StorageEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    pub fn dictionary_source(mut self, source: DictionarySource) -> Self {
        self.dictionary_source = Some(source);
        self
    }

    // Rendering

    /// Render the statement for the active kind
    pub fn render(&self) -> SqlResult<String> {
        if self.kind != StatementKind::Select && self.table.is_empty() {
            return Err(SqlError::Configuration(format!(
                "{:?} statement has no target name",
                self.kind
            )));
        }

        match self.kind {
            StatementKind::CreateTable => self.render_create_table(),
            StatementKind::CreateDictionary => self.render_create_dictionary(),
            StatementKind::CreateMaterializedView => Ok(format!(
                "CREATE MATERIALIZED VIEW {}{} TO {} AS {}",
                self.if_not_exists(),
                self.table,
                self.to_table,
                self.render_select()?
            )),
            StatementKind::DropTable => {
                Ok(format!("DROP TABLE {}{}", self.if_exists(), self.table))
            }
            StatementKind::DropView => Ok(format!("DROP VIEW {}{}", self.if_exists(), self.table)),
            StatementKind::DropDictionary => Ok(format!("DROP DICTIONARY {}", self.table)),
            StatementKind::Delete => {
                let mut sql = format!("ALTER TABLE {} DELETE", self.table);
                if !self.where_clause.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&self.where_clause);
                }
                Ok(sql)
            }
            StatementKind::Insert => self.render_insert(),
            StatementKind::Select => self.render_select(),
        }
    }

    fn if_not_exists(&self) -> &'static str {
        if self.flags.contains(ColumnFlags::IF_NOT_EXISTS) {
            "IF NOT EXISTS "
        } else {
            ""
        }
    }

    fn if_exists(&self) -> &'static str {
        if self.flags.contains(ColumnFlags::IF_EXISTS) {
            "IF EXISTS "
        } else {
            ""
        }
    }

    fn column_list(&self) -> SqlResult<String> {
        if self.columns.is_empty() {
            return Err(SqlError::Configuration(format!(
                "No columns defined for '{}'",
                self.table
            )));
        }
        Ok(self
            .columns
            .iter()
            .map(Column::definition)
            .collect::<Vec<_>>()
            .join(", "))
    }

    fn render_create_table(&self) -> SqlResult<String> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            SqlError::Configuration(format!("Engine is not set for table '{}'", self.table))
        })?;

        let mut sql = format!(
            "CREATE TABLE {}{} ({}) ENGINE = {}",
            self.if_not_exists(),
            self.table,
            self.column_list()?,
            engine.dsn_string()?
        );

        let settings = engine.settings_string();
        if engine.can_use_connection_settings() && !settings.is_empty() {
            sql.push_str(" SETTINGS ");
            sql.push_str(&settings);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }
        Ok(sql)
    }

    fn render_create_dictionary(&self) -> SqlResult<String> {
        let source = self.dictionary_source.as_ref().ok_or_else(|| {
            SqlError::Configuration(format!(
                "Dictionary source is not set for dictionary '{}'",
                self.table
            ))
        })?;
        if self.primary_key.is_empty() {
            return Err(SqlError::Configuration(format!(
                "Primary key is not set for dictionary '{}'",
                self.table
            )));
        }

        Ok(format!(
            "CREATE DICTIONARY {} ({}) PRIMARY KEY {} SOURCE({}) LAYOUT({}) LIFETIME({})",
            self.table,
            self.column_list()?,
            self.primary_key,
            source.source_string()?,
            source.layout,
            source.lifetime
        ))
    }

    fn render_select(&self) -> SqlResult<String> {
        if self.from.is_empty() {
            return Err(SqlError::Configuration(
                "Select has no FROM table".to_string(),
            ));
        }

        let columns = if self.selected.is_empty() {
            "*".to_string()
        } else {
            self.selected
                .iter()
                .map(|item| match item {
                    SelectItem::All => "*".to_string(),
                    SelectItem::Aliased { alias, source } => format!("{source} AS {alias}"),
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, self.from);
        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(sql)
    }

    fn render_insert(&self) -> SqlResult<String> {
        if self.insert_data.is_empty() {
            return Err(SqlError::Configuration(format!(
                "Insert into '{}' has no values",
                self.table
            )));
        }
        let (columns, values): (Vec<&str>, Vec<String>) = self
            .insert_data
            .iter()
            .map(|(k, v)| (k.as_str(), to_sql_literal(v)))
            .unzip();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            values.join(", ")
        ))
    }

    // Execution

    /// Render and run the statement through `client`
    ///
    /// DDL and deletes go through `write`, inserts through the batch
    /// `insert` call, selects through `select` with the bound parameters.
    pub async fn execute(&self, client: &dyn Client) -> SqlResult<Execution> {
        match self.kind {
            StatementKind::Insert => {
                // render validates the row before it is sent
                let preview = self.render()?;
                log::debug!("{}", preview);
                let (columns, values): (Vec<String>, Vec<Value>) =
                    self.insert_data.iter().cloned().unzip();
                client.insert(&self.table, &[values], &columns).await?;
                Ok(Execution::Inserted)
            }
            StatementKind::Select => {
                let sql = self.render()?;
                log::debug!("{}", sql);
                let result = client.select(&sql, &self.bindings).await?;
                Ok(Execution::Selected(result))
            }
            _ => {
                let sql = self.render()?;
                log::debug!("{}", sql);
                client.write(&sql).await?;
                Ok(Execution::Written)
            }
        }
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
