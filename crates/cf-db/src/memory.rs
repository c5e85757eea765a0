//! In-memory store client
//!
//! Understands the statement shapes the query builders and the migration
//! ledger produce: object creation and drops, `ALTER TABLE ... DELETE` by a
//! single equality, batch inserts, and single-table selects with an optional
//! equality filter, ordering and limit. Anything else is rejected with
//! [`DbError::Unsupported`], except that arbitrary selects can be answered
//! from results queued with [`MemoryClient::push_select_result`].

use crate::bind::bind_params;
use crate::error::{DbError, DbResult};
use crate::result::SelectResult;
use crate::traits::Client;
use async_trait::async_trait;
use cf_core::{Params, Row, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Kind of object created by a `CREATE` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
    Dictionary,
}

#[derive(Debug, Clone)]
struct StoredObject {
    kind: ObjectKind,
    create_sql: String,
    rows: Vec<Row>,
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: BTreeMap<String, StoredObject>,
    executed: Vec<String>,
    queued: VecDeque<SelectResult>,
}

/// Store client that keeps objects and rows in process memory
#[derive(Debug, Default)]
pub struct MemoryClient {
    state: Mutex<MemoryState>,
}

static CREATE_RE: OnceLock<Regex> = OnceLock::new();
static DROP_RE: OnceLock<Regex> = OnceLock::new();
static DELETE_RE: OnceLock<Regex> = OnceLock::new();
static SELECT_RE: OnceLock<Regex> = OnceLock::new();
static EQ_RE: OnceLock<Regex> = OnceLock::new();

fn create_re() -> &'static Regex {
    CREATE_RE.get_or_init(|| {
        Regex::new(
            r"(?is)^CREATE\s+(TABLE|DICTIONARY|MATERIALIZED\s+VIEW|VIEW)\s+(IF\s+NOT\s+EXISTS\s+)?([\w.`]+)",
        )
        .expect("valid regex")
    })
}

fn drop_re() -> &'static Regex {
    DROP_RE.get_or_init(|| {
        Regex::new(r"(?is)^DROP\s+(TABLE|VIEW|DICTIONARY)\s+(IF\s+EXISTS\s+)?([\w.`]+)\s*$")
            .expect("valid regex")
    })
}

fn delete_re() -> &'static Regex {
    DELETE_RE.get_or_init(|| {
        Regex::new(r"(?is)^ALTER\s+TABLE\s+([\w.`]+)\s+DELETE(?:\s+WHERE\s+(.+))?$")
            .expect("valid regex")
    })
}

fn select_re() -> &'static Regex {
    SELECT_RE.get_or_init(|| {
        Regex::new(
            r"(?is)^SELECT\s+(.+?)\s+FROM\s+([\w.`]+)(?:\s+WHERE\s+(.+?))?(?:\s+ORDER\s+BY\s+(.+?))?(?:\s+LIMIT\s+(\d+))?(?:\s+OFFSET\s+(\d+))?$",
        )
        .expect("valid regex")
    })
}

fn eq_re() -> &'static Regex {
    EQ_RE.get_or_init(|| {
        Regex::new(r"(?s)^\(?\s*(\w+)\s*=\s*(?:'((?:[^'\\]|\\.)*)'|(-?\d+))\s*\)?$")
            .expect("valid regex")
    })
}

impl MemoryClient {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Queue a canned result for the next select that cannot be answered
    /// from stored rows
    pub fn push_select_result(&self, result: SelectResult) -> DbResult<()> {
        self.lock()?.queued.push_back(result);
        Ok(())
    }

    /// Every statement received so far, after placeholder binding
    pub fn executed(&self) -> DbResult<Vec<String>> {
        Ok(self.lock()?.executed.clone())
    }

    /// Rows stored in `table`
    pub fn rows(&self, table: &str) -> DbResult<Vec<Row>> {
        let state = self.lock()?;
        state
            .objects
            .get(&normalize_name(table))
            .map(|obj| obj.rows.clone())
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))
    }

    /// Kind of the object called `name`, if it exists
    pub fn object_kind(&self, name: &str) -> DbResult<Option<ObjectKind>> {
        Ok(self
            .lock()?
            .objects
            .get(&normalize_name(name))
            .map(|obj| obj.kind))
    }

    fn apply_write(state: &mut MemoryState, sql: &str) -> DbResult<()> {
        if let Some(caps) = create_re().captures(sql) {
            let kind = match caps[1].to_ascii_uppercase().as_str() {
                "TABLE" => ObjectKind::Table,
                "DICTIONARY" => ObjectKind::Dictionary,
                _ => ObjectKind::View,
            };
            let name = normalize_name(&caps[3]);
            if state.objects.contains_key(&name) {
                if caps.get(2).is_some() {
                    return Ok(());
                }
                return Err(DbError::ExecutionError(format!(
                    "{} already exists: {}",
                    name, sql
                )));
            }
            state.objects.insert(
                name,
                StoredObject {
                    kind,
                    create_sql: sql.to_string(),
                    rows: Vec::new(),
                },
            );
            return Ok(());
        }

        if let Some(caps) = drop_re().captures(sql) {
            let name = normalize_name(&caps[3]);
            if state.objects.remove(&name).is_none() && caps.get(2).is_none() {
                return Err(DbError::TableNotFound(name));
            }
            return Ok(());
        }

        if let Some(caps) = delete_re().captures(sql) {
            let name = normalize_name(&caps[1]);
            let filter = caps
                .get(2)
                .map(|w| parse_equality(w.as_str(), sql))
                .transpose()?;
            let obj = state
                .objects
                .get_mut(&name)
                .ok_or_else(|| DbError::TableNotFound(name.clone()))?;
            match filter {
                Some((column, value)) => obj.rows.retain(|row| !matches_eq(row, &column, &value)),
                None => obj.rows.clear(),
            }
            return Ok(());
        }

        Err(unsupported(sql))
    }

    fn run_select(state: &mut MemoryState, sql: &str) -> DbResult<SelectResult> {
        let caps = match select_re().captures(sql) {
            Some(caps) => caps,
            None => return Err(unsupported(sql)),
        };
        let name = normalize_name(&caps[2]);
        let obj = state
            .objects
            .get(&name)
            .ok_or_else(|| DbError::TableNotFound(name.clone()))?;

        let filter = caps
            .get(3)
            .map(|w| parse_equality(w.as_str(), sql))
            .transpose()?;
        let mut rows: Vec<Row> = obj
            .rows
            .iter()
            .filter(|row| match &filter {
                Some((column, value)) => matches_eq(row, column, value),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(order) = caps.get(4) {
            let keys = parse_order_by(order.as_str());
            rows.sort_by(|a, b| {
                for (column, descending) in &keys {
                    let ord = compare_values(a.get(column), b.get(column));
                    let ord = if *descending { ord.reverse() } else { ord };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let total = rows.len() as u64;
        let offset = caps
            .get(6)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(0);
        let mut rows: Vec<Row> = rows.into_iter().skip(offset).collect();
        if let Some(limit) = caps.get(5).and_then(|m| m.as_str().parse::<usize>().ok()) {
            rows.truncate(limit);
        }

        let projection = caps[1].trim();
        if projection != "*" {
            let columns = parse_projection(projection, sql)?;
            rows = rows
                .into_iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|(source, alias)| {
                            let value = row.get(source).cloned().unwrap_or(Value::Null);
                            (alias.clone(), value)
                        })
                        .collect()
                })
                .collect();
        }

        Ok(SelectResult::new(rows, total))
    }
}

#[async_trait]
impl Client for MemoryClient {
    async fn write(&self, sql: &str) -> DbResult<()> {
        let sql = normalize_sql(sql);
        let mut state = self.lock()?;
        state.executed.push(sql.clone());
        log::debug!("memory write: {}", sql);
        Self::apply_write(&mut state, &sql)
    }

    async fn select(&self, sql: &str, params: &Params) -> DbResult<SelectResult> {
        let sql = normalize_sql(&bind_params(sql, params));
        let mut state = self.lock()?;
        state.executed.push(sql.clone());
        log::debug!("memory select: {}", sql);
        match Self::run_select(&mut state, &sql) {
            Ok(result) => Ok(result),
            Err(err) => state.queued.pop_front().ok_or(err),
        }
    }

    async fn insert(&self, table: &str, rows: &[Vec<Value>], columns: &[String]) -> DbResult<()> {
        let name = normalize_name(table);
        let mut state = self.lock()?;
        state
            .executed
            .push(format!("INSERT INTO {} ({})", name, columns.join(", ")));
        let obj = state
            .objects
            .get_mut(&name)
            .ok_or_else(|| DbError::TableNotFound(name.clone()))?;
        for values in rows {
            if values.len() != columns.len() {
                return Err(DbError::ExecutionError(format!(
                    "insert into {}: expected {} values, got {}",
                    name,
                    columns.len(),
                    values.len()
                )));
            }
            let row: Row = columns.iter().cloned().zip(values.iter().cloned()).collect();
            obj.rows.push(row);
        }
        Ok(())
    }

    async fn show_create_table(&self, name: &str) -> DbResult<String> {
        Ok(self
            .lock()?
            .objects
            .get(&normalize_name(name))
            .map(|obj| obj.create_sql.clone())
            .unwrap_or_default())
    }

    async fn show_tables(&self) -> DbResult<BTreeSet<String>> {
        Ok(self.lock()?.objects.keys().cloned().collect())
    }

    fn client_type(&self) -> &'static str {
        "memory"
    }
}

fn unsupported(sql: &str) -> DbError {
    DbError::Unsupported {
        client: "memory".to_string(),
        sql: sql.to_string(),
    }
}

fn normalize_sql(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim().to_string()
}

fn normalize_name(name: &str) -> String {
    let name = name.trim().replace('`', "");
    match name.rsplit_once('.') {
        Some((_, bare)) => bare.to_string(),
        None => name,
    }
}

fn parse_equality(predicate: &str, sql: &str) -> DbResult<(String, Value)> {
    let caps = eq_re()
        .captures(predicate.trim())
        .ok_or_else(|| unsupported(sql))?;
    let value = match (caps.get(2), caps.get(3)) {
        (Some(s), _) => Value::String(unescape(s.as_str())),
        (None, Some(n)) => n
            .as_str()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| unsupported(sql))?,
        (None, None) => return Err(unsupported(sql)),
    };
    Ok((caps[1].to_string(), value))
}

/// `col` or `col AS alias` items; expressions are not evaluated
fn parse_projection(projection: &str, sql: &str) -> DbResult<Vec<(String, String)>> {
    projection
        .split(',')
        .map(|item| {
            let tokens: Vec<&str> = item.split_whitespace().collect();
            match tokens.as_slice() {
                [column] if is_identifier(column) => Ok((column.to_string(), column.to_string())),
                [column, kw, alias]
                    if kw.eq_ignore_ascii_case("AS") && is_identifier(column) && is_identifier(alias) =>
                {
                    Ok((column.to_string(), alias.to_string()))
                }
                _ => Err(unsupported(sql)),
            }
        })
        .collect()
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_order_by(order: &str) -> Vec<(String, bool)> {
    order
        .split(',')
        .filter_map(|part| {
            let mut tokens = part.split_whitespace();
            let column = tokens.next()?.to_string();
            let descending = tokens
                .next()
                .is_some_and(|dir| dir.eq_ignore_ascii_case("DESC"));
            Some((column, descending))
        })
        .collect()
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn matches_eq(row: &Row, column: &str, expected: &Value) -> bool {
    match row.get(column) {
        Some(actual) => compare_values(Some(actual), Some(expected)) == Ordering::Equal,
        None => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) if !matches!(a, Value::String(_)) || !matches!(b, Value::String(_)) => {
                x.cmp(&y)
            }
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
