//! Report query assembler
//!
//! Reports append fragments as they inspect the requested columns and the
//! active filters. Every list is de-duplicated on read, keeping the first
//! occurrence, so a fragment needed by several columns can be added by each.

use crate::condition::{self, AssignCondition};
use crate::filter::FilterField;
use cf_core::Params;
use std::collections::HashSet;

/// Incrementally built analytical `SELECT`
#[derive(Debug, Clone, Default)]
pub struct ReportQueryBuilder {
    from: String,
    select_list: Vec<String>,
    join_list: Vec<String>,
    where_list: Vec<String>,
    group_list: Vec<String>,
    group_exclusions: Vec<String>,
    having_list: Vec<String>,
    sort_list: Vec<String>,
    parameters: Params,
    limit: u64,
    offset: u64,
    conditions_compiled: u32,
}

fn unique(list: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    list.iter()
        .map(String::as_str)
        .filter(|item| seen.insert(*item))
        .collect()
}

/// Split `expr AS alias` on its last ` AS ` (any case)
fn split_alias(entry: &str) -> Option<(&str, &str)> {
    let pos = entry.to_ascii_lowercase().rfind(" as ")?;
    Some((entry[..pos].trim(), entry[pos + 4..].trim()))
}

impl ReportQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.from = from.into();
    }

    pub fn select_list(&self) -> Vec<&str> {
        unique(&self.select_list)
    }

    pub fn add_select(&mut self, select: impl Into<String>) {
        self.select_list.push(select.into());
    }

    /// Add an aggregate `expr AS alias`; the alias never joins GROUP BY
    pub fn add_aggregate_select(&mut self, select: impl Into<String>) {
        let select = select.into();
        if let Some((_, alias)) = split_alias(&select) {
            self.group_exclusions.push(alias.to_string());
        }
        self.select_list.push(select);
    }

    pub fn join_list(&self) -> Vec<&str> {
        unique(&self.join_list)
    }

    pub fn add_join(&mut self, join: impl Into<String>) {
        self.join_list.push(join.into());
    }

    pub fn where_list(&self) -> Vec<&str> {
        unique(&self.where_list)
    }

    pub fn add_where(&mut self, predicate: impl Into<String>) {
        self.where_list.push(predicate.into());
    }

    pub fn group_list(&self) -> Vec<&str> {
        unique(&self.group_list)
    }

    pub fn add_group(&mut self, group: impl Into<String>) {
        self.group_list.push(group.into());
    }

    pub fn group_exclusions(&self) -> Vec<&str> {
        unique(&self.group_exclusions)
    }

    pub fn add_group_exclusion(&mut self, alias: impl Into<String>) {
        self.group_exclusions.push(alias.into());
    }

    pub fn having_list(&self) -> Vec<&str> {
        unique(&self.having_list)
    }

    pub fn add_having(&mut self, predicate: impl Into<String>) {
        self.having_list.push(predicate.into());
    }

    pub fn sort_list(&self) -> Vec<&str> {
        unique(&self.sort_list)
    }

    pub fn add_sort(&mut self, sort: impl Into<String>) {
        self.sort_list.push(sort.into());
    }

    pub fn set_sort_list(&mut self, sort_list: Vec<String>) {
        self.sort_list = sort_list;
    }

    pub fn parameters(&self) -> &Params {
        &self.parameters
    }

    /// Merge `parameters` in; later values replace earlier ones
    pub fn add_parameters(&mut self, parameters: Params) {
        self.parameters.extend(parameters);
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// True if the field is present and any of its sub-fields is set
    pub fn is_filter_field_not_empty(&self, field: Option<&FilterField>) -> bool {
        field.is_some_and(FilterField::is_active)
    }

    /// Compile `field` into conditions on `column` with placeholders unique
    /// to this builder
    pub fn prepare_condition(
        &mut self,
        column: &str,
        field: &FilterField,
        like: bool,
    ) -> AssignCondition {
        self.conditions_compiled += 1;
        let seed = condition::placeholder_seed(&field.id, self.conditions_compiled);
        condition::compile(column, field, like, &seed)
    }

    /// Compile `field` on `column` and add each resulting expression as a
    /// WHERE predicate
    pub fn filter_where(&mut self, column: &str, field: &FilterField, like: bool) {
        let condition = self.prepare_condition(column, field, like);
        if condition.is_empty() {
            return;
        }
        for expression in condition.expressions() {
            self.add_where(expression.clone());
        }
        self.add_parameters(condition.into_placeholders());
    }

    /// Compile `field` on `column` and add it as a HAVING predicate
    pub fn filter_having(&mut self, column: &str, field: &FilterField, like: bool) {
        let condition = self.prepare_condition(column, field, like);
        if condition.is_empty() {
            return;
        }
        for expression in condition.expressions() {
            self.add_having(expression.clone());
        }
        self.add_parameters(condition.into_placeholders());
    }

    /// Explicit groups plus every aliased select entry not already grouped,
    /// minus excluded aliases
    ///
    /// Inference only runs when at least one group was declared.
    pub fn effective_group_list(&self) -> Vec<&str> {
        let mut groups = self.group_list();
        if groups.is_empty() {
            return groups;
        }

        for select in self.select_list() {
            let Some((expr, alias)) = split_alias(select) else {
                continue;
            };
            if groups.contains(&expr) || groups.contains(&alias) {
                continue;
            }
            groups.push(alias);
        }

        let exclusions = self.group_exclusions();
        groups.retain(|group| !exclusions.contains(group));
        groups
    }

    /// Render the statement
    ///
    /// Without a FROM or any select entry this is `SELECT NULL`.
    pub fn build_query(&self) -> String {
        let selects = self.select_list();
        if self.from.is_empty() || selects.is_empty() {
            return "SELECT NULL".to_string();
        }

        let mut parts = vec![
            format!("SELECT {}", selects.join(", ")),
            format!("FROM {}", self.from),
        ];

        let joins = self.join_list();
        if !joins.is_empty() {
            parts.push(joins.join(" "));
        }

        let wheres = self.where_list();
        if !wheres.is_empty() {
            parts.push(format!("WHERE ({})", wheres.join(") AND (")));
        }

        let groups = self.effective_group_list();
        if !groups.is_empty() {
            parts.push(format!("GROUP BY {}", groups.join(", ")));
        }

        let havings = self.having_list();
        if !havings.is_empty() {
            parts.push(format!("HAVING ({})", havings.join(") AND (")));
        }

        let sorts = self.sort_list();
        if !sorts.is_empty() {
            parts.push(format!("ORDER BY {}", sorts.join(", ")));
        }

        if self.limit > 0 {
            parts.push(format!("LIMIT {} OFFSET {}", self.limit, self.offset));
        }

        let sql = parts.join(" ");
        log::debug!("Report query: {}", sql);
        sql
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
