//! Filter-field condition compiler

use crate::filter::FilterField;
use cf_core::{Params, Value};
use std::fmt;

/// AND-combined boolean expressions plus the values their placeholders bind to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignCondition {
    expressions: Vec<String>,
    placeholders: Params,
}

impl AssignCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expression(&mut self, expression: impl Into<String>) {
        self.expressions.push(expression.into());
    }

    pub fn add_placeholder(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.placeholders.insert(name.into(), value.into());
    }

    pub fn expressions(&self) -> &[String] {
        &self.expressions
    }

    pub fn placeholders(&self) -> &Params {
        &self.placeholders
    }

    pub fn into_placeholders(self) -> Params {
        self.placeholders
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// `(e1) AND (e2) ...`
    pub fn to_sql(&self) -> String {
        format!("({})", self.expressions.join(") AND ("))
    }
}

impl fmt::Display for AssignCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Placeholder seed for the `counter`-th condition compiled from a field
///
/// The filter id is reduced to identifier characters so the seed can be
/// bound as a `:name` placeholder.
pub fn placeholder_seed(id: &str, counter: u32) -> String {
    let mut seed: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if seed.is_empty() {
        seed.push_str("filter");
    } else if seed.starts_with(|c: char| c.is_ascii_digit()) {
        seed.insert(0, 'f');
    }
    format!("{}_{}", seed, counter)
}

/// Compile the populated sub-fields of `field` into conditions on `column`.
///
/// Strict bounds win over inclusive ones and `equal` wins over `not_equal`.
/// With `like` set, the single value matches as a `%value%` substring.
pub fn compile(column: &str, field: &FilterField, like: bool, seed: &str) -> AssignCondition {
    let mut condition = AssignCondition::new();

    if !field.value.is_empty() {
        let placeholder = format!("{}_value", seed);
        if like {
            condition.add_expression(format!("{} LIKE :{}", column, placeholder));
            condition.add_placeholder(placeholder, format!("%{}%", field.value));
        } else {
            condition.add_expression(format!("{} = :{}", column, placeholder));
            condition.add_placeholder(placeholder, field.value.as_str());
        }
    }

    if !field.values.is_empty() {
        let placeholder = format!("{}_values", seed);
        condition.add_expression(format!("{} IN (:{})", column, placeholder));
        condition.add_placeholder(
            placeholder,
            Value::Array(field.values.iter().map(|v| Value::from(v.as_str())).collect()),
        );
    }

    let lower = if !field.great.is_empty() {
        Some((">", &field.great))
    } else if !field.great_or_equal.is_empty() {
        Some((">=", &field.great_or_equal))
    } else {
        None
    };
    if let Some((op, bound)) = lower {
        let placeholder = format!("{}_min", seed);
        condition.add_expression(format!("{} {} :{}", column, op, placeholder));
        condition.add_placeholder(placeholder, bound.as_str());
    }

    let upper = if !field.less.is_empty() {
        Some(("<", &field.less))
    } else if !field.less_or_equal.is_empty() {
        Some(("<=", &field.less_or_equal))
    } else {
        None
    };
    if let Some((op, bound)) = upper {
        let placeholder = format!("{}_max", seed);
        condition.add_expression(format!("{} {} :{}", column, op, placeholder));
        condition.add_placeholder(placeholder, bound.as_str());
    }

    let equality = if !field.equal.is_empty() {
        Some(("=", &field.equal))
    } else if !field.not_equal.is_empty() {
        Some(("!=", &field.not_equal))
    } else {
        None
    };
    if let Some((op, value)) = equality {
        let placeholder = format!("{}_eq", seed);
        condition.add_expression(format!("{} {} :{}", column, op, placeholder));
        condition.add_placeholder(placeholder, value.as_str());
    }

    condition
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
