//! Jinja environment setup for Clickforge

use crate::error::{JinjaError, JinjaResult};
use crate::functions::{make_env_fn, make_var_fn, sql_string_filter};
use minijinja::{Environment, UndefinedBehavior};
use std::collections::HashMap;

/// Jinja templating environment for SQL migrations
pub struct JinjaEnvironment<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaEnvironment<'a> {
    /// Create a new Jinja environment with variables from config
    pub fn new(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_function("env", make_env_fn());
        env.add_function("var", make_var_fn(vars.clone()));
        env.add_filter("sql_string", sql_string_filter);

        Self { env }
    }

    /// Render a template string; `name` identifies it in error messages
    pub fn render(&self, name: &str, template: &str) -> JinjaResult<String> {
        log::debug!("Rendering template {}", name);
        self.env
            .render_named_str(name, template, ())
            .map_err(|e| JinjaError::RenderError {
                template: name.to_string(),
                message: e.to_string(),
            })
    }
}

impl Default for JinjaEnvironment<'_> {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
