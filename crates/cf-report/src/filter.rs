//! Generic filter field

use serde::{Deserialize, Serialize};

/// Predicate descriptor for one report dimension
///
/// Every sub-field is optional; an empty string or list means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterField {
    pub id: String,
    pub value: String,
    pub values: Vec<String>,
    pub great_or_equal: String,
    pub great: String,
    pub less_or_equal: String,
    pub less: String,
    pub equal: String,
    pub not_equal: String,
}

impl FilterField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_great(mut self, bound: impl Into<String>) -> Self {
        self.great = bound.into();
        self
    }

    pub fn with_great_or_equal(mut self, bound: impl Into<String>) -> Self {
        self.great_or_equal = bound.into();
        self
    }

    pub fn with_less(mut self, bound: impl Into<String>) -> Self {
        self.less = bound.into();
        self
    }

    pub fn with_less_or_equal(mut self, bound: impl Into<String>) -> Self {
        self.less_or_equal = bound.into();
        self
    }

    pub fn with_equal(mut self, value: impl Into<String>) -> Self {
        self.equal = value.into();
        self
    }

    pub fn with_not_equal(mut self, value: impl Into<String>) -> Self {
        self.not_equal = value.into();
        self
    }

    /// True if any value, bound or equality sub-field is set; `id` is ignored
    pub fn is_active(&self) -> bool {
        !self.value.is_empty()
            || !self.values.is_empty()
            || !self.great_or_equal.is_empty()
            || !self.great.is_empty()
            || !self.less_or_equal.is_empty()
            || !self.less.is_empty()
            || !self.equal.is_empty()
            || !self.not_equal.is_empty()
    }
}
