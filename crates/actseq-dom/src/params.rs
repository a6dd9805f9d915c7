//! Parameter placeholder resolution.
//!
//! Constant values may embed `{name}` placeholders that refer to other
//! variables. The model never evaluates them itself; it hands the raw text
//! to the [`ParameterResolver`] attached to the document.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    // {name} placeholders; names follow the element name rules
    static ref PARAMETER_REF_REGEX: Regex = Regex::new(r"\{([^{}\s]+)\}").unwrap();
}

/// Supplies variable values at resolution time.
pub trait ParameterResolver: Send + Sync {
    /// Current value of a variable, if known.
    fn variable_value(&self, name: &str) -> Option<String>;

    /// Replace every `{name}` placeholder in `text`. Unknown names are left
    /// as they are.
    fn replace_parameter_references(&self, text: &str) -> String {
        replace_parameter_references(text, |name| self.variable_value(name))
    }
}

/// Map-backed resolver.
#[derive(Debug, Clone, Default)]
pub struct MapParameterResolver {
    values: HashMap<String, String>,
}

impl MapParameterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl ParameterResolver for MapParameterResolver {
    fn variable_value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Substitute `{name}` placeholders using `lookup`.
pub fn replace_parameter_references<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PARAMETER_REF_REGEX
        .replace_all(text, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Names referenced through `{name}` placeholders, in order of appearance.
pub(crate) fn parameter_references(text: &str) -> Vec<String> {
    PARAMETER_REF_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Rewrite `{old}` placeholders to `{new}`.
pub fn rename_parameter_references(text: &str, old: &str, new: &str) -> String {
    replace_parameter_references(text, |name| {
        if name == old {
            Some(format!("{{{}}}", new))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_map_resolver_replaces_known_names() {
        let resolver = MapParameterResolver::new()
            .with_value("region", "EMEA")
            .with_value("year", "2024");

        assert_eq!(
            resolver.replace_parameter_references("select * where r='{region}' and y={year} and z={zone}"),
            "select * where r='EMEA' and y=2024 and z={zone}"
        );
    }

    #[test]
    fn test_parameter_references() {
        assert_eq!(
            parameter_references("{a} and {b} but not { c }"),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_rename_parameter_references() {
        assert_eq!(
            rename_parameter_references("{cust}/{custID}/{cust}", "cust", "customer"),
            "{customer}/{custID}/{customer}"
        );
    }
}
