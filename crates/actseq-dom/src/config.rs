//! Configuration for the document model
//!
//! Settings are attached to a tree when a document is created and are
//! shared by every view over that tree.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::error::DomResult;

pub const BRANCH_OUTPUTS_VISIBLE_AFTER_VAR: &str = "ACTSEQ_BRANCH_OUTPUTS_VISIBLE_AFTER";
pub const CONSTANTS_USE_CDATA_VAR: &str = "ACTSEQ_CONSTANTS_USE_CDATA";

/// Document model settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomConfig {
    /// Make outputs produced inside a loop or conditional visible to the
    /// statements that follow the branch in the enclosing block
    #[serde(default)]
    pub branch_outputs_visible_after: bool,

    /// Write input constants into the component definition as CDATA
    #[serde(default = "default_constants_use_cdata")]
    pub constants_use_cdata: bool,
}

fn default_constants_use_cdata() -> bool {
    true
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            branch_outputs_visible_after: false,
            constants_use_cdata: default_constants_use_cdata(),
        }
    }
}

impl DomConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(BRANCH_OUTPUTS_VISIBLE_AFTER_VAR) {
            match parse_flag(&value) {
                Some(flag) => config.branch_outputs_visible_after = flag,
                None => warn!("Invalid {} value: {}", BRANCH_OUTPUTS_VISIBLE_AFTER_VAR, value),
            }
        }

        if let Some(value) = lookup(CONSTANTS_USE_CDATA_VAR) {
            match parse_flag(&value) {
                Some(flag) => config.constants_use_cdata = flag,
                None => warn!("Invalid {} value: {}", CONSTANTS_USE_CDATA_VAR, value),
            }
        }

        config
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> DomResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DomConfig::default();
        assert!(!config.branch_outputs_visible_after);
        assert!(config.constants_use_cdata);
    }

    #[test]
    fn test_from_yaml_fills_missing_fields() {
        let config = DomConfig::from_yaml_str("branch_outputs_visible_after: true\n").unwrap();
        assert_eq!(
            config,
            DomConfig {
                branch_outputs_visible_after: true,
                constants_use_cdata: true,
            }
        );
    }

    #[test]
    fn test_from_yaml_rejects_bad_types() {
        let err = DomConfig::from_yaml_str("constants_use_cdata: [1, 2]").unwrap_err();
        assert_eq!(err.error_code(), "ERR_DOM_CONFIG");
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = DomConfig::from_lookup(|key| match key {
            BRANCH_OUTPUTS_VISIBLE_AFTER_VAR => Some("yes".to_string()),
            CONSTANTS_USE_CDATA_VAR => Some("sometimes".to_string()),
            _ => None,
        });
        assert!(config.branch_outputs_visible_after);
        assert!(config.constants_use_cdata);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
