//! Element, attribute and type vocabulary of action sequence documents.

use std::fmt;

pub const ACTION_SEQUENCE: &str = "action-sequence";
pub const TITLE: &str = "title";
pub const VERSION: &str = "version";
pub const LOGGING_LEVEL: &str = "logging-level";
pub const DOCUMENTATION: &str = "documentation";
pub const AUTHOR: &str = "author";
pub const DESCRIPTION: &str = "description";
pub const HELP: &str = "help";
pub const RESULT_TYPE: &str = "result-type";
pub const ICON: &str = "icon";

pub const INPUTS: &str = "inputs";
pub const OUTPUTS: &str = "outputs";
pub const RESOURCES: &str = "resources";
pub const ACTIONS: &str = "actions";

pub const ACTION_DEFINITION: &str = "action-definition";
pub const COMPONENT_NAME: &str = "component-name";
pub const ACTION_TYPE: &str = "action-type";
pub const ACTION_INPUTS: &str = "action-inputs";
pub const ACTION_OUTPUTS: &str = "action-outputs";
pub const ACTION_RESOURCES: &str = "action-resources";
pub const COMPONENT_DEFINITION: &str = "component-definition";

pub const CONDITION: &str = "condition";
pub const LOOP_ON: &str = "loop-on";
pub const PEEK_ONLY: &str = "peek-only";

pub const TYPE_ATTR: &str = "type";
pub const MAPPING_ATTR: &str = "mapping";

pub const DEFAULT_VALUE: &str = "default-value";
pub const SOURCES: &str = "sources";
pub const DESTINATIONS: &str = "destinations";
pub const LIST_ITEM: &str = "list-item";
pub const PROPERTY_MAP: &str = "property-map";
pub const ENTRY: &str = "entry";
pub const KEY_ATTR: &str = "key";
pub const COLUMNS: &str = "columns";
pub const ROW: &str = "row";

pub const LOCATION: &str = "location";
pub const MIME_TYPE: &str = "mime-type";
pub const CONTENT: &str = "content";

/// Type attribute written on action resources.
pub const RESOURCE_TYPE_NAME: &str = "resource";

/// Type tag of an input, output or resource.
///
/// The fixed vocabulary is modelled explicitly; anything else (connection
/// types contributed by action plugins, for example) is kept verbatim in
/// [`IoType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IoType {
    String,
    Integer,
    Long,
    Decimal,
    Boolean,
    StringList,
    PropertyMap,
    PropertyMapList,
    ResultSet,
    Content,
    Resource,
    Other(String),
}

/// Storage shape of a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    StringList,
    PropertyMap,
    PropertyMapList,
    ResultSet,
    Unsupported,
}

impl IoType {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "string" => IoType::String,
            "integer" => IoType::Integer,
            "long" => IoType::Long,
            "bigdecimal" | "decimal" => IoType::Decimal,
            "boolean" => IoType::Boolean,
            "string-list" | "list" => IoType::StringList,
            "property-map" => IoType::PropertyMap,
            "property-map-list" => IoType::PropertyMapList,
            "result-set" => IoType::ResultSet,
            "content" => IoType::Content,
            "resource" => IoType::Resource,
            other => IoType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IoType::String => "string",
            IoType::Integer => "integer",
            IoType::Long => "long",
            IoType::Decimal => "bigdecimal",
            IoType::Boolean => "boolean",
            IoType::StringList => "string-list",
            IoType::PropertyMap => "property-map",
            IoType::PropertyMapList => "property-map-list",
            IoType::ResultSet => "result-set",
            IoType::Content => "content",
            IoType::Resource => "resource",
            IoType::Other(other) => other,
        }
    }

    /// Shape used to store a default value of this type.
    pub fn value_shape(&self) -> ValueShape {
        match self {
            IoType::String
            | IoType::Integer
            | IoType::Long
            | IoType::Decimal
            | IoType::Boolean => ValueShape::Scalar,
            IoType::StringList => ValueShape::StringList,
            IoType::PropertyMap => ValueShape::PropertyMap,
            IoType::PropertyMapList => ValueShape::PropertyMapList,
            IoType::ResultSet => ValueShape::ResultSet,
            IoType::Content | IoType::Resource | IoType::Other(_) => ValueShape::Unsupported,
        }
    }
}

impl From<&str> for IoType {
    fn from(value: &str) -> Self {
        IoType::parse(value)
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names become element names, so they must be non-empty and free of
/// whitespace. Surrounding whitespace is trimmed first.
pub fn normalize_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_type_round_trip() {
        for name in ["string", "integer", "string-list", "result-set", "sql-connection"] {
            assert_eq!(IoType::parse(name).as_str(), name);
        }
        assert_eq!(IoType::parse("list"), IoType::StringList);
        assert_eq!(IoType::parse("decimal"), IoType::Decimal);
    }

    #[test]
    fn test_value_shapes() {
        assert_eq!(IoType::Boolean.value_shape(), ValueShape::Scalar);
        assert_eq!(IoType::ResultSet.value_shape(), ValueShape::ResultSet);
        assert_eq!(IoType::parse("sql-connection").value_shape(), ValueShape::Unsupported);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  custID "), Some("custID"));
        assert_eq!(normalize_name("cust ID"), None);
        assert_eq!(normalize_name("cust\tID"), None);
        assert_eq!(normalize_name("   "), None);
    }
}
