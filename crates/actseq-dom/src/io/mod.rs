//! Document-level inputs, outputs and resources, plus the naming and
//! typing rules shared by every IO element.

mod default_value;
mod input;
mod output;
mod resource;

pub use default_value::{DefaultValue, PropertyMapRow, Table, TableColumn};
pub use input::DocumentInput;
pub use output::DocumentOutput;
pub use resource::{DocumentResource, ResourceType};

pub(crate) use default_value::{clear_default, has_stored_default, read_default, write_default};

use crate::error::{DomError, DomResult};
use crate::names::{normalize_name, IoType, TYPE_ATTR};
use crate::tree::Element;

/// Where a document input comes from, or where a document output goes:
/// a scope such as `request` or `session` and the name within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoBinding {
    pub scope: String,
    pub name: String,
}

impl IoBinding {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

/// Values readable from an input, with permissive conversions.
pub trait InputValue {
    /// Raw value before placeholder substitution.
    fn raw_value(&self) -> Option<String>;

    /// Element used to reach the document's parameter resolver.
    fn value_element(&self) -> &Element;

    /// The value, with `{name}` placeholders substituted when
    /// `resolve_references` is set and the document has a resolver.
    fn string_value(&self, resolve_references: bool, default: Option<&str>) -> Option<String> {
        let Some(raw) = self.raw_value() else {
            return default.map(str::to_string);
        };
        if !resolve_references {
            return Some(raw);
        }
        match self.value_element().tree().resolver() {
            Some(resolver) => Some(resolver.replace_parameter_references(&raw)),
            None => Some(raw),
        }
    }

    fn value(&self) -> Option<String> {
        self.string_value(true, None)
    }

    fn bool_value(&self, default: bool) -> bool {
        match self.string_value(true, None) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => true,
                "false" | "no" | "0" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }

    fn int_value(&self, default: i64) -> i64 {
        self.string_value(true, None)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }
}

pub(crate) fn validated_name(name: &str) -> DomResult<String> {
    normalize_name(name)
        .map(str::to_string)
        .ok_or_else(|| DomError::InvalidName(name.to_string()))
}

/// Rename an IO element in place. Returns whether the name changed.
pub(crate) fn rename_element(
    element: &Element,
    name: &str,
    namespace: &'static str,
) -> DomResult<bool> {
    let name = validated_name(name)?;
    if element.has_name(&name) {
        return Ok(false);
    }
    if let Some(parent) = element.parent() {
        if parent.child(&name).is_some() {
            return Err(DomError::DuplicateName { namespace, name });
        }
    }
    element.set_name(&name);
    Ok(true)
}

pub(crate) fn io_type_of(element: &Element) -> IoType {
    element
        .attribute(TYPE_ATTR)
        .map(|t| IoType::parse(&t))
        .unwrap_or(IoType::String)
}

/// Returns whether the type attribute changed.
pub(crate) fn set_io_type(element: &Element, io_type: &IoType) -> bool {
    if element.attribute(TYPE_ATTR).as_deref() == Some(io_type.as_str()) {
        return false;
    }
    element.set_attribute(TYPE_ATTR, io_type.as_str());
    true
}

pub(crate) fn read_bindings(element: &Element, container: &str) -> Vec<IoBinding> {
    element
        .child(container)
        .map(|c| {
            c.children()
                .into_iter()
                .map(|b| IoBinding::new(b.name(), b.text()))
                .collect()
        })
        .unwrap_or_default()
}

/// Insert a binding at `index`, or append when `index` is `None`.
pub(crate) fn insert_binding(
    element: &Element,
    container: &str,
    index: Option<usize>,
    binding: &IoBinding,
) -> DomResult<()> {
    let scope = validated_name(&binding.scope)?;
    let list = element.ensure_path(container);
    let len = list.child_count();
    let index = match index {
        Some(index) if index > len => return Err(DomError::IndexOutOfRange { index, len }),
        Some(index) => index,
        None => len,
    };
    let entry = element.tree().create_element(&scope);
    entry.set_text(&binding.name);
    list.insert(index, &entry)?;
    Ok(())
}

pub(crate) fn clear_bindings(element: &Element, container: &str) -> bool {
    match element.child(container) {
        Some(list) => list.detach(),
        None => false,
    }
}
