use crate::document::ActionSequenceDocument;
use crate::error::DomResult;
use crate::events::{self, DocumentEvent, EventParent, IoElement};
use crate::io::{io_type_of, rename_element, set_io_type, InputValue};
use crate::names::{IoType, ACTION_DEFINITION, MAPPING_ATTR};
use crate::tree::Element;

use super::ActionDefinition;

fn owning_action(element: &Element) -> Option<ActionDefinition> {
    let mut current = element.parent();
    while let Some(candidate) = current {
        if candidate.has_name(ACTION_DEFINITION) {
            return Some(ActionDefinition::from_element(candidate));
        }
        current = candidate.parent();
    }
    None
}

/// An action input bound to a variable of the document.
///
/// The element name is the private name; the optional `mapping` attribute
/// names the variable when it differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInput {
    element: Element,
}

impl ActionInput {
    pub(crate) fn from_element(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn name(&self) -> String {
        self.element.name()
    }

    pub fn set_name(&self, name: &str) -> DomResult<()> {
        if rename_element(&self.element, name, "action input")? {
            self.fire(DocumentEvent::IoRenamed);
        }
        Ok(())
    }

    pub fn io_type(&self) -> IoType {
        io_type_of(&self.element)
    }

    pub fn set_type(&self, io_type: impl Into<IoType>) {
        if set_io_type(&self.element, &io_type.into()) {
            self.fire(DocumentEvent::IoChanged);
        }
    }

    pub fn mapping(&self) -> Option<String> {
        self.element.attribute(MAPPING_ATTR).filter(|m| !m.is_empty())
    }

    /// Name of the variable this input draws from.
    pub fn referenced_variable_name(&self) -> String {
        self.mapping().unwrap_or_else(|| self.name())
    }

    /// Point the input at `variable`. Mapping to the input's own name
    /// removes the mapping attribute.
    pub fn set_referenced_variable_name(&self, variable: &str) {
        if self.apply_reference(variable) {
            self.fire(DocumentEvent::IoChanged);
        }
    }

    pub(crate) fn apply_reference(&self, variable: &str) -> bool {
        if self.referenced_variable_name() == variable {
            return false;
        }
        if variable == self.name() {
            self.element.remove_attribute(MAPPING_ATTR);
        } else {
            self.element.set_attribute(MAPPING_ATTR, variable);
        }
        true
    }

    pub fn action(&self) -> Option<ActionDefinition> {
        owning_action(&self.element)
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(&self.element)
    }

    pub fn delete(&self) {
        let action = self.action();
        let attached = self.element.is_attached();
        self.element.detach();
        if let (Some(action), true) = (action, attached) {
            events::fire(&DocumentEvent::IoRemoved {
                parent: EventParent::Action(action),
                io: IoElement::ActionInput(self.clone()),
            });
        }
    }

    pub(crate) fn fire(&self, make: fn(IoElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(IoElement::ActionInput(self.clone())));
    }
}

impl InputValue for ActionInput {
    /// Value supplied by the document's parameter resolver.
    fn raw_value(&self) -> Option<String> {
        let resolver = self.element.tree().resolver()?;
        resolver.variable_value(&self.referenced_variable_name())
    }

    fn value_element(&self) -> &Element {
        &self.element
    }
}

/// An action input whose value is embedded in the component definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputConstant {
    element: Element,
}

impl ActionInputConstant {
    pub(crate) fn from_element(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn name(&self) -> String {
        self.element.name()
    }

    pub fn is_cdata(&self) -> bool {
        self.element.is_cdata()
    }

    pub fn set_value(&self, value: &str, use_cdata: bool) {
        if self.element.text() == value && self.element.is_cdata() == use_cdata {
            return;
        }
        if use_cdata {
            self.element.set_cdata(value);
        } else {
            self.element.set_text(value);
        }
        if let Some(action) = self.action() {
            action.fire_changed();
        }
    }

    pub fn action(&self) -> Option<ActionDefinition> {
        owning_action(&self.element)
    }
}

impl InputValue for ActionInputConstant {
    fn raw_value(&self) -> Option<String> {
        Some(self.element.text())
    }

    fn value_element(&self) -> &Element {
        &self.element
    }
}

/// How an action input gets its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionInputSource {
    Variable(ActionInput),
    Constant(ActionInputConstant),
}

impl ActionInputSource {
    pub fn name(&self) -> String {
        self.element().name()
    }

    pub fn element(&self) -> &Element {
        match self {
            ActionInputSource::Variable(input) => input.element(),
            ActionInputSource::Constant(constant) => constant.element(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, ActionInputSource::Constant(_))
    }

    pub fn as_variable(&self) -> Option<&ActionInput> {
        match self {
            ActionInputSource::Variable(input) => Some(input),
            ActionInputSource::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&ActionInputConstant> {
        match self {
            ActionInputSource::Constant(constant) => Some(constant),
            ActionInputSource::Variable(_) => None,
        }
    }
}

impl InputValue for ActionInputSource {
    fn raw_value(&self) -> Option<String> {
        match self {
            ActionInputSource::Variable(input) => input.raw_value(),
            ActionInputSource::Constant(constant) => constant.raw_value(),
        }
    }

    fn value_element(&self) -> &Element {
        self.element()
    }
}
