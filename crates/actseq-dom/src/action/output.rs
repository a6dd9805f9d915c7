use crate::document::ActionSequenceDocument;
use crate::error::DomResult;
use crate::events::{self, DocumentEvent, EventParent, IoElement};
use crate::io::{io_type_of, rename_element, set_io_type};
use crate::names::{IoType, ACTION_DEFINITION, MAPPING_ATTR};
use crate::tree::Element;

use super::ActionDefinition;

/// An output produced by an action.
///
/// The element name is the private name. Later statements can only bind
/// to the output once it carries a public name (`mapping` attribute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutput {
    element: Element,
}

impl ActionOutput {
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
        if rename_element(&self.element, name, "action output")? {
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

    pub fn public_name(&self) -> Option<String> {
        self.element
            .attribute(MAPPING_ATTR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn set_public_name(&self, public_name: Option<&str>) {
        if self.apply_public_name(public_name) {
            self.fire(DocumentEvent::IoChanged);
        }
    }

    pub(crate) fn apply_public_name(&self, public_name: Option<&str>) -> bool {
        let public_name = public_name.map(str::trim).filter(|p| !p.is_empty());
        if self.public_name().as_deref() == public_name {
            return false;
        }
        match public_name {
            Some(name) => self.element.set_attribute(MAPPING_ATTR, name),
            None => {
                self.element.remove_attribute(MAPPING_ATTR);
            }
        }
        true
    }

    pub fn action(&self) -> Option<ActionDefinition> {
        self.element
            .parent()
            .and_then(|outputs| outputs.parent())
            .filter(|a| a.has_name(ACTION_DEFINITION))
            .map(ActionDefinition::from_element)
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
                io: IoElement::ActionOutput(self.clone()),
            });
        }
    }

    pub(crate) fn fire(&self, make: fn(IoElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(IoElement::ActionOutput(self.clone())));
    }
}
