use crate::document::ActionSequenceDocument;
use crate::error::DomResult;
use crate::events::{self, DocumentEvent, EventParent, IoElement};
use crate::names::{IoType, DESTINATIONS};
use crate::tree::Element;

use super::{
    clear_bindings, insert_binding, io_type_of, read_bindings, rename_element, set_io_type,
    IoBinding,
};

/// An output published by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutput {
    element: Element,
}

impl DocumentOutput {
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
        if rename_element(&self.element, name, "output")? {
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

    /// Where the runtime delivers the value.
    pub fn destinations(&self) -> Vec<IoBinding> {
        read_bindings(&self.element, DESTINATIONS)
    }

    pub fn add_destination(&self, scope: &str, name: &str) -> DomResult<()> {
        insert_binding(&self.element, DESTINATIONS, None, &IoBinding::new(scope, name))?;
        self.fire(DocumentEvent::IoChanged);
        Ok(())
    }

    pub fn insert_destination(&self, index: usize, scope: &str, name: &str) -> DomResult<()> {
        insert_binding(
            &self.element,
            DESTINATIONS,
            Some(index),
            &IoBinding::new(scope, name),
        )?;
        self.fire(DocumentEvent::IoChanged);
        Ok(())
    }

    pub fn clear_destinations(&self) {
        if clear_bindings(&self.element, DESTINATIONS) {
            self.fire(DocumentEvent::IoChanged);
        }
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(&self.element)
    }

    pub fn delete(&self) {
        let document = self.document();
        self.element.detach();
        if let Some(document) = document {
            events::fire(&DocumentEvent::IoRemoved {
                parent: EventParent::Document(document),
                io: IoElement::DocumentOutput(self.clone()),
            });
        }
    }

    fn fire(&self, make: fn(IoElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(IoElement::DocumentOutput(self.clone())));
    }
}
