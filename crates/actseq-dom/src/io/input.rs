use crate::document::ActionSequenceDocument;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, EventParent, IoElement};
use crate::names::{IoType, SOURCES};
use crate::tree::Element;

use super::{
    clear_bindings, clear_default, has_stored_default, insert_binding, io_type_of, read_bindings,
    read_default, rename_element, set_io_type, write_default, DefaultValue, InputValue, IoBinding,
};

/// An input declared by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    element: Element,
}

impl DocumentInput {
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
        if rename_element(&self.element, name, "input")? {
            self.fire(DocumentEvent::IoRenamed);
        }
        Ok(())
    }

    pub fn io_type(&self) -> IoType {
        io_type_of(&self.element)
    }

    /// Change the declared type. Any default value is dropped since its
    /// shape follows the type.
    pub fn set_type(&self, io_type: impl Into<IoType>) {
        let io_type = io_type.into();
        if set_io_type(&self.element, &io_type) {
            clear_default(&self.element);
            self.fire(DocumentEvent::IoChanged);
        }
    }

    /// The default value, in the shape implied by the declared type.
    pub fn default_value(&self) -> Option<DefaultValue> {
        read_default(&self.element, self.io_type().value_shape())
    }

    pub fn has_default_value(&self) -> bool {
        self.default_value().is_some()
    }

    /// Store `value` as the default, or remove the default with `None`.
    /// The value's shape must match the declared type.
    pub fn set_default_value(&self, value: Option<DefaultValue>) -> DomResult<()> {
        let io_type = self.io_type();
        let unchanged = match &value {
            Some(value) => {
                if value.shape() != io_type.value_shape() {
                    return Err(DomError::DefaultValueShapeMismatch {
                        input: self.name(),
                        io_type: io_type.as_str().to_string(),
                        shape: value.shape(),
                    });
                }
                read_default(&self.element, value.shape()).as_ref() == Some(value)
            }
            None => !has_stored_default(&self.element),
        };
        if unchanged {
            return Ok(());
        }
        write_default(&self.element, value.as_ref());
        self.fire(DocumentEvent::IoChanged);
        Ok(())
    }

    /// Where the runtime looks the value up, in priority order.
    pub fn sources(&self) -> Vec<IoBinding> {
        read_bindings(&self.element, SOURCES)
    }

    pub fn add_source(&self, scope: &str, name: &str) -> DomResult<()> {
        insert_binding(&self.element, SOURCES, None, &IoBinding::new(scope, name))?;
        self.fire(DocumentEvent::IoChanged);
        Ok(())
    }

    /// Insert a source at `index`. Fails with `IndexOutOfRange` when
    /// `index` is past the end of the list.
    pub fn insert_source(&self, index: usize, scope: &str, name: &str) -> DomResult<()> {
        insert_binding(&self.element, SOURCES, Some(index), &IoBinding::new(scope, name))?;
        self.fire(DocumentEvent::IoChanged);
        Ok(())
    }

    pub fn clear_sources(&self) {
        if clear_bindings(&self.element, SOURCES) {
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
                io: IoElement::DocumentInput(self.clone()),
            });
        }
    }

    fn fire(&self, make: fn(IoElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(IoElement::DocumentInput(self.clone())));
    }
}

impl InputValue for DocumentInput {
    fn raw_value(&self) -> Option<String> {
        match self.default_value()? {
            DefaultValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    fn value_element(&self) -> &Element {
        &self.element
    }
}
