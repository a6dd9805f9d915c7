use crate::document::ActionSequenceDocument;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, EventParent, ResourceElement};
use crate::io::{rename_element, validated_name, DocumentResource, ResourceType};
use crate::names::{ACTION_DEFINITION, MAPPING_ATTR};
use crate::tree::Element;

use super::ActionDefinition;

/// A resource declared on an action.
///
/// The element name is the private name; the `mapping` attribute names the
/// document resource when it differs. Location, type and mime type live on
/// that document resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResource {
    element: Element,
}

impl ActionResource {
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
        if rename_element(&self.element, name, "action resource")? {
            self.fire(DocumentEvent::ResourceRenamed);
        }
        Ok(())
    }

    pub fn mapping(&self) -> Option<String> {
        self.element.attribute(MAPPING_ATTR).filter(|m| !m.is_empty())
    }

    pub fn set_mapping(&self, mapping: Option<&str>) {
        let mapping = mapping.filter(|m| !m.is_empty());
        if self.mapping().as_deref() == mapping {
            return;
        }
        match mapping {
            Some(m) => self.element.set_attribute(MAPPING_ATTR, m),
            None => {
                self.element.remove_attribute(MAPPING_ATTR);
            }
        }
        self.fire(DocumentEvent::ResourceChanged);
    }

    /// Name of the document resource this resource points at.
    pub fn public_name(&self) -> String {
        self.mapping().unwrap_or_else(|| self.name())
    }

    pub fn document_resource(&self) -> Option<DocumentResource> {
        self.document()?.resource(&self.public_name())
    }

    pub fn resource_type(&self) -> Option<ResourceType> {
        self.document_resource()?.resource_type()
    }

    pub fn mime_type(&self) -> Option<String> {
        self.document_resource()?.mime_type()
    }

    pub fn uri(&self) -> Option<String> {
        self.document_resource()?.uri()
    }

    fn ensure_document_resource(&self) -> DomResult<DocumentResource> {
        let document = self
            .document()
            .ok_or_else(|| DomError::NotInDocument(self.name()))?;
        let name = self.public_name();
        match document.resource(&name) {
            Some(existing) => Ok(existing),
            None => document.add_resource(&name, ResourceType::SolutionFile, "", None),
        }
    }

    /// Point the backing document resource at `uri`, declaring it first if
    /// the document does not have it yet.
    pub fn set_uri(&self, uri: &str) -> DomResult<()> {
        self.ensure_document_resource()?.set_uri(uri)
    }

    pub fn set_mime_type(&self, mime_type: &str) -> DomResult<()> {
        self.ensure_document_resource()?.set_mime_type(mime_type)
    }

    pub fn action(&self) -> Option<ActionDefinition> {
        self.element
            .parent()
            .and_then(|resources| resources.parent())
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
            events::fire(&DocumentEvent::ResourceRemoved {
                parent: EventParent::Action(action),
                resource: ResourceElement::Action(self.clone()),
            });
        }
    }

    fn fire(&self, make: fn(ResourceElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(ResourceElement::Action(self.clone())));
    }
}

/// A document resource seen through an action that does not declare it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitResource {
    action: ActionDefinition,
    source: DocumentResource,
}

impl ImplicitResource {
    pub fn name(&self) -> String {
        self.source.name()
    }

    pub fn action(&self) -> &ActionDefinition {
        &self.action
    }

    pub fn document_resource(&self) -> &DocumentResource {
        &self.source
    }

    /// Declare the resource on the action.
    pub fn materialize(&self) -> DomResult<ActionResource> {
        let (resource, created) = self.materialize_quietly()?;
        if created {
            resource.fire(DocumentEvent::ResourceAdded);
        }
        Ok(resource)
    }

    /// Declare the resource without an event; also reports whether a new
    /// declaration was written.
    fn materialize_quietly(&self) -> DomResult<(ActionResource, bool)> {
        let name = validated_name(&self.name())?;
        match self.action.explicit_resource(&name) {
            Some(existing) => Ok((existing, false)),
            None => Ok((self.action.declare_resource(&name, None), true)),
        }
    }
}

/// Result of a resource lookup on an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceView {
    Explicit(ActionResource),
    Implicit(ImplicitResource),
}

impl ResourceView {
    pub(crate) fn implicit(action: ActionDefinition, source: DocumentResource) -> Self {
        ResourceView::Implicit(ImplicitResource { action, source })
    }

    pub fn name(&self) -> String {
        match self {
            ResourceView::Explicit(resource) => resource.name(),
            ResourceView::Implicit(resource) => resource.name(),
        }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self, ResourceView::Implicit(_))
    }

    pub fn document_resource(&self) -> Option<DocumentResource> {
        match self {
            ResourceView::Explicit(resource) => resource.document_resource(),
            ResourceView::Implicit(resource) => Some(resource.source.clone()),
        }
    }

    pub fn public_name(&self) -> String {
        match self {
            ResourceView::Explicit(resource) => resource.public_name(),
            ResourceView::Implicit(resource) => resource.name(),
        }
    }

    pub fn resource_type(&self) -> Option<ResourceType> {
        self.document_resource()?.resource_type()
    }

    pub fn mime_type(&self) -> Option<String> {
        self.document_resource()?.mime_type()
    }

    pub fn uri(&self) -> Option<String> {
        self.document_resource()?.uri()
    }

    /// Turn an implicit view into an explicit resource on the action.
    pub fn materialize(&mut self) -> DomResult<ActionResource> {
        match self {
            ResourceView::Explicit(resource) => Ok(resource.clone()),
            ResourceView::Implicit(implicit) => {
                let explicit = implicit.materialize()?;
                *self = ResourceView::Explicit(explicit.clone());
                Ok(explicit)
            }
        }
    }

    /// Apply `edit` to the explicit resource, declaring it first if the view
    /// is implicit. `edit` reports whether it announced a change; a
    /// declaration that no edit announced is announced as added. A failed
    /// edit withdraws the declaration it caused.
    fn edit<F>(&mut self, edit: F) -> DomResult<()>
    where
        F: FnOnce(&ActionResource, bool) -> DomResult<bool>,
    {
        let (resource, created) = match self {
            ResourceView::Explicit(resource) => (resource.clone(), false),
            ResourceView::Implicit(implicit) => implicit.materialize_quietly()?,
        };
        match edit(&resource, created) {
            Ok(announced) => {
                if created && !announced {
                    resource.fire(DocumentEvent::ResourceAdded);
                }
                *self = ResourceView::Explicit(resource);
                Ok(())
            }
            Err(err) => {
                if created {
                    resource.element().detach();
                }
                Err(err)
            }
        }
    }

    pub fn set_name(&mut self, name: &str) -> DomResult<()> {
        self.edit(|resource, created| {
            let old = resource.name();
            if created {
                // the declaration keeps pointing at the inherited document resource
                resource.element().set_attribute(MAPPING_ATTR, &old);
            }
            resource.set_name(name)?;
            Ok(resource.name() != old)
        })
    }

    pub fn set_mapping(&mut self, mapping: Option<&str>) -> DomResult<()> {
        self.edit(|resource, _| {
            let old = resource.mapping();
            resource.set_mapping(mapping);
            Ok(resource.mapping() != old)
        })
    }

    pub fn set_uri(&mut self, uri: &str) -> DomResult<()> {
        self.edit(|resource, _| {
            let old = resource.uri();
            resource.set_uri(uri)?;
            Ok(resource.uri() != old)
        })
    }

    pub fn set_mime_type(&mut self, mime_type: &str) -> DomResult<()> {
        self.edit(|resource, _| {
            let old = resource.mime_type();
            resource.set_mime_type(mime_type)?;
            Ok(resource.mime_type() != old)
        })
    }

    /// Remove the explicit declaration. Implicit views have nothing to
    /// remove.
    pub fn delete(&self) {
        if let ResourceView::Explicit(resource) = self {
            resource.delete();
        }
    }
}
