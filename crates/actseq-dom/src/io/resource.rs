use std::fmt;
use tracing::warn;
use url::Url;

use crate::document::ActionSequenceDocument;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, EventParent, ResourceElement};
use crate::names::{CONTENT, LOCATION, MIME_TYPE};
use crate::tree::Element;

use super::rename_element;

/// Storage variant of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    SolutionFile,
    File,
    Url,
    Xml,
    String,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::SolutionFile,
        ResourceType::File,
        ResourceType::Url,
        ResourceType::Xml,
        ResourceType::String,
    ];

    pub fn element_name(self) -> &'static str {
        match self {
            ResourceType::SolutionFile => "solution-file",
            ResourceType::File => "file",
            ResourceType::Url => "url",
            ResourceType::Xml => "xml",
            ResourceType::String => "string",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.element_name() == name)
    }

    /// Whether the content lives at a location rather than inline.
    pub fn supports_location(self) -> bool {
        matches!(
            self,
            ResourceType::SolutionFile | ResourceType::File | ResourceType::Url
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

const SOLUTION_SCHEME: &str = "solution";
const FILE_SCHEME: &str = "file";

/// Split a URI into the resource type and path it stands for.
///
/// `solution:` and `file:` URIs keep the scheme-specific part as path,
/// other absolute URLs are kept whole, anything that does not parse as a
/// URL is taken as a plain file path.
pub(crate) fn classify_uri(uri: &str) -> (ResourceType, String) {
    match Url::parse(uri) {
        Ok(url) => {
            let rest = uri
                .split_once(':')
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_default();
            match url.scheme() {
                SOLUTION_SCHEME => (ResourceType::SolutionFile, rest),
                FILE_SCHEME => (ResourceType::File, rest),
                _ => (ResourceType::Url, uri.to_string()),
            }
        }
        Err(_) => (ResourceType::File, uri.to_string()),
    }
}

/// A resource declared by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResource {
    element: Element,
}

impl DocumentResource {
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
        if rename_element(&self.element, name, "resource")? {
            self.fire(DocumentEvent::ResourceRenamed);
        }
        Ok(())
    }

    fn type_elements(&self) -> Vec<(ResourceType, Element)> {
        self.element
            .children()
            .into_iter()
            .filter_map(|c| ResourceType::from_element_name(&c.name()).map(|t| (t, c)))
            .collect()
    }

    fn type_element(&self) -> Option<(ResourceType, Element)> {
        let mut found = self.type_elements();
        if found.len() == 1 {
            found.pop()
        } else {
            None
        }
    }

    /// The resource type, or an error when more than one type structure is
    /// present.
    pub fn try_resource_type(&self) -> DomResult<Option<ResourceType>> {
        let found = self.type_elements();
        match found.len() {
            0 => Ok(None),
            1 => Ok(Some(found[0].0)),
            _ => Err(DomError::AmbiguousResourceType(self.name())),
        }
    }

    /// The resource type; `None` when undeclared or ambiguous.
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self.try_resource_type() {
            Ok(resource_type) => resource_type,
            Err(err) => {
                warn!(resource = %self.name(), "{}", err);
                None
            }
        }
    }

    /// Switch to another storage variant, carrying over the existing type
    /// structure. Location-less variants hold inline content instead.
    pub fn set_type(&self, resource_type: ResourceType) {
        if self.apply_type(resource_type) {
            self.fire(DocumentEvent::ResourceChanged);
        }
    }

    fn apply_type(&self, resource_type: ResourceType) -> bool {
        let mut present = self.type_elements();
        if present.len() == 1 && present[0].0 == resource_type {
            return false;
        }
        if present.len() > 1 {
            for (_, stale) in present.drain(..) {
                stale.detach();
            }
        }

        let type_element = match present.pop() {
            Some((_, existing)) => {
                existing.set_name(resource_type.element_name());
                existing
            }
            None => self.element.add_child(resource_type.element_name()),
        };

        let (keep, drop) = if resource_type.supports_location() {
            (LOCATION, CONTENT)
        } else {
            (CONTENT, LOCATION)
        };
        for stale in type_element.children_named(drop) {
            stale.detach();
        }
        if type_element.child(keep).is_none() {
            type_element.insert_new_child(0, keep);
        }
        type_element.ensure_path(MIME_TYPE);
        true
    }

    pub fn mime_type(&self) -> Option<String> {
        let (_, type_element) = self.type_element()?;
        let mime = type_element.child(MIME_TYPE)?.text();
        (!mime.is_empty()).then_some(mime)
    }

    pub fn set_mime_type(&self, mime_type: &str) -> DomResult<()> {
        let (_, type_element) = self.require_type("a mime type")?;
        let mime = type_element.ensure_path(MIME_TYPE);
        if mime.text() != mime_type {
            mime.set_text(mime_type);
            self.fire(DocumentEvent::ResourceChanged);
        }
        Ok(())
    }

    /// Location of the content, for location-based variants.
    pub fn path(&self) -> Option<String> {
        let (_, type_element) = self.type_element()?;
        type_element.child(LOCATION).map(|l| l.text())
    }

    pub fn set_path(&self, path: &str) -> DomResult<()> {
        if self.apply_path(path)? {
            self.fire(DocumentEvent::ResourceChanged);
        }
        Ok(())
    }

    fn apply_path(&self, path: &str) -> DomResult<bool> {
        let (resource_type, type_element) = self.require_type("a location")?;
        if !resource_type.supports_location() {
            return Err(self.unsupported("a location"));
        }
        let location = type_element.ensure_path(LOCATION);
        if location.text() == path {
            return Ok(false);
        }
        location.set_text(path);
        Ok(true)
    }

    /// URI form of the location: `solution:` and `file:` paths, or the URL
    /// itself.
    pub fn uri(&self) -> Option<String> {
        let resource_type = self.resource_type()?;
        let path = self.path()?;
        match resource_type {
            ResourceType::SolutionFile => Some(format!("{}:{}", SOLUTION_SCHEME, path)),
            ResourceType::File => Some(format!("{}:{}", FILE_SCHEME, path)),
            ResourceType::Url => Some(path),
            ResourceType::Xml | ResourceType::String => None,
        }
    }

    /// Set type and location from a URI in one change.
    pub fn set_uri(&self, uri: &str) -> DomResult<()> {
        let (resource_type, path) = classify_uri(uri);
        let type_changed = self.apply_type(resource_type);
        let path_changed = self.apply_path(&path)?;
        if type_changed || path_changed {
            self.fire(DocumentEvent::ResourceChanged);
        }
        Ok(())
    }

    /// Inline text of a `string` resource.
    pub fn string_content(&self) -> Option<String> {
        self.inline_content(ResourceType::String)
    }

    pub fn set_string_content(&self, content: &str) -> DomResult<()> {
        self.set_inline_content(ResourceType::String, content)
    }

    /// Inline markup of an `xml` resource.
    pub fn xml_content(&self) -> Option<String> {
        self.inline_content(ResourceType::Xml)
    }

    pub fn set_xml_content(&self, content: &str) -> DomResult<()> {
        self.set_inline_content(ResourceType::Xml, content)
    }

    fn inline_content(&self, expected: ResourceType) -> Option<String> {
        let (resource_type, type_element) = self.type_element()?;
        if resource_type != expected {
            return None;
        }
        type_element.child(CONTENT).map(|c| c.text())
    }

    fn set_inline_content(&self, expected: ResourceType, content: &str) -> DomResult<()> {
        let (resource_type, type_element) = self.require_type("inline content")?;
        if resource_type != expected {
            return Err(self.unsupported("inline content"));
        }
        let content_element = type_element.ensure_path(CONTENT);
        if content_element.text() != content {
            content_element.set_cdata(content);
            self.fire(DocumentEvent::ResourceChanged);
        }
        Ok(())
    }

    fn require_type(&self, operation: &'static str) -> DomResult<(ResourceType, Element)> {
        self.try_resource_type()?;
        self.type_element().ok_or_else(|| self.unsupported(operation))
    }

    fn unsupported(&self, operation: &'static str) -> DomError {
        DomError::UnsupportedResourceOperation {
            resource: self.name(),
            operation,
        }
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(&self.element)
    }

    pub fn delete(&self) {
        let document = self.document();
        self.element.detach();
        if let Some(document) = document {
            events::fire(&DocumentEvent::ResourceRemoved {
                parent: EventParent::Document(document),
                resource: ResourceElement::Document(self.clone()),
            });
        }
    }

    fn fire(&self, make: fn(ResourceElement) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || {
            make(ResourceElement::Document(self.clone()))
        });
    }
}
