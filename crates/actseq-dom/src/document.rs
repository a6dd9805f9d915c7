//! The action sequence document.
//!
//! A document is a view over the `action-sequence` root of a tree. Any
//! entity can rebuild it by walking up to the root, and two views are equal
//! when they wrap the same root element.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::action::ActionDefinition;
use crate::config::DomConfig;
use crate::control::ControlStatement;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, IoElement, ResourceElement};
use crate::io::{validated_name, DocumentInput, DocumentOutput, DocumentResource, ResourceType};
use crate::names::{
    IoType, ACTIONS, ACTION_SEQUENCE, AUTHOR, DESCRIPTION, DOCUMENTATION, HELP, ICON, INPUTS,
    LOGGING_LEVEL, OUTPUTS, RESOURCES, RESULT_TYPE, TITLE, TYPE_ATTR, VERSION,
};
use crate::params::ParameterResolver;
use crate::tree::{Element, TreeId, XmlTree};
use crate::validation::ValidationError;
use crate::variables::{self, InputVariable};

/// Top-level header fields, kept ahead of the documentation block.
const TOP_HEADER: [&str; 3] = [TITLE, VERSION, LOGGING_LEVEL];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSequenceDocument {
    root: Element,
}

impl Default for ActionSequenceDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSequenceDocument {
    /// Create an empty document with settings from the environment
    /// (see [`DomConfig::load`]).
    pub fn new() -> Self {
        Self::with_config(DomConfig::load())
    }

    pub fn with_config(config: DomConfig) -> Self {
        let root = XmlTree::root_with_config(ACTION_SEQUENCE, config);
        for section in [DOCUMENTATION, INPUTS, OUTPUTS, RESOURCES, ACTIONS] {
            root.add_child(section);
        }
        debug!(tree = %root.tree_id(), "Created action sequence document");
        Self { root }
    }

    /// The document `element` belongs to, if it is attached to an action
    /// sequence.
    pub fn from_element(element: &Element) -> Option<Self> {
        element
            .root()
            .filter(|root| root.has_name(ACTION_SEQUENCE))
            .map(|root| Self { root })
    }

    pub fn id(&self) -> TreeId {
        self.root.tree_id()
    }

    pub fn root_element(&self) -> Element {
        self.root.clone()
    }

    pub fn tree(&self) -> &XmlTree {
        self.root.tree()
    }

    pub fn config(&self) -> DomConfig {
        self.tree().config()
    }

    pub fn set_config(&self, config: DomConfig) {
        self.tree().set_config(config);
    }

    /// Resolver used to substitute `{name}` placeholders in input values.
    pub fn set_parameter_resolver(&self, resolver: Option<Arc<dyn ParameterResolver>>) {
        self.tree().set_resolver(resolver);
    }

    // ---- header ----

    fn header_path(field: &str) -> String {
        if TOP_HEADER.contains(&field) {
            field.to_string()
        } else {
            format!("{}/{}", DOCUMENTATION, field)
        }
    }

    fn header(&self, field: &str) -> Option<String> {
        self.root
            .select_first(&Self::header_path(field))
            .map(|e| e.text())
            .filter(|t| !t.is_empty())
    }

    fn header_element(&self, field: &str) -> Element {
        if let Some(existing) = self.root.select_first(&Self::header_path(field)) {
            return existing;
        }
        if !TOP_HEADER.contains(&field) {
            return self.root.ensure_path(&Self::header_path(field));
        }
        // keep title, version and logging level in that order at the top
        let rank = TOP_HEADER.iter().position(|f| *f == field).unwrap_or(0);
        let position = self
            .root
            .children()
            .iter()
            .take_while(|c| {
                TOP_HEADER
                    .iter()
                    .position(|f| c.has_name(f))
                    .map(|r| r < rank)
                    .unwrap_or(false)
            })
            .count();
        let created = self.tree().create_element(field);
        match self.root.insert(position, &created) {
            Ok(inserted) => inserted,
            Err(_) => self.root.ensure_path(field),
        }
    }

    fn set_header(&self, field: &str, value: &str) {
        if self.header(field).as_deref().unwrap_or_default() == value {
            return;
        }
        self.header_element(field).set_text(value);
        events::fire(&DocumentEvent::HeaderChanged(self.clone()));
    }

    pub fn title(&self) -> Option<String> {
        self.header(TITLE)
    }

    pub fn set_title(&self, title: &str) {
        self.set_header(TITLE, title);
    }

    pub fn version(&self) -> Option<String> {
        self.header(VERSION)
    }

    pub fn set_version(&self, version: &str) {
        self.set_header(VERSION, version);
    }

    pub fn logging_level(&self) -> Option<String> {
        self.header(LOGGING_LEVEL)
    }

    pub fn set_logging_level(&self, level: &str) {
        self.set_header(LOGGING_LEVEL, level);
    }

    pub fn author(&self) -> Option<String> {
        self.header(AUTHOR)
    }

    pub fn set_author(&self, author: &str) {
        self.set_header(AUTHOR, author);
    }

    pub fn description(&self) -> Option<String> {
        self.header(DESCRIPTION)
    }

    pub fn set_description(&self, description: &str) {
        self.set_header(DESCRIPTION, description);
    }

    pub fn help(&self) -> Option<String> {
        self.header(HELP)
    }

    pub fn set_help(&self, help: &str) {
        self.set_header(HELP, help);
    }

    pub fn result_type(&self) -> Option<String> {
        self.header(RESULT_TYPE)
    }

    pub fn set_result_type(&self, result_type: &str) {
        self.set_header(RESULT_TYPE, result_type);
    }

    /// Location of the icon shown for the sequence.
    pub fn icon(&self) -> Option<String> {
        self.header(ICON)
    }

    pub fn set_icon(&self, icon: &str) {
        self.set_header(ICON, icon);
    }

    // ---- inputs ----

    fn section(&self, name: &str) -> Vec<Element> {
        self.root
            .child(name)
            .map(|s| s.children())
            .unwrap_or_default()
    }

    pub fn inputs(&self) -> Vec<DocumentInput> {
        self.section(INPUTS)
            .into_iter()
            .map(DocumentInput::from_element)
            .collect()
    }

    pub fn input(&self, name: &str) -> Option<DocumentInput> {
        self.root
            .child(INPUTS)?
            .child(name)
            .map(DocumentInput::from_element)
    }

    pub fn inputs_of_type(&self, types: &[IoType]) -> Vec<DocumentInput> {
        self.inputs()
            .into_iter()
            .filter(|i| types.contains(&i.io_type()))
            .collect()
    }

    /// Declare an input. An existing input only has its type updated.
    pub fn add_input(&self, name: &str, io_type: impl Into<IoType>) -> DomResult<DocumentInput> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        if let Some(existing) = self.input(&name) {
            existing.set_type(io_type);
            return Ok(existing);
        }
        let element = self.root.ensure_path(INPUTS).add_child(&name);
        element.set_attribute(TYPE_ATTR, io_type.as_str());
        let input = DocumentInput::from_element(element);
        events::fire(&DocumentEvent::IoAdded(IoElement::DocumentInput(input.clone())));
        Ok(input)
    }

    pub fn remove_input(&self, name: &str) -> bool {
        match self.input(name) {
            Some(input) => {
                input.delete();
                true
            }
            None => false,
        }
    }

    // ---- outputs ----

    pub fn outputs(&self) -> Vec<DocumentOutput> {
        self.section(OUTPUTS)
            .into_iter()
            .map(DocumentOutput::from_element)
            .collect()
    }

    pub fn output(&self, name: &str) -> Option<DocumentOutput> {
        self.root
            .child(OUTPUTS)?
            .child(name)
            .map(DocumentOutput::from_element)
    }

    pub fn outputs_of_type(&self, types: &[IoType]) -> Vec<DocumentOutput> {
        self.outputs()
            .into_iter()
            .filter(|o| types.contains(&o.io_type()))
            .collect()
    }

    /// Declare an output. An existing output only has its type updated.
    pub fn add_output(&self, name: &str, io_type: impl Into<IoType>) -> DomResult<DocumentOutput> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        if let Some(existing) = self.output(&name) {
            existing.set_type(io_type);
            return Ok(existing);
        }
        let element = self.root.ensure_path(OUTPUTS).add_child(&name);
        element.set_attribute(TYPE_ATTR, io_type.as_str());
        let output = DocumentOutput::from_element(element);
        events::fire(&DocumentEvent::IoAdded(IoElement::DocumentOutput(output.clone())));
        Ok(output)
    }

    pub fn remove_output(&self, name: &str) -> bool {
        match self.output(name) {
            Some(output) => {
                output.delete();
                true
            }
            None => false,
        }
    }

    // ---- resources ----

    pub fn resources(&self) -> Vec<DocumentResource> {
        self.section(RESOURCES)
            .into_iter()
            .map(DocumentResource::from_element)
            .collect()
    }

    pub fn resource(&self, name: &str) -> Option<DocumentResource> {
        self.root
            .child(RESOURCES)?
            .child(name)
            .map(DocumentResource::from_element)
    }

    /// Append a resource. For inline types `path` is taken as the content.
    pub fn add_resource(
        &self,
        name: &str,
        resource_type: ResourceType,
        path: &str,
        mime_type: Option<&str>,
    ) -> DomResult<DocumentResource> {
        let len = self.resources().len();
        self.insert_resource(len, name, resource_type, path, mime_type)
    }

    /// Insert a resource at `index`; `index` may equal the resource count
    /// but not exceed it.
    pub fn insert_resource(
        &self,
        index: usize,
        name: &str,
        resource_type: ResourceType,
        path: &str,
        mime_type: Option<&str>,
    ) -> DomResult<DocumentResource> {
        let name = validated_name(name)?;
        let resources = self.root.ensure_path(RESOURCES);
        let len = resources.child_count();
        if index > len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        if resources.child(&name).is_some() {
            return Err(DomError::DuplicateName {
                namespace: "resource",
                name,
            });
        }

        // configured while detached so that only the addition is announced
        let resource = DocumentResource::from_element(self.tree().create_element(&name));
        resource.set_type(resource_type);
        if !path.is_empty() {
            match resource_type {
                ResourceType::String => resource.set_string_content(path)?,
                ResourceType::Xml => resource.set_xml_content(path)?,
                _ => resource.set_path(path)?,
            }
        }
        if let Some(mime_type) = mime_type {
            resource.set_mime_type(mime_type)?;
        }

        let element = resources.insert(index, resource.element())?;
        let resource = DocumentResource::from_element(element);
        debug!(resource = %resource.name(), %resource_type, "Added document resource");
        events::fire(&DocumentEvent::ResourceAdded(ResourceElement::Document(
            resource.clone(),
        )));
        Ok(resource)
    }

    pub fn remove_resource(&self, name: &str) -> bool {
        match self.resource(name) {
            Some(resource) => {
                resource.delete();
                true
            }
            None => false,
        }
    }

    // ---- statements ----

    /// The top-level sequence.
    pub fn root(&self) -> ControlStatement {
        ControlStatement::sequence(self.root.ensure_path(ACTIONS))
    }

    /// Every action in the document, in document order.
    pub fn all_action_definitions(&self) -> Vec<ActionDefinition> {
        self.root().all_action_definitions()
    }

    /// Variables available after the last top-level statement.
    pub fn available_variables(&self, io_type: Option<&IoType>) -> Vec<InputVariable> {
        variables::closing_variables(self.root().element(), io_type)
    }

    /// Validate every statement of the document.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.root().validate(true)
    }

    /// Structural problems that the mutating API prevents but parsed
    /// documents may contain: resources with several type structures and
    /// names declared twice in one namespace.
    pub fn check_integrity(&self) -> Vec<DomError> {
        let mut problems = Vec::new();
        for resource in self.resources() {
            if let Err(err) = resource.try_resource_type() {
                problems.push(err);
            }
        }
        problems.extend(duplicate_names(self.section(INPUTS), "input"));
        problems.extend(duplicate_names(self.section(OUTPUTS), "output"));
        problems.extend(duplicate_names(self.section(RESOURCES), "resource"));
        for action in self.all_action_definitions() {
            problems.extend(duplicate_names(
                action.input_params().iter().map(|i| i.element().clone()).collect(),
                "action input",
            ));
            problems.extend(duplicate_names(
                action.outputs().iter().map(|o| o.element().clone()).collect(),
                "action output",
            ));
            problems.extend(duplicate_names(
                action.resources().iter().map(|r| r.element().clone()).collect(),
                "action resource",
            ));
        }
        problems
    }

    /// Render the document as XML text.
    pub fn to_xml(&self) -> String {
        self.tree().to_xml()
    }
}

fn duplicate_names(elements: Vec<Element>, namespace: &'static str) -> Vec<DomError> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut problems = Vec::new();
    for element in elements {
        let name = element.name();
        if !seen.insert(name.clone()) && reported.insert(name.clone()) {
            problems.push(DomError::DuplicateName { namespace, name });
        }
    }
    problems
}
