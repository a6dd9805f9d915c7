//! Action definitions: one executable step of a sequence.
//!
//! An action owns three private namespaces (inputs, outputs, resources)
//! and an opaque component definition holding type-specific settings.
//! Each private input name is backed either by a variable reference under
//! `action-inputs` or by a constant in the component definition, never
//! both.

mod input;
mod output;
mod registry;
mod resource;

pub use input::{ActionInput, ActionInputConstant, ActionInputSource};
pub use output::ActionOutput;
pub use registry::{action_registry, install_action_registry, ActionRegistry, ActionVariant};
pub use resource::{ActionResource, ImplicitResource, ResourceView};

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::control::ControlStatement;
use crate::document::ActionSequenceDocument;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, EventParent, ResourceElement};
use crate::io::{set_io_type, validated_name};
use crate::names::{
    IoType, ACTION_DEFINITION, ACTION_INPUTS, ACTION_OUTPUTS, ACTION_RESOURCES, ACTION_TYPE,
    COMPONENT_DEFINITION, COMPONENT_NAME, MAPPING_ATTR, RESOURCE_TYPE_NAME, TYPE_ATTR,
};
use crate::params::{parameter_references, rename_parameter_references};
use crate::tree::{Element, XmlTree};
use crate::validation::{ValidationError, ValidationErrorKind};
use crate::variables::{self, InputVariable};

/// View over an `action-definition` element.
#[derive(Clone)]
pub struct ActionDefinition {
    element: Element,
    variant: Option<Arc<dyn ActionVariant>>,
}

impl PartialEq for ActionDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl Eq for ActionDefinition {}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("component", &self.component_name())
            .field("variant", &self.variant_id())
            .field("element", &self.element)
            .finish()
    }
}

fn short_component_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl ActionDefinition {
    /// Create a detached, generic action for `component_name`.
    pub fn new(component_name: &str) -> Self {
        Self::from_element(Self::new_element(&XmlTree::fragment(), component_name))
    }

    /// Create a detached action of `variant`, initialised by the variant.
    pub fn of_variant(variant: Arc<dyn ActionVariant>) -> Self {
        Self::in_tree_of_variant(&XmlTree::fragment(), variant)
    }

    pub(crate) fn in_tree_of_variant(tree: &XmlTree, variant: Arc<dyn ActionVariant>) -> Self {
        let element = Self::new_element(tree, variant.component_name());
        let action = Self {
            element,
            variant: Some(variant.clone()),
        };
        variant.initialize(&action);
        action
    }

    pub(crate) fn new_element(tree: &XmlTree, component_name: &str) -> Element {
        let element = tree.create_element(ACTION_DEFINITION);
        element.add_child(COMPONENT_NAME).set_text(component_name);
        element.add_child(ACTION_INPUTS);
        element.add_child(ACTION_OUTPUTS);
        element.add_child(COMPONENT_DEFINITION);
        element
    }

    /// Wrap an existing element, resolving its variant through the
    /// process-wide registry.
    pub fn from_element(element: Element) -> Self {
        let generic = Self::generic(element);
        let variant = action_registry().resolve(&generic);
        Self { variant, ..generic }
    }

    fn generic(element: Element) -> Self {
        Self {
            element,
            variant: None,
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Point the view at a copy of its element, keeping the variant.
    pub(crate) fn rebind(&mut self, element: Element) {
        self.element = element;
    }

    pub fn variant(&self) -> Option<&Arc<dyn ActionVariant>> {
        self.variant.as_ref()
    }

    pub fn variant_id(&self) -> Option<&str> {
        self.variant.as_ref().map(|v| v.id())
    }

    // ---- naming ----

    pub fn component_name(&self) -> String {
        self.element
            .child(COMPONENT_NAME)
            .map(|c| c.text().trim().to_string())
            .unwrap_or_default()
    }

    pub fn set_component_name(&self, component_name: &str) {
        if self.component_name() == component_name {
            return;
        }
        self.element
            .ensure_path(COMPONENT_NAME)
            .set_text(component_name);
        self.fire(DocumentEvent::ActionRenamed);
    }

    /// Compare component names, ignoring any package qualifier.
    pub fn has_component_name(&self, component_name: &str) -> bool {
        let own = self.component_name();
        own == component_name || short_component_name(&own) == short_component_name(component_name)
    }

    pub fn description(&self) -> Option<String> {
        self.element
            .child(ACTION_TYPE)
            .map(|d| d.text())
            .filter(|d| !d.is_empty())
    }

    pub fn set_description(&self, description: Option<&str>) {
        let description = description.filter(|d| !d.is_empty());
        if self.description().as_deref() == description {
            return;
        }
        match description {
            Some(text) => self.element.ensure_path(ACTION_TYPE).set_text(text),
            None => {
                if let Some(existing) = self.element.child(ACTION_TYPE) {
                    existing.detach();
                }
            }
        }
        self.fire(DocumentEvent::ActionRenamed);
    }

    // ---- inputs ----

    pub fn input_params(&self) -> Vec<ActionInput> {
        self.element
            .child(ACTION_INPUTS)
            .map(|inputs| {
                inputs
                    .children()
                    .into_iter()
                    .map(ActionInput::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn input_param(&self, name: &str) -> Option<ActionInput> {
        self.element
            .child(ACTION_INPUTS)?
            .child(name)
            .map(ActionInput::from_element)
    }

    pub fn inputs_of_type(&self, types: &[IoType]) -> Vec<ActionInput> {
        self.input_params()
            .into_iter()
            .filter(|i| types.contains(&i.io_type()))
            .collect()
    }

    /// Leaf settings of the component definition that are not shadowed by
    /// a variable input.
    pub fn input_constants(&self) -> Vec<ActionInputConstant> {
        let Some(definition) = self.component_definition() else {
            return Vec::new();
        };
        let params: Vec<String> = self.input_params().iter().map(ActionInput::name).collect();
        definition
            .children()
            .into_iter()
            .filter(|c| !c.has_children() && !params.contains(&c.name()))
            .map(ActionInputConstant::from_element)
            .collect()
    }

    pub fn input_constant(&self, name: &str) -> Option<ActionInputConstant> {
        self.component_definition()?
            .child(name)
            .filter(|c| !c.has_children())
            .map(ActionInputConstant::from_element)
    }

    /// Variable inputs first, then constants.
    pub fn inputs(&self) -> Vec<ActionInputSource> {
        let mut inputs: Vec<ActionInputSource> = self
            .input_params()
            .into_iter()
            .map(ActionInputSource::Variable)
            .collect();
        inputs.extend(self.input_constants().into_iter().map(ActionInputSource::Constant));
        inputs
    }

    pub fn input(&self, name: &str) -> Option<ActionInputSource> {
        if let Some(param) = self.input_param(name) {
            return Some(ActionInputSource::Variable(param));
        }
        self.input_constant(name).map(ActionInputSource::Constant)
    }

    fn detach_constant(&self, name: &str) -> bool {
        self.component_definition()
            .and_then(|d| d.child(name))
            .map(|c| c.detach())
            .unwrap_or(false)
    }

    fn create_input_element(&self, name: &str, io_type: &IoType, variable: Option<&str>) -> ActionInput {
        let element = self.element.ensure_path(ACTION_INPUTS).add_child(name);
        element.set_attribute(TYPE_ATTR, io_type.as_str());
        if let Some(variable) = variable.filter(|v| *v != name) {
            element.set_attribute(MAPPING_ATTR, variable);
        }
        ActionInput::from_element(element)
    }

    /// Declare a variable input. An existing input only has its type
    /// updated; a constant of the same name is replaced.
    pub fn add_input(&self, name: &str, io_type: impl Into<IoType>) -> DomResult<ActionInput> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        if let Some(existing) = self.input_param(&name) {
            existing.set_type(io_type);
            return Ok(existing);
        }
        self.detach_constant(&name);
        let input = self.create_input_element(&name, &io_type, None);
        input.fire(DocumentEvent::IoAdded);
        Ok(input)
    }

    /// Store a constant value for `name` in the component definition,
    /// replacing any variable input of that name. `None` removes both.
    pub fn set_input_value(
        &self,
        name: &str,
        value: Option<&str>,
    ) -> DomResult<Option<ActionInputConstant>> {
        let use_cdata = self.element.tree().config().constants_use_cdata;
        self.set_input_value_with_cdata(name, value, use_cdata)
    }

    pub fn set_input_value_with_cdata(
        &self,
        name: &str,
        value: Option<&str>,
        use_cdata: bool,
    ) -> DomResult<Option<ActionInputConstant>> {
        let name = validated_name(name)?;
        let removed_param = self
            .input_param(&name)
            .map(|p| p.element().detach())
            .unwrap_or(false);

        let Some(value) = value else {
            if self.detach_constant(&name) || removed_param {
                self.fire_changed();
            }
            return Ok(None);
        };

        let definition = self.element.ensure_path(COMPONENT_DEFINITION);
        let constant = match definition.child(&name) {
            Some(existing) => existing,
            None => definition.add_child(&name),
        };
        let changed =
            removed_param || constant.text() != value || constant.is_cdata() != use_cdata;
        if use_cdata {
            constant.set_cdata(value);
        } else {
            constant.set_text(value);
        }
        if changed {
            self.fire_changed();
        }
        Ok(Some(ActionInputConstant::from_element(constant)))
    }

    /// Bind `name` to `variable`, replacing any constant of that name.
    /// `None` removes the input and the constant.
    pub fn set_input_param(
        &self,
        name: &str,
        variable: Option<&str>,
        io_type: impl Into<IoType>,
    ) -> DomResult<Option<ActionInput>> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        let Some(variable) = variable.map(str::trim).filter(|v| !v.is_empty()) else {
            let removed_constant = self.detach_constant(&name);
            match self.input_param(&name) {
                Some(param) => param.delete(),
                None if removed_constant => self.fire_changed(),
                None => {}
            }
            return Ok(None);
        };

        let removed_constant = self.detach_constant(&name);
        if let Some(existing) = self.input_param(&name) {
            let type_changed = set_io_type(existing.element(), &io_type);
            let reference_changed = existing.apply_reference(variable);
            if type_changed || reference_changed || removed_constant {
                existing.fire(DocumentEvent::IoChanged);
            }
            return Ok(Some(existing));
        }

        let input = self.create_input_element(&name, &io_type, Some(variable));
        input.fire(DocumentEvent::IoAdded);
        Ok(Some(input))
    }

    /// Remove a variable input or constant. Returns whether anything was
    /// removed.
    pub fn remove_input(&self, name: &str) -> bool {
        if let Some(param) = self.input_param(name) {
            param.delete();
            return true;
        }
        if self.detach_constant(name) {
            self.fire_changed();
            return true;
        }
        false
    }

    /// Rename an input and rewrite `{old}` placeholders in the component
    /// definition. A variable input keeps drawing from the same variable.
    pub fn rename_input(&self, old: &str, new: &str) -> DomResult<()> {
        let new = validated_name(new)?;
        if old == new {
            return Ok(());
        }
        if self.input(&new).is_some() {
            return Err(DomError::DuplicateName {
                namespace: "action input",
                name: new,
            });
        }

        let source = self.input(old);
        match &source {
            Some(ActionInputSource::Variable(param)) => {
                if param.mapping().is_none() {
                    param.element().set_attribute(MAPPING_ATTR, old);
                }
                param.element().set_name(&new);
            }
            Some(ActionInputSource::Constant(constant)) => constant.element().set_name(&new),
            None => {}
        }
        let rewritten = self.rewrite_placeholders(old, &new);

        match source {
            Some(ActionInputSource::Variable(param)) => param.fire(DocumentEvent::IoRenamed),
            Some(ActionInputSource::Constant(_)) => self.fire_changed(),
            None if rewritten => self.fire_changed(),
            None => {}
        }
        Ok(())
    }

    fn rewrite_placeholders(&self, old: &str, new: &str) -> bool {
        let Some(definition) = self.component_definition() else {
            return false;
        };
        let mut rewritten = false;
        let mut pending = definition.children();
        while let Some(element) = pending.pop() {
            pending.extend(element.children());
            let Some(content) = element.text_content() else {
                continue;
            };
            if !parameter_references(content.as_str()).iter().any(|name| name == old) {
                continue;
            }
            let updated = rename_parameter_references(content.as_str(), old, new);
            if updated != content.as_str() {
                if content.is_cdata() {
                    element.set_cdata(&updated);
                } else {
                    element.set_text(&updated);
                }
                rewritten = true;
            }
        }
        rewritten
    }

    /// Move a variable input to `index` among the variable inputs.
    pub fn set_input_index(&self, input: &ActionInput, index: usize) -> DomResult<()> {
        let inputs = self.element.ensure_path(ACTION_INPUTS);
        if input.element().parent().as_ref() != Some(&inputs) {
            return Err(DomError::NotInDocument(input.name()));
        }
        let len = inputs.child_count();
        if index >= len {
            return Err(DomError::IndexOutOfRange { index, len });
        }
        if input.element().index_in_parent() == Some(index) {
            return Ok(());
        }
        inputs.insert(index, input.element())?;
        self.fire_changed();
        Ok(())
    }

    pub fn delete_all_inputs(&self) {
        let mut removed = false;
        for param in self.input_params() {
            removed |= param.element().detach();
        }
        for constant in self.input_constants() {
            removed |= constant.element().detach();
        }
        if removed {
            self.fire_changed();
        }
    }

    // ---- outputs ----

    pub fn outputs(&self) -> Vec<ActionOutput> {
        self.element
            .child(ACTION_OUTPUTS)
            .map(|outputs| {
                outputs
                    .children()
                    .into_iter()
                    .map(ActionOutput::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn output(&self, name: &str) -> Option<ActionOutput> {
        self.element
            .child(ACTION_OUTPUTS)?
            .child(name)
            .map(ActionOutput::from_element)
    }

    pub fn outputs_of_type(&self, types: &[IoType]) -> Vec<ActionOutput> {
        self.outputs()
            .into_iter()
            .filter(|o| types.contains(&o.io_type()))
            .collect()
    }

    fn create_output_element(&self, name: &str, io_type: &IoType, public_name: Option<&str>) -> ActionOutput {
        let element = self.element.ensure_path(ACTION_OUTPUTS).add_child(name);
        element.set_attribute(TYPE_ATTR, io_type.as_str());
        if let Some(public_name) = public_name {
            element.set_attribute(MAPPING_ATTR, public_name);
        }
        ActionOutput::from_element(element)
    }

    /// Declare an output. An existing output only has its type updated.
    pub fn add_output(&self, name: &str, io_type: impl Into<IoType>) -> DomResult<ActionOutput> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        if let Some(existing) = self.output(&name) {
            existing.set_type(io_type);
            return Ok(existing);
        }
        let output = self.create_output_element(&name, &io_type, None);
        output.fire(DocumentEvent::IoAdded);
        Ok(output)
    }

    /// Declare or update an output published under `public_name`. An empty
    /// public name removes the output.
    pub fn set_output(
        &self,
        name: &str,
        public_name: Option<&str>,
        io_type: impl Into<IoType>,
    ) -> DomResult<Option<ActionOutput>> {
        let name = validated_name(name)?;
        let io_type = io_type.into();
        let Some(public_name) = public_name.map(str::trim).filter(|p| !p.is_empty()) else {
            if let Some(existing) = self.output(&name) {
                existing.delete();
            }
            return Ok(None);
        };

        if let Some(existing) = self.output(&name) {
            let type_changed = set_io_type(existing.element(), &io_type);
            let public_changed = existing.apply_public_name(Some(public_name));
            if type_changed || public_changed {
                existing.fire(DocumentEvent::IoChanged);
            }
            return Ok(Some(existing));
        }

        let output = self.create_output_element(&name, &io_type, Some(public_name));
        output.fire(DocumentEvent::IoAdded);
        Ok(Some(output))
    }

    pub fn public_output_name(&self, name: &str) -> Option<String> {
        self.output(name)?.public_name()
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

    pub fn delete_all_outputs(&self) {
        let mut removed = false;
        for output in self.outputs() {
            removed |= output.element().detach();
        }
        if removed {
            self.fire_changed();
        }
    }

    // ---- resources ----

    pub fn resources(&self) -> Vec<ActionResource> {
        self.element
            .child(ACTION_RESOURCES)
            .map(|resources| {
                resources
                    .children()
                    .into_iter()
                    .map(ActionResource::from_element)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn explicit_resource(&self, name: &str) -> Option<ActionResource> {
        self.element
            .child(ACTION_RESOURCES)?
            .child(name)
            .map(ActionResource::from_element)
    }

    /// Look a resource up, falling back to a document resource of the same
    /// name.
    pub fn resource(&self, name: &str) -> Option<ResourceView> {
        self.resource_with(name, true)
    }

    pub fn resource_with(&self, name: &str, include_implicit: bool) -> Option<ResourceView> {
        if let Some(explicit) = self.explicit_resource(name) {
            return Some(ResourceView::Explicit(explicit));
        }
        if !include_implicit {
            return None;
        }
        let source = self.document()?.resource(name)?;
        Some(ResourceView::implicit(self.clone(), source))
    }

    /// Declare a resource pointing at the document resource `mapping`
    /// (or at the one named like the resource). Existing resources only
    /// have their mapping updated.
    pub fn add_resource(&self, name: &str, mapping: Option<&str>) -> DomResult<ActionResource> {
        let name = validated_name(name)?;
        if let Some(existing) = self.explicit_resource(&name) {
            existing.set_mapping(mapping);
            return Ok(existing);
        }
        let resource = self.declare_resource(&name, mapping);
        events::fire_if_attached(resource.element(), || {
            DocumentEvent::ResourceAdded(ResourceElement::Action(resource.clone()))
        });
        Ok(resource)
    }

    /// Write a new resource declaration without notifying listeners. The
    /// caller has validated `name` and owns the event.
    pub(crate) fn declare_resource(&self, name: &str, mapping: Option<&str>) -> ActionResource {
        let element = self.element.ensure_path(ACTION_RESOURCES).add_child(name);
        element.set_attribute(TYPE_ATTR, RESOURCE_TYPE_NAME);
        if let Some(mapping) = mapping.filter(|m| !m.is_empty() && *m != name) {
            element.set_attribute(MAPPING_ATTR, mapping);
        }
        ActionResource::from_element(element)
    }

    /// Declare `name` and point its document resource at `uri`. `None`
    /// removes the action's resource.
    pub fn set_resource_uri(
        &self,
        name: &str,
        uri: Option<&str>,
        mime_type: Option<&str>,
    ) -> DomResult<Option<ActionResource>> {
        let Some(uri) = uri else {
            self.remove_resource(name);
            return Ok(None);
        };
        let resource = self.add_resource(name, None)?;
        resource.set_uri(uri)?;
        if let Some(mime_type) = mime_type {
            resource.set_mime_type(mime_type)?;
        }
        Ok(Some(resource))
    }

    pub fn remove_resource(&self, name: &str) -> bool {
        match self.explicit_resource(name) {
            Some(resource) => {
                resource.delete();
                true
            }
            None => false,
        }
    }

    pub fn delete_all_resources(&self) {
        let mut removed = false;
        for resource in self.resources() {
            removed |= resource.element().detach();
        }
        if removed {
            self.fire_changed();
        }
    }

    // ---- component definition ----

    pub fn component_definition(&self) -> Option<Element> {
        self.element.child(COMPONENT_DEFINITION)
    }

    pub fn component_elements(&self, path: &str) -> Vec<Element> {
        self.component_definition()
            .map(|d| d.select(path))
            .unwrap_or_default()
    }

    pub fn component_element(&self, path: &str) -> Option<Element> {
        self.component_definition()?.select_first(path)
    }

    pub fn component_value(&self, path: &str) -> Option<String> {
        self.component_element(path).map(|e| e.text())
    }

    pub fn component_values(&self, path: &str) -> Vec<String> {
        self.component_elements(path)
            .iter()
            .map(Element::text)
            .collect()
    }

    pub fn component_attribute(&self, path: &str, attribute: &str) -> Option<String> {
        self.component_element(path)?.attribute(attribute)
    }

    /// Set the text at `path`, creating it if needed. `None` removes every
    /// element at `path`.
    pub fn set_component_value(&self, path: &str, value: Option<&str>, use_cdata: bool) {
        let Some(value) = value else {
            self.remove_component_values(path);
            return;
        };
        let target = self.element.ensure_path(COMPONENT_DEFINITION).ensure_path(path);
        if target.text() == value && target.is_cdata() == use_cdata {
            return;
        }
        if use_cdata {
            target.set_cdata(value);
        } else {
            target.set_text(value);
        }
        self.fire_changed();
    }

    /// Replace the elements at `path` with one element per value.
    pub fn set_component_values(&self, path: &str, values: &[&str]) {
        if self.component_values(path) == values {
            return;
        }
        let (parent_path, leaf) = match path.rsplit_once('/') {
            Some((parent, leaf)) => (parent, leaf),
            None => ("", path),
        };
        for existing in self.component_elements(path) {
            existing.detach();
        }
        let parent = self
            .element
            .ensure_path(COMPONENT_DEFINITION)
            .ensure_path(parent_path);
        for value in values {
            parent.add_child(leaf).set_text(value);
        }
        self.fire_changed();
    }

    pub fn set_component_attribute(&self, path: &str, attribute: &str, value: Option<&str>) {
        if self.component_attribute(path, attribute).as_deref() == value {
            return;
        }
        match value {
            Some(value) => self
                .element
                .ensure_path(COMPONENT_DEFINITION)
                .ensure_path(path)
                .set_attribute(attribute, value),
            None => {
                if let Some(target) = self.component_element(path) {
                    target.remove_attribute(attribute);
                }
            }
        }
        self.fire_changed();
    }

    pub fn remove_component_values(&self, path: &str) -> bool {
        let mut removed = false;
        for existing in self.component_elements(path) {
            removed |= existing.detach();
        }
        if removed {
            self.fire_changed();
        }
        removed
    }

    pub fn clear_component_definition(&self) {
        let Some(definition) = self.component_definition() else {
            return;
        };
        if !definition.has_children() && definition.text_content().is_none() {
            return;
        }
        definition.clear_content();
        self.fire_changed();
    }

    // ---- structure ----

    /// Enclosing loop or conditional; `None` at the top level.
    pub fn parent(&self) -> Option<ControlStatement> {
        ControlStatement::parent_of(&self.element)
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(&self.element)
    }

    pub fn delete(&self) {
        let parent = ControlStatement::enclosing(&self.element);
        let attached = self.element.is_attached();
        self.element.detach();
        debug!(component = %self.component_name(), "Removed action definition");
        if let (Some(parent), true) = (parent, attached) {
            events::fire(&DocumentEvent::ActionRemoved {
                parent: EventParent::Control(parent),
                action: self.clone(),
            });
        }
    }

    /// Variables this action can bind to, optionally restricted to a type.
    pub fn available_variables(&self, io_type: Option<&IoType>) -> Vec<InputVariable> {
        variables::available_variables(&self.element, io_type)
    }

    /// Actions whose public outputs are visible to this one.
    pub fn preceding_action_definitions(&self) -> Vec<ActionDefinition> {
        variables::preceding_actions(&self.element)
    }

    // ---- validation ----

    /// Variant-specific checks; generic actions have none.
    pub fn validate(&self) -> Vec<ValidationError> {
        match &self.variant {
            Some(variant) => variant.validate(self),
            None => Vec::new(),
        }
    }

    /// Classify how input `name` is bound.
    pub fn input_status(&self, name: &str) -> ValidationErrorKind {
        let param = match self.input(name) {
            None => return ValidationErrorKind::Missing,
            Some(ActionInputSource::Constant(_)) => return ValidationErrorKind::Ok,
            Some(ActionInputSource::Variable(param)) => param,
        };
        let variable = param.referenced_variable_name();
        let candidates: Vec<InputVariable> = self
            .available_variables(Some(&param.io_type()))
            .into_iter()
            .filter(|v| v.variable_name() == variable)
            .collect();
        if candidates.is_empty() {
            ValidationErrorKind::ReferencesUnknownVariable
        } else if !candidates.iter().any(InputVariable::is_initialized) {
            ValidationErrorKind::Uninitialized
        } else {
            ValidationErrorKind::Ok
        }
    }

    pub fn validate_input(&self, name: &str) -> Option<ValidationError> {
        let kind = self.input_status(name);
        let message = match kind {
            ValidationErrorKind::Ok => return None,
            ValidationErrorKind::Missing => "Missing input.",
            ValidationErrorKind::ReferencesUnknownVariable => "Input references unknown variable.",
            ValidationErrorKind::Uninitialized => "Input is uninitialized.",
            ValidationErrorKind::OutputMissing => "Missing output.",
        };
        Some(ValidationError::new(self.clone(), name, kind, message))
    }

    pub fn validate_output(&self, name: &str) -> Option<ValidationError> {
        if self.output(name).is_some() {
            return None;
        }
        Some(ValidationError::new(
            self.clone(),
            name,
            ValidationErrorKind::OutputMissing,
            "Missing output.",
        ))
    }

    pub fn validate_resource(&self, name: &str) -> Option<ValidationError> {
        if self.resource(name).is_some() {
            return None;
        }
        Some(ValidationError::new(
            self.clone(),
            name,
            ValidationErrorKind::Missing,
            "Missing resource.",
        ))
    }

    pub fn reserved_input_names(&self) -> Vec<String> {
        self.variant
            .as_ref()
            .map(|v| v.reserved_input_names(self))
            .unwrap_or_default()
    }

    pub fn reserved_output_names(&self) -> Vec<String> {
        self.variant
            .as_ref()
            .map(|v| v.reserved_output_names(self))
            .unwrap_or_default()
    }

    pub fn reserved_resource_names(&self) -> Vec<String> {
        self.variant
            .as_ref()
            .map(|v| v.reserved_resource_names(self))
            .unwrap_or_default()
    }

    pub(crate) fn fire_changed(&self) {
        self.fire(DocumentEvent::ActionChanged);
    }

    fn fire(&self, make: fn(ActionDefinition) -> DocumentEvent) {
        events::fire_if_attached(&self.element, || make(self.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InputValue;
    use crate::params::MapParameterResolver;
    use pretty_assertions::assert_eq;

    fn names<T>(items: &[T], name: impl Fn(&T) -> String) -> Vec<String> {
        items.iter().map(name).collect()
    }

    #[test]
    fn test_new_action_layout() {
        let action = ActionDefinition::new("org.example.UtilityComponent");
        assert_eq!(action.component_name(), "org.example.UtilityComponent");
        assert!(action.has_component_name("UtilityComponent"));
        assert!(!action.has_component_name("ChartComponent"));
        assert!(action.variant().is_none());
        assert!(action.document().is_none());
        assert!(action.parent().is_none());
        assert!(action.validate().is_empty());

        action.set_description(Some("Copy a value"));
        assert_eq!(action.description().as_deref(), Some("Copy a value"));
        action.set_description(None);
        assert_eq!(action.description(), None);
    }

    #[test]
    fn test_input_is_either_variable_or_constant() {
        let action = ActionDefinition::new("ReportComponent");

        action.set_input_value("title", Some("Sales")).unwrap();
        assert!(action.input("title").unwrap().is_constant());

        action.set_input_param("title", Some("reportTitle"), "string").unwrap();
        let input = action.input("title").unwrap();
        assert!(!input.is_constant());
        assert_eq!(
            input.as_variable().unwrap().referenced_variable_name(),
            "reportTitle"
        );
        assert!(action.input_constant("title").is_none());

        action.set_input_value("title", Some("Sales")).unwrap();
        assert!(action.input_param("title").is_none());
        assert_eq!(action.component_value("title").as_deref(), Some("Sales"));

        action.set_input_value("title", None).unwrap();
        assert!(action.input("title").is_none());
    }

    #[test]
    fn test_add_input_is_idempotent() {
        let action = ActionDefinition::new("ReportComponent");
        action.set_input_value("limit", Some("10")).unwrap();

        let first = action.add_input("limit", "integer").unwrap();
        let second = action.add_input("limit", "long").unwrap();

        assert_eq!(first, second);
        assert_eq!(action.input_params().len(), 1);
        assert_eq!(second.io_type(), IoType::Long);
        assert!(action.input_constant("limit").is_none());
        assert!(matches!(
            action.add_input("bad name", "string"),
            Err(DomError::InvalidName(_))
        ));
    }

    #[test]
    fn test_inputs_list_variables_before_constants() {
        let action = ActionDefinition::new("ReportComponent");
        action.set_input_value("template", Some("a.xml")).unwrap();
        action.set_input_param("data", Some("rows"), "result-set").unwrap();
        action.set_component_value("settings/page-size", Some("A4"), false);

        assert_eq!(
            names(&action.inputs(), ActionInputSource::name),
            vec!["data", "template"]
        );
    }

    #[test]
    fn test_constant_values_resolve_placeholders() {
        let action = ActionDefinition::new("SqlLookupComponent");
        action
            .element()
            .tree()
            .set_resolver(Some(Arc::new(MapParameterResolver::new().with_value("region", "EMEA"))));
        action
            .set_input_value("query", Some("select * from sales where region='{region}'"))
            .unwrap();
        action.set_input_value("limit", Some("x10")).unwrap();
        action.set_input_value("enabled", Some("yes")).unwrap();

        let query = action.input("query").unwrap();
        assert_eq!(
            query.string_value(true, None).as_deref(),
            Some("select * from sales where region='EMEA'")
        );
        assert_eq!(
            query.string_value(false, None).as_deref(),
            Some("select * from sales where region='{region}'")
        );
        assert_eq!(action.input("limit").unwrap().int_value(25), 25);
        assert!(action.input("enabled").unwrap().bool_value(false));
    }

    #[test]
    fn test_rename_input_rewrites_placeholders() {
        let action = ActionDefinition::new("SqlLookupComponent");
        action.set_input_param("cust", Some("custID"), "integer").unwrap();
        action
            .set_input_value("query", Some("select * from c where id={cust}"))
            .unwrap();
        action.set_input_value("label", Some("{custID}")).unwrap();

        action.rename_input("cust", "customer").unwrap();
        assert_eq!(action.component_value("label").as_deref(), Some("{custID}"));

        let renamed = action.input_param("customer").unwrap();
        assert_eq!(renamed.referenced_variable_name(), "custID");
        assert!(action.input_param("cust").is_none());
        assert_eq!(
            action.component_value("query").as_deref(),
            Some("select * from c where id={customer}")
        );
        assert!(matches!(
            action.rename_input("customer", "query"),
            Err(DomError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_rename_input_keeps_own_name_binding() {
        let action = ActionDefinition::new("ReportComponent");
        action.add_input("custID", "integer").unwrap();
        action.rename_input("custID", "id").unwrap();
        assert_eq!(
            action.input_param("id").unwrap().referenced_variable_name(),
            "custID"
        );
    }

    #[test]
    fn test_set_input_index() {
        let action = ActionDefinition::new("ReportComponent");
        action.add_input("a", "string").unwrap();
        action.add_input("b", "string").unwrap();
        let c = action.add_input("c", "string").unwrap();

        action.set_input_index(&c, 0).unwrap();
        assert_eq!(names(&action.input_params(), ActionInput::name), vec!["c", "a", "b"]);
        assert!(matches!(
            action.set_input_index(&c, 3),
            Err(DomError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_set_output_with_empty_public_name_removes_it() {
        let action = ActionDefinition::new("SqlLookupComponent");
        let output = action
            .set_output("result", Some("custRecord"), "result-set")
            .unwrap()
            .unwrap();
        assert_eq!(output.public_name().as_deref(), Some("custRecord"));
        assert_eq!(action.public_output_name("result").as_deref(), Some("custRecord"));

        action.set_output("result", Some("  "), "result-set").unwrap();
        assert!(action.output("result").is_none());
        assert!(action.validate_output("result").is_some());
    }

    #[test]
    fn test_component_values_and_attributes() {
        let action = ActionDefinition::new("PrintComponent");
        action.set_component_values("print/line", &["a", "b"]);
        assert_eq!(action.component_values("print/line"), vec!["a", "b"]);
        action.set_component_values("print/line", &["c"]);
        assert_eq!(action.component_values("print/line"), vec!["c"]);

        action.set_component_attribute("print", "delimiter", Some(","));
        assert_eq!(action.component_attribute("print", "delimiter").as_deref(), Some(","));
        action.set_component_attribute("print", "delimiter", None);
        assert_eq!(action.component_attribute("print", "delimiter"), None);

        assert!(action.remove_component_values("print/line"));
        assert!(!action.remove_component_values("print/line"));
        action.clear_component_definition();
        assert!(!action.component_definition().unwrap().has_children());
    }

    #[test]
    fn test_detached_validation_helpers() {
        let action = ActionDefinition::new("ReportComponent");
        action.set_input_param("data", Some("rows"), "result-set").unwrap();
        action.set_input_value("title", Some("x")).unwrap();

        assert_eq!(action.input_status("missing"), ValidationErrorKind::Missing);
        assert_eq!(action.input_status("title"), ValidationErrorKind::Ok);
        assert_eq!(
            action.input_status("data"),
            ValidationErrorKind::ReferencesUnknownVariable
        );
        let err = action.validate_input("data").unwrap();
        assert_eq!(err.parameter, "data");
        assert_eq!(err.message, "Input references unknown variable.");
        assert!(action.validate_resource("template").is_some());
    }
}
