//! Mutation events and the process-wide listener registry.
//!
//! Every mutating operation of the model fires exactly one event once the
//! tree has been updated. Events are delivered synchronously, in
//! registration order, to every registered [`DocumentListener`] regardless
//! of which document changed; listeners that only care about one document
//! compare [`DocumentEvent::tree_id`]. A panicking listener is logged and
//! skipped, the remaining listeners still run.

use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

use crate::action::{ActionDefinition, ActionInput, ActionOutput, ActionResource};
use crate::control::ControlStatement;
use crate::document::ActionSequenceDocument;
use crate::io::{DocumentInput, DocumentOutput, DocumentResource};
use crate::names::IoType;
use crate::tree::{Element, TreeId};

/// An input or output, at document or action level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoElement {
    DocumentInput(DocumentInput),
    DocumentOutput(DocumentOutput),
    ActionInput(ActionInput),
    ActionOutput(ActionOutput),
}

impl IoElement {
    pub fn element(&self) -> &Element {
        match self {
            IoElement::DocumentInput(io) => io.element(),
            IoElement::DocumentOutput(io) => io.element(),
            IoElement::ActionInput(io) => io.element(),
            IoElement::ActionOutput(io) => io.element(),
        }
    }

    pub fn name(&self) -> String {
        self.element().name()
    }

    pub fn io_type(&self) -> IoType {
        match self {
            IoElement::DocumentInput(io) => io.io_type(),
            IoElement::DocumentOutput(io) => io.io_type(),
            IoElement::ActionInput(io) => io.io_type(),
            IoElement::ActionOutput(io) => io.io_type(),
        }
    }
}

/// A resource, at document or action level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceElement {
    Document(DocumentResource),
    Action(ActionResource),
}

impl ResourceElement {
    pub fn element(&self) -> &Element {
        match self {
            ResourceElement::Document(res) => res.element(),
            ResourceElement::Action(res) => res.element(),
        }
    }

    pub fn name(&self) -> String {
        self.element().name()
    }
}

/// Owner an entity was removed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventParent {
    Document(ActionSequenceDocument),
    Action(ActionDefinition),
    Control(ControlStatement),
}

impl EventParent {
    pub fn element(&self) -> Element {
        match self {
            EventParent::Document(doc) => doc.root_element(),
            EventParent::Action(action) => action.element().clone(),
            EventParent::Control(statement) => statement.element().clone(),
        }
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        match self {
            EventParent::Document(doc) => Some(doc.clone()),
            EventParent::Action(action) => action.document(),
            EventParent::Control(statement) => statement.document(),
        }
    }
}

/// A single model mutation.
#[derive(Debug, Clone)]
pub enum DocumentEvent {
    IoAdded(IoElement),
    IoRemoved { parent: EventParent, io: IoElement },
    IoRenamed(IoElement),
    IoChanged(IoElement),
    ResourceAdded(ResourceElement),
    ResourceRemoved { parent: EventParent, resource: ResourceElement },
    ResourceRenamed(ResourceElement),
    ResourceChanged(ResourceElement),
    ActionAdded(ActionDefinition),
    ActionRemoved { parent: EventParent, action: ActionDefinition },
    ActionRenamed(ActionDefinition),
    ActionChanged(ActionDefinition),
    ControlStatementAdded(ControlStatement),
    ControlStatementRemoved { parent: EventParent, statement: ControlStatement },
    ControlStatementChanged(ControlStatement),
    HeaderChanged(ActionSequenceDocument),
}

impl DocumentEvent {
    /// Returns the type of the event as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            DocumentEvent::IoAdded(_) => "io.added",
            DocumentEvent::IoRemoved { .. } => "io.removed",
            DocumentEvent::IoRenamed(_) => "io.renamed",
            DocumentEvent::IoChanged(_) => "io.changed",
            DocumentEvent::ResourceAdded(_) => "resource.added",
            DocumentEvent::ResourceRemoved { .. } => "resource.removed",
            DocumentEvent::ResourceRenamed(_) => "resource.renamed",
            DocumentEvent::ResourceChanged(_) => "resource.changed",
            DocumentEvent::ActionAdded(_) => "action.added",
            DocumentEvent::ActionRemoved { .. } => "action.removed",
            DocumentEvent::ActionRenamed(_) => "action.renamed",
            DocumentEvent::ActionChanged(_) => "action.changed",
            DocumentEvent::ControlStatementAdded(_) => "control_statement.added",
            DocumentEvent::ControlStatementRemoved { .. } => "control_statement.removed",
            DocumentEvent::ControlStatementChanged(_) => "control_statement.changed",
            DocumentEvent::HeaderChanged(_) => "header.changed",
        }
    }

    /// Element of the entity the event is about.
    pub fn subject(&self) -> Element {
        match self {
            DocumentEvent::IoAdded(io)
            | DocumentEvent::IoRenamed(io)
            | DocumentEvent::IoChanged(io)
            | DocumentEvent::IoRemoved { io, .. } => io.element().clone(),
            DocumentEvent::ResourceAdded(res)
            | DocumentEvent::ResourceRenamed(res)
            | DocumentEvent::ResourceChanged(res)
            | DocumentEvent::ResourceRemoved { resource: res, .. } => res.element().clone(),
            DocumentEvent::ActionAdded(action)
            | DocumentEvent::ActionRenamed(action)
            | DocumentEvent::ActionChanged(action)
            | DocumentEvent::ActionRemoved { action, .. } => action.element().clone(),
            DocumentEvent::ControlStatementAdded(statement)
            | DocumentEvent::ControlStatementChanged(statement)
            | DocumentEvent::ControlStatementRemoved { statement, .. } => {
                statement.element().clone()
            }
            DocumentEvent::HeaderChanged(doc) => doc.root_element(),
        }
    }

    /// Tree of the document the event belongs to.
    pub fn tree_id(&self) -> TreeId {
        self.subject().tree_id()
    }

    fn dispatch(&self, listener: &dyn DocumentListener) {
        match self {
            DocumentEvent::IoAdded(io) => listener.io_added(io),
            DocumentEvent::IoRemoved { parent, io } => listener.io_removed(parent, io),
            DocumentEvent::IoRenamed(io) => listener.io_renamed(io),
            DocumentEvent::IoChanged(io) => listener.io_changed(io),
            DocumentEvent::ResourceAdded(res) => listener.resource_added(res),
            DocumentEvent::ResourceRemoved { parent, resource } => {
                listener.resource_removed(parent, resource)
            }
            DocumentEvent::ResourceRenamed(res) => listener.resource_renamed(res),
            DocumentEvent::ResourceChanged(res) => listener.resource_changed(res),
            DocumentEvent::ActionAdded(action) => listener.action_added(action),
            DocumentEvent::ActionRemoved { parent, action } => listener.action_removed(parent, action),
            DocumentEvent::ActionRenamed(action) => listener.action_renamed(action),
            DocumentEvent::ActionChanged(action) => listener.action_changed(action),
            DocumentEvent::ControlStatementAdded(statement) => {
                listener.control_statement_added(statement)
            }
            DocumentEvent::ControlStatementRemoved { parent, statement } => {
                listener.control_statement_removed(parent, statement)
            }
            DocumentEvent::ControlStatementChanged(statement) => {
                listener.control_statement_changed(statement)
            }
            DocumentEvent::HeaderChanged(doc) => listener.header_changed(doc),
        }
    }
}

/// Observer of document mutations. Every method defaults to a no-op.
pub trait DocumentListener: Send + Sync {
    fn io_added(&self, _io: &IoElement) {}
    fn io_removed(&self, _parent: &EventParent, _io: &IoElement) {}
    fn io_renamed(&self, _io: &IoElement) {}
    fn io_changed(&self, _io: &IoElement) {}

    fn resource_added(&self, _resource: &ResourceElement) {}
    fn resource_removed(&self, _parent: &EventParent, _resource: &ResourceElement) {}
    fn resource_renamed(&self, _resource: &ResourceElement) {}
    fn resource_changed(&self, _resource: &ResourceElement) {}

    fn action_added(&self, _action: &ActionDefinition) {}
    fn action_removed(&self, _parent: &EventParent, _action: &ActionDefinition) {}
    fn action_renamed(&self, _action: &ActionDefinition) {}
    fn action_changed(&self, _action: &ActionDefinition) {}

    fn control_statement_added(&self, _statement: &ControlStatement) {}
    fn control_statement_removed(&self, _parent: &EventParent, _statement: &ControlStatement) {}
    fn control_statement_changed(&self, _statement: &ControlStatement) {}

    fn header_changed(&self, _document: &ActionSequenceDocument) {}
}

lazy_static! {
    static ref LISTENERS: RwLock<Vec<Arc<dyn DocumentListener>>> = RwLock::new(Vec::new());
}

/// Register a listener for every document in the process.
pub fn add_document_listener(listener: Arc<dyn DocumentListener>) {
    LISTENERS.write().push(listener);
}

/// Unregister a listener previously passed to [`add_document_listener`].
pub fn remove_document_listener(listener: &Arc<dyn DocumentListener>) -> bool {
    let target = Arc::as_ptr(listener) as *const ();
    let mut listeners = LISTENERS.write();
    let before = listeners.len();
    listeners.retain(|l| Arc::as_ptr(l) as *const () != target);
    before != listeners.len()
}

pub fn listener_count() -> usize {
    LISTENERS.read().len()
}

/// Deliver an event to every registered listener.
pub fn fire(event: &DocumentEvent) {
    // listeners may register or unregister while being notified
    let listeners: Vec<Arc<dyn DocumentListener>> = LISTENERS.read().clone();
    for listener in listeners {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| event.dispatch(listener.as_ref())));
        if outcome.is_err() {
            warn!(
                event_type = event.event_type(),
                "Document listener panicked, continuing with remaining listeners"
            );
        }
    }
}

/// Fire the event built by `event` when `element` belongs to a document.
/// Mutations of detached entities are silent.
pub(crate) fn fire_if_attached(element: &Element, event: impl FnOnce() -> DocumentEvent) {
    if element.is_attached() {
        fire(&event());
    }
}
