//! Recording document listener.

use std::sync::Arc;

use actseq_dom::{
    add_document_listener, remove_document_listener, ActionDefinition, ActionSequenceDocument,
    ControlStatement, DocumentListener, Element, EventParent, ExecutableStatement, IoElement,
    ResourceElement, TreeId,
};
use parking_lot::Mutex;

/// One event as seen by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event_type: &'static str,
    /// Element name of the entity, or the component name for actions
    pub subject: String,
    /// Owner label for removals, e.g. `document` or `conditional`
    pub parent: Option<String>,
}

/// Records the events of one document.
///
/// Listeners are process-wide and tests run in parallel, so the recorder
/// keeps only events whose subject lives in the watched tree.
#[derive(Debug)]
pub struct RecordingListener {
    tree: TreeId,
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingListener {
    /// Start recording `document`. Recording stops when the returned
    /// handle is dropped.
    pub fn attach(document: &ActionSequenceDocument) -> Recording {
        let listener = Arc::new(RecordingListener {
            tree: document.id(),
            events: Mutex::new(Vec::new()),
        });
        add_document_listener(listener.clone());
        Recording { listener }
    }

    fn record(
        &self,
        event_type: &'static str,
        element: &Element,
        subject: String,
        parent: Option<&EventParent>,
    ) {
        if element.tree_id() != self.tree {
            return;
        }
        self.events.lock().push(RecordedEvent {
            event_type,
            subject,
            parent: parent.map(parent_label),
        });
    }

    fn record_io(&self, event_type: &'static str, io: &IoElement, parent: Option<&EventParent>) {
        self.record(event_type, io.element(), io.name(), parent);
    }

    fn record_resource(
        &self,
        event_type: &'static str,
        resource: &ResourceElement,
        parent: Option<&EventParent>,
    ) {
        self.record(event_type, resource.element(), resource.name(), parent);
    }

    fn record_action(
        &self,
        event_type: &'static str,
        action: &ActionDefinition,
        parent: Option<&EventParent>,
    ) {
        self.record(event_type, action.element(), action.component_name(), parent);
    }

    fn record_control(
        &self,
        event_type: &'static str,
        statement: &ControlStatement,
        parent: Option<&EventParent>,
    ) {
        let label = ExecutableStatement::from(statement.clone()).describe();
        self.record(event_type, statement.element(), label, parent);
    }
}

fn parent_label(parent: &EventParent) -> String {
    match parent {
        EventParent::Document(_) => "document".to_string(),
        EventParent::Action(action) => ExecutableStatement::from(action.clone()).describe(),
        EventParent::Control(statement) => ExecutableStatement::from(statement.clone()).describe(),
    }
}

impl DocumentListener for RecordingListener {
    fn io_added(&self, io: &IoElement) {
        self.record_io("io.added", io, None);
    }

    fn io_removed(&self, parent: &EventParent, io: &IoElement) {
        self.record_io("io.removed", io, Some(parent));
    }

    fn io_renamed(&self, io: &IoElement) {
        self.record_io("io.renamed", io, None);
    }

    fn io_changed(&self, io: &IoElement) {
        self.record_io("io.changed", io, None);
    }

    fn resource_added(&self, resource: &ResourceElement) {
        self.record_resource("resource.added", resource, None);
    }

    fn resource_removed(&self, parent: &EventParent, resource: &ResourceElement) {
        self.record_resource("resource.removed", resource, Some(parent));
    }

    fn resource_renamed(&self, resource: &ResourceElement) {
        self.record_resource("resource.renamed", resource, None);
    }

    fn resource_changed(&self, resource: &ResourceElement) {
        self.record_resource("resource.changed", resource, None);
    }

    fn action_added(&self, action: &ActionDefinition) {
        self.record_action("action.added", action, None);
    }

    fn action_removed(&self, parent: &EventParent, action: &ActionDefinition) {
        self.record_action("action.removed", action, Some(parent));
    }

    fn action_renamed(&self, action: &ActionDefinition) {
        self.record_action("action.renamed", action, None);
    }

    fn action_changed(&self, action: &ActionDefinition) {
        self.record_action("action.changed", action, None);
    }

    fn control_statement_added(&self, statement: &ControlStatement) {
        self.record_control("control_statement.added", statement, None);
    }

    fn control_statement_removed(&self, parent: &EventParent, statement: &ControlStatement) {
        self.record_control("control_statement.removed", statement, Some(parent));
    }

    fn control_statement_changed(&self, statement: &ControlStatement) {
        self.record_control("control_statement.changed", statement, None);
    }

    fn header_changed(&self, document: &ActionSequenceDocument) {
        self.record("header.changed", &document.root_element(), "document".to_string(), None);
    }
}

/// Handle of an attached [`RecordingListener`]; unregisters on drop.
#[derive(Debug)]
pub struct Recording {
    listener: Arc<RecordingListener>,
}

impl Recording {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.listener.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.listener.events.lock().iter().map(|e| e.event_type).collect()
    }

    pub fn len(&self) -> usize {
        self.listener.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the events recorded so far and start over.
    pub fn take(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.listener.events.lock())
    }
}

impl Drop for Recording {
    fn drop(&mut self) {
        let listener: Arc<dyn DocumentListener> = self.listener.clone();
        remove_document_listener(&listener);
    }
}
