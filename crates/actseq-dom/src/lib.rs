//! Object model for action sequence documents.
//!
//! An action sequence is an XML workflow descriptor: typed document inputs,
//! outputs and resources, and a tree of actions grouped by loops and
//! conditionals. The model wraps a markup tree with typed views, keeps
//! variable bindings resolvable, validates the tree and notifies
//! process-wide listeners of every mutation.

pub mod action;
pub mod config;
pub mod control;
pub mod document;
pub mod error;
pub mod events;
pub mod io;
pub mod names;
pub mod params;
pub mod tree;
pub mod validation;
pub mod variables;

// Re-export commonly used types
pub use action::{
    action_registry, install_action_registry, ActionDefinition, ActionInput,
    ActionInputConstant, ActionInputSource, ActionOutput, ActionRegistry, ActionResource,
    ActionVariant, ImplicitResource, ResourceView,
};
pub use config::DomConfig;
pub use control::{ControlKind, ControlStatement, ExecutableStatement};
pub use document::ActionSequenceDocument;
pub use error::{DomError, DomResult};
pub use events::{
    add_document_listener, listener_count, remove_document_listener, DocumentEvent,
    DocumentListener, EventParent, IoElement, ResourceElement,
};
pub use io::{
    DefaultValue, DocumentInput, DocumentOutput, DocumentResource, InputValue, IoBinding,
    PropertyMapRow, ResourceType, Table, TableColumn,
};
pub use names::{IoType, ValueShape};
pub use params::{MapParameterResolver, ParameterResolver};
pub use tree::{Element, TextContent, TreeId, XmlTree};
pub use validation::{ValidationError, ValidationErrorKind, ValidationReport};
pub use variables::InputVariable;
