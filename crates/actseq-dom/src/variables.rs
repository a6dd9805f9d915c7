//! Variable scoping.
//!
//! A variable is available at a statement when it is a document input, or
//! the public output of an action that runs before the statement. Actions
//! nested inside a loop or conditional that precedes the statement are
//! hidden unless the document is configured with
//! `branch_outputs_visible_after`.

use tracing::trace;

use crate::action::{ActionDefinition, ActionOutput};
use crate::control::ExecutableStatement;
use crate::document::ActionSequenceDocument;
use crate::io::DocumentInput;
use crate::names::{IoType, ACTIONS};
use crate::tree::Element;

/// A value a statement can bind its inputs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputVariable {
    DocumentInput(DocumentInput),
    ActionOutput(ActionOutput),
}

impl InputVariable {
    /// Name other statements refer to: the input name or the output's
    /// public name.
    pub fn variable_name(&self) -> String {
        match self {
            InputVariable::DocumentInput(input) => input.name(),
            InputVariable::ActionOutput(output) => output.public_name().unwrap_or_default(),
        }
    }

    pub fn io_type(&self) -> IoType {
        match self {
            InputVariable::DocumentInput(input) => input.io_type(),
            InputVariable::ActionOutput(output) => output.io_type(),
        }
    }

    /// Document inputs need a default value; action outputs always carry
    /// one at run time.
    pub fn is_initialized(&self) -> bool {
        match self {
            InputVariable::DocumentInput(input) => input.has_default_value(),
            InputVariable::ActionOutput(_) => true,
        }
    }
}

fn executable_at(element: &Element) -> Option<ExecutableStatement> {
    ExecutableStatement::from_element(element.clone())
}

/// Every action nested anywhere below `element`, in document order.
pub(crate) fn nested_actions(element: &Element) -> Vec<ActionDefinition> {
    let mut actions = Vec::new();
    for child in element.children() {
        match executable_at(&child) {
            Some(ExecutableStatement::Action(action)) => actions.push(action),
            Some(ExecutableStatement::Control(_)) => actions.extend(nested_actions(&child)),
            None => {}
        }
    }
    actions
}

/// Statements preceding `position`: earlier siblings, then the earlier
/// siblings of each enclosing block, returned in document order.
pub(crate) fn preceding_executables(position: &Element) -> Vec<ExecutableStatement> {
    let mut levels: Vec<Vec<ExecutableStatement>> = Vec::new();
    let mut current = position.clone();
    while let Some(parent) = current.parent() {
        if !parent.has_name(ACTIONS) {
            break;
        }
        let level = parent
            .children()
            .into_iter()
            .take_while(|c| *c != current)
            .filter_map(|c| executable_at(&c))
            .collect();
        levels.push(level);
        current = parent;
    }
    levels.into_iter().rev().flatten().collect()
}

/// Actions among `statements` whose outputs stay visible after them.
fn visible_actions(statements: Vec<ExecutableStatement>, relaxed: bool) -> Vec<ActionDefinition> {
    let mut actions = Vec::new();
    for statement in statements {
        match statement {
            ExecutableStatement::Action(action) => actions.push(action),
            ExecutableStatement::Control(control) if relaxed => {
                actions.extend(nested_actions(control.element()))
            }
            ExecutableStatement::Control(_) => {}
        }
    }
    actions
}

/// Actions whose outputs are visible at `position`.
pub(crate) fn preceding_actions(position: &Element) -> Vec<ActionDefinition> {
    let relaxed = position.tree().config().branch_outputs_visible_after;
    visible_actions(preceding_executables(position), relaxed)
}

fn collect_variables(
    position: &Element,
    actions: Vec<ActionDefinition>,
    io_type: Option<&IoType>,
) -> Vec<InputVariable> {
    let mut variables: Vec<InputVariable> = Vec::new();
    if let Some(document) = ActionSequenceDocument::from_element(position) {
        variables.extend(document.inputs().into_iter().map(InputVariable::DocumentInput));
    }
    for action in actions {
        variables.extend(
            action
                .outputs()
                .into_iter()
                .filter(|o| o.public_name().is_some())
                .map(InputVariable::ActionOutput),
        );
    }
    if let Some(io_type) = io_type {
        variables.retain(|v| &v.io_type() == io_type);
    }
    trace!(
        position = %position.name(),
        count = variables.len(),
        "Resolved available variables"
    );
    variables
}

/// Variables available at `position`, optionally restricted to one type.
pub(crate) fn available_variables(
    position: &Element,
    io_type: Option<&IoType>,
) -> Vec<InputVariable> {
    collect_variables(position, preceding_actions(position), io_type)
}

/// Variables available once every statement of `block` has run.
pub(crate) fn closing_variables(block: &Element, io_type: Option<&IoType>) -> Vec<InputVariable> {
    let relaxed = block.tree().config().branch_outputs_visible_after;
    let statements = block
        .children()
        .into_iter()
        .filter_map(|c| executable_at(&c))
        .collect();
    let mut actions = preceding_actions(block);
    actions.extend(visible_actions(statements, relaxed));
    collect_variables(block, actions, io_type)
}
