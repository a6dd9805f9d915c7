use crate::action::ActionDefinition;
use crate::document::ActionSequenceDocument;
use crate::names::{ACTIONS, ACTION_DEFINITION};
use crate::tree::Element;
use crate::validation::ValidationError;

use super::{ControlKind, ControlStatement};

/// A child of a control statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableStatement {
    Action(ActionDefinition),
    Control(ControlStatement),
}

impl ExecutableStatement {
    /// Wrap `element` if it is an action definition or a control
    /// statement.
    pub fn from_element(element: Element) -> Option<Self> {
        if element.has_name(ACTION_DEFINITION) {
            Some(ExecutableStatement::Action(ActionDefinition::from_element(element)))
        } else if element.has_name(ACTIONS) {
            ControlStatement::from_element(element).map(ExecutableStatement::Control)
        } else {
            None
        }
    }

    pub fn element(&self) -> &Element {
        match self {
            ExecutableStatement::Action(action) => action.element(),
            ExecutableStatement::Control(statement) => statement.element(),
        }
    }

    pub fn as_action(&self) -> Option<&ActionDefinition> {
        match self {
            ExecutableStatement::Action(action) => Some(action),
            ExecutableStatement::Control(_) => None,
        }
    }

    pub fn as_control(&self) -> Option<&ControlStatement> {
        match self {
            ExecutableStatement::Control(statement) => Some(statement),
            ExecutableStatement::Action(_) => None,
        }
    }

    pub fn parent(&self) -> Option<ControlStatement> {
        match self {
            ExecutableStatement::Action(action) => action.parent(),
            ExecutableStatement::Control(statement) => statement.parent(),
        }
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(self.element())
    }

    pub fn delete(&self) {
        match self {
            ExecutableStatement::Action(action) => action.delete(),
            ExecutableStatement::Control(statement) => statement.delete(),
        }
    }

    pub fn validate(&self, descend: bool) -> Vec<ValidationError> {
        match self {
            ExecutableStatement::Action(action) => action.validate(),
            ExecutableStatement::Control(statement) => statement.validate(descend),
        }
    }

    /// Short human-readable label, e.g. `action 'Report'` or `loop 'rows'`.
    pub fn describe(&self) -> String {
        match self {
            ExecutableStatement::Action(action) => {
                format!("action '{}'", action.component_name())
            }
            ExecutableStatement::Control(statement) => match statement.kind() {
                ControlKind::Loop => {
                    format!("loop '{}'", statement.loop_on().unwrap_or_default())
                }
                kind => kind.as_str().to_string(),
            },
        }
    }
}

impl From<ActionDefinition> for ExecutableStatement {
    fn from(action: ActionDefinition) -> Self {
        ExecutableStatement::Action(action)
    }
}

impl From<ControlStatement> for ExecutableStatement {
    fn from(statement: ControlStatement) -> Self {
        ExecutableStatement::Control(statement)
    }
}
