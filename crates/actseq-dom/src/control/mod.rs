//! Control statements: the root sequence, loops and conditionals.
//!
//! All three are `actions` elements. The one directly below the document
//! root is the sequence; a nested one carrying a `condition` child is a
//! conditional, any other nested one is a loop. The kind is decided once,
//! when the view is built.

mod executable;

pub use executable::ExecutableStatement;

use std::fmt;
use tracing::{debug, warn};

use crate::action::{action_registry, ActionDefinition};
use crate::document::ActionSequenceDocument;
use crate::error::{DomError, DomResult};
use crate::events::{self, DocumentEvent, EventParent};
use crate::names::{IoType, ACTIONS, ACTION_SEQUENCE, CONDITION, LOOP_ON, PEEK_ONLY};
use crate::tree::{Element, XmlTree};
use crate::validation::{ValidationError, ValidationErrorKind};
use crate::variables::{self, InputVariable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Sequence,
    Loop,
    Conditional,
}

impl ControlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::Sequence => "sequence",
            ControlKind::Loop => "loop",
            ControlKind::Conditional => "conditional",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View over an `actions` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStatement {
    element: Element,
    kind: ControlKind,
}

impl ControlStatement {
    /// Wrap an `actions` element, deciding its kind from its position and
    /// content.
    pub fn from_element(element: Element) -> Option<Self> {
        if !element.has_name(ACTIONS) {
            return None;
        }
        let kind = match element.parent() {
            Some(parent) if parent.has_name(ACTION_SEQUENCE) => ControlKind::Sequence,
            _ if element.child(CONDITION).is_some() => ControlKind::Conditional,
            _ => ControlKind::Loop,
        };
        Some(Self { element, kind })
    }

    pub(crate) fn sequence(element: Element) -> Self {
        Self {
            element,
            kind: ControlKind::Sequence,
        }
    }

    /// Create a detached loop over `loop_on`.
    pub fn new_loop(loop_on: &str) -> Self {
        Self::loop_element(&XmlTree::fragment(), loop_on)
    }

    /// Create a detached conditional guarded by `condition`.
    pub fn new_conditional(condition: &str) -> Self {
        Self::conditional_element(&XmlTree::fragment(), condition)
    }

    fn loop_element(tree: &XmlTree, loop_on: &str) -> Self {
        let element = tree.create_element(ACTIONS);
        element.set_attribute(LOOP_ON, loop_on);
        Self {
            element,
            kind: ControlKind::Loop,
        }
    }

    fn conditional_element(tree: &XmlTree, condition: &str) -> Self {
        let element = tree.create_element(ACTIONS);
        element.add_child(CONDITION).set_cdata(condition);
        Self {
            element,
            kind: ControlKind::Conditional,
        }
    }

    /// The statement directly holding `element`, root sequence included.
    pub(crate) fn enclosing(element: &Element) -> Option<Self> {
        element.parent().and_then(Self::from_element)
    }

    /// Like [`ControlStatement::enclosing`], but the root sequence counts
    /// as no parent.
    pub(crate) fn parent_of(element: &Element) -> Option<Self> {
        Self::enclosing(element).filter(|c| c.kind != ControlKind::Sequence)
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == ControlKind::Sequence
    }

    pub fn is_loop(&self) -> bool {
        self.kind == ControlKind::Loop
    }

    pub fn is_conditional(&self) -> bool {
        self.kind == ControlKind::Conditional
    }

    /// Actions and nested statements, in order. Other children (such as a
    /// conditional's `condition`) are skipped.
    pub fn children(&self) -> Vec<ExecutableStatement> {
        self.element
            .children()
            .into_iter()
            .filter_map(ExecutableStatement::from_element)
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Direct child actions.
    pub fn action_definitions(&self) -> Vec<ActionDefinition> {
        self.children()
            .into_iter()
            .filter_map(|c| match c {
                ExecutableStatement::Action(action) => Some(action),
                ExecutableStatement::Control(_) => None,
            })
            .collect()
    }

    /// Every action below this statement, in document order.
    pub fn all_action_definitions(&self) -> Vec<ActionDefinition> {
        variables::nested_actions(&self.element)
    }

    pub fn parent(&self) -> Option<ControlStatement> {
        if self.is_sequence() {
            return None;
        }
        Self::parent_of(&self.element)
    }

    pub fn document(&self) -> Option<ActionSequenceDocument> {
        ActionSequenceDocument::from_element(&self.element)
    }

    // ---- insertion ----

    /// Whether inserting `element` at `index` would leave it where it is.
    fn is_in_place(&self, element: &Element, index: Option<usize>) -> bool {
        if element.parent().as_ref() != Some(&self.element) {
            return false;
        }
        let children = self.children();
        let Some(position) = children.iter().position(|c| c.element() == element) else {
            return false;
        };
        match index.filter(|i| *i < children.len()) {
            Some(index) => index == position || index == position + 1,
            None => position + 1 == children.len(),
        }
    }

    /// Put `element` before the statement currently at `index`, or at the
    /// end. The follower's position is read after `element` has left its
    /// old place, so moves within this statement do not drift.
    fn place(&self, element: &Element, index: Option<usize>) -> DomResult<Element> {
        if *element == self.element || self.element.is_descendant_of(element) {
            return Err(DomError::CyclicInsertion(element.name()));
        }
        let follower = index
            .and_then(|i| self.children().into_iter().nth(i))
            .map(|c| c.element().clone());
        match follower {
            Some(follower) => {
                if element.tree().ptr_eq(self.element.tree()) {
                    element.detach();
                }
                let position = follower
                    .index_in_parent()
                    .unwrap_or_else(|| self.element.child_count());
                self.element.insert(position, element)
            }
            None => self.element.append(element),
        }
    }

    /// Add a generic action for `component_name`.
    pub fn add_action(
        &self,
        component_name: &str,
        index: Option<usize>,
    ) -> DomResult<ActionDefinition> {
        let element = ActionDefinition::new_element(self.element.tree(), component_name);
        self.place(&element, index)?;
        let action = ActionDefinition::from_element(element);
        self.announce_action(&action);
        Ok(action)
    }

    /// Add an action of a registered variant, initialised by the variant
    /// before it is attached.
    pub fn add_action_variant(
        &self,
        variant_id: &str,
        index: Option<usize>,
    ) -> DomResult<ActionDefinition> {
        let variant = action_registry()
            .get(variant_id)
            .ok_or_else(|| DomError::UnknownActionVariant(variant_id.to_string()))?;
        let action = ActionDefinition::in_tree_of_variant(self.element.tree(), variant);
        self.place(action.element(), index)?;
        self.announce_action(&action);
        Ok(action)
    }

    /// Move `action` here. Actions of another document are removed there
    /// and copied in; `action` is rebound to the copy.
    pub fn add_existing_action(
        &self,
        action: &mut ActionDefinition,
        index: Option<usize>,
    ) -> DomResult<()> {
        let element = action.element().clone();
        if self.is_in_place(&element, index) {
            return Ok(());
        }
        let same_tree = element.tree().ptr_eq(self.element.tree());
        if !same_tree {
            action.delete();
        }
        let placed = self.place(&element, index)?;
        if !same_tree {
            action.rebind(placed);
        }
        self.announce_action(action);
        Ok(())
    }

    fn announce_action(&self, action: &ActionDefinition) {
        debug!(
            component = %action.component_name(),
            parent = %self.kind,
            "Placed action definition"
        );
        events::fire_if_attached(action.element(), || DocumentEvent::ActionAdded(action.clone()));
    }

    pub fn add_loop(&self, loop_on: &str, index: Option<usize>) -> DomResult<ControlStatement> {
        let statement = Self::loop_element(self.element.tree(), loop_on);
        self.place(&statement.element, index)?;
        self.announce_control(&statement);
        Ok(statement)
    }

    pub fn add_if(&self, condition: &str, index: Option<usize>) -> DomResult<ControlStatement> {
        let statement = Self::conditional_element(self.element.tree(), condition);
        self.place(&statement.element, index)?;
        self.announce_control(&statement);
        Ok(statement)
    }

    /// Move a loop or conditional here, with the same rules as
    /// [`ControlStatement::add_existing_action`].
    pub fn add_existing_control(
        &self,
        statement: &mut ControlStatement,
        index: Option<usize>,
    ) -> DomResult<()> {
        if statement.is_sequence() {
            return Err(DomError::WrongStatementKind {
                expected: "loop or conditional",
                actual: statement.kind.as_str(),
            });
        }
        let element = statement.element.clone();
        if self.is_in_place(&element, index) {
            return Ok(());
        }
        let same_tree = element.tree().ptr_eq(self.element.tree());
        if !same_tree {
            statement.delete();
        }
        let placed = self.place(&element, index)?;
        if !same_tree {
            statement.element = placed;
        }
        self.announce_control(statement);
        Ok(())
    }

    fn announce_control(&self, statement: &ControlStatement) {
        debug!(kind = %statement.kind, parent = %self.kind, "Placed control statement");
        events::fire_if_attached(&statement.element, || {
            DocumentEvent::ControlStatementAdded(statement.clone())
        });
    }

    /// Detach the statement with everything below it. The root sequence
    /// cannot be deleted.
    pub fn delete(&self) {
        if self.is_sequence() {
            warn!("Ignoring request to delete the root sequence");
            return;
        }
        let parent = Self::enclosing(&self.element);
        let attached = self.element.is_attached();
        self.element.detach();
        debug!(kind = %self.kind, "Removed control statement");
        if let (Some(parent), true) = (parent, attached) {
            events::fire(&DocumentEvent::ControlStatementRemoved {
                parent: EventParent::Control(parent),
                statement: self.clone(),
            });
        }
    }

    // ---- loop and conditional settings ----

    fn expect_kind(&self, expected: ControlKind) -> DomResult<()> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(DomError::WrongStatementKind {
                expected: expected.as_str(),
                actual: self.kind.as_str(),
            })
        }
    }

    fn fire_changed(&self) {
        events::fire_if_attached(&self.element, || {
            DocumentEvent::ControlStatementChanged(self.clone())
        });
    }

    /// Variable iterated by a loop; `None` for other statements.
    pub fn loop_on(&self) -> Option<String> {
        if !self.is_loop() {
            return None;
        }
        self.element
            .attribute(LOOP_ON)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn set_loop_on(&self, variable: &str) -> DomResult<()> {
        self.expect_kind(ControlKind::Loop)?;
        let variable = variable.trim();
        if self.loop_on().as_deref().unwrap_or_default() == variable {
            return Ok(());
        }
        self.element.set_attribute(LOOP_ON, variable);
        self.fire_changed();
        Ok(())
    }

    pub fn peek_only(&self) -> bool {
        self.is_loop()
            && self
                .element
                .attribute(PEEK_ONLY)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }

    pub fn set_peek_only(&self, peek_only: bool) -> DomResult<()> {
        self.expect_kind(ControlKind::Loop)?;
        if self.peek_only() == peek_only {
            return Ok(());
        }
        if peek_only {
            self.element.set_attribute(PEEK_ONLY, "true");
        } else {
            self.element.remove_attribute(PEEK_ONLY);
        }
        self.fire_changed();
        Ok(())
    }

    /// Guard expression of a conditional; `None` for other statements.
    pub fn condition(&self) -> Option<String> {
        if !self.is_conditional() {
            return None;
        }
        self.element.child(CONDITION).map(|c| c.text())
    }

    pub fn set_condition(&self, condition: &str) -> DomResult<()> {
        self.expect_kind(ControlKind::Conditional)?;
        if self.condition().as_deref() == Some(condition) {
            return Ok(());
        }
        let target = match self.element.child(CONDITION) {
            Some(existing) => existing,
            None => self.element.insert_new_child(0, CONDITION),
        };
        target.set_cdata(condition);
        self.fire_changed();
        Ok(())
    }

    // ---- scoping ----

    pub fn preceding_executables(&self) -> Vec<ExecutableStatement> {
        variables::preceding_executables(&self.element)
    }

    pub fn preceding_action_definitions(&self) -> Vec<ActionDefinition> {
        variables::preceding_actions(&self.element)
    }

    pub fn available_variables(&self, io_type: Option<&IoType>) -> Vec<InputVariable> {
        variables::available_variables(&self.element, io_type)
    }

    // ---- validation ----

    /// Findings about this statement alone.
    pub fn validate_this(&self) -> Vec<ValidationError> {
        if !self.is_loop() {
            return Vec::new();
        }
        let Some(loop_on) = self.loop_on() else {
            return vec![ValidationError::new(
                self.clone(),
                LOOP_ON,
                ValidationErrorKind::Missing,
                "Missing loop variable.",
            )];
        };
        let known = self
            .available_variables(None)
            .iter()
            .any(|v| v.variable_name() == loop_on);
        if known {
            Vec::new()
        } else {
            vec![ValidationError::new(
                self.clone(),
                LOOP_ON,
                ValidationErrorKind::ReferencesUnknownVariable,
                "Loop references unknown variable.",
            )]
        }
    }

    /// Findings about this statement and, with `descend`, everything
    /// below it.
    pub fn validate(&self, descend: bool) -> Vec<ValidationError> {
        let mut errors = self.validate_this();
        if descend {
            for child in self.children() {
                errors.extend(child.validate(true));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn describe_children(statement: &ControlStatement) -> Vec<String> {
        statement
            .children()
            .iter()
            .map(ExecutableStatement::describe)
            .collect()
    }

    #[test]
    fn test_kind_is_decided_by_position_and_condition() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        assert_eq!(root.kind(), ControlKind::Sequence);
        assert!(root.parent().is_none());

        let looped = root.add_loop("regions", None).unwrap();
        let guarded = looped.add_if("total > 0", None).unwrap();

        let reread = ControlStatement::from_element(guarded.element().clone()).unwrap();
        assert_eq!(reread.kind(), ControlKind::Conditional);
        assert_eq!(guarded.parent(), Some(looped.clone()));
        assert!(looped.parent().is_none());
        assert_eq!(guarded.condition().as_deref(), Some("total > 0"));
        assert_eq!(looped.loop_on().as_deref(), Some("regions"));
    }

    #[test]
    fn test_insert_at_index_and_append_past_end() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        root.add_loop("x", None).unwrap();
        root.add_loop("y", Some(0)).unwrap();
        root.add_action("Last", Some(10)).unwrap();

        assert_eq!(
            describe_children(&root),
            vec!["loop 'y'", "loop 'x'", "action 'Last'"]
        );
    }

    #[test]
    fn test_move_within_parent_does_not_drift() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        let mut a = root.add_action("A", None).unwrap();
        root.add_action("B", None).unwrap();
        root.add_action("C", None).unwrap();

        root.add_existing_action(&mut a, Some(2)).unwrap();
        assert_eq!(
            describe_children(&root),
            vec!["action 'B'", "action 'A'", "action 'C'"]
        );

        root.add_existing_action(&mut a, None).unwrap();
        assert_eq!(
            describe_children(&root),
            vec!["action 'B'", "action 'C'", "action 'A'"]
        );
    }

    #[test]
    fn test_move_into_nested_statement() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        let mut action = root.add_action("Lookup", None).unwrap();
        let guarded = root.add_if("x", None).unwrap();

        guarded.add_existing_action(&mut action, None).unwrap();

        assert_eq!(describe_children(&root), vec!["conditional"]);
        assert_eq!(action.parent(), Some(guarded.clone()));
        assert_eq!(guarded.condition().as_deref(), Some("x"));
    }

    #[test]
    fn test_cannot_move_statement_below_itself() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        let mut outer = root.add_loop("a", None).unwrap();
        let inner = outer.add_loop("b", None).unwrap();

        assert!(matches!(
            inner.add_existing_control(&mut outer, None),
            Err(DomError::CyclicInsertion(_))
        ));
        assert_eq!(describe_children(&root), vec!["loop 'a'"]);
    }

    #[test]
    fn test_kind_specific_settings() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        let looped = root.add_loop("rows", None).unwrap();
        let guarded = root.add_if("a == b", None).unwrap();

        looped.set_peek_only(true).unwrap();
        assert!(looped.peek_only());
        assert!(matches!(
            guarded.set_loop_on("rows"),
            Err(DomError::WrongStatementKind { expected: "loop", actual: "conditional" })
        ));
        assert!(looped.set_condition("x").is_err());
        assert!(root.set_peek_only(true).is_err());
        assert_eq!(guarded.loop_on(), None);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let doc = ActionSequenceDocument::new();
        let root = doc.root();
        let looped = root.add_loop("rows", None).unwrap();
        let inner = looped.add_action("Print", None).unwrap();

        looped.delete();

        assert!(root.children().is_empty());
        assert!(looped.document().is_none());
        assert!(inner.document().is_none());
        assert!(doc.all_action_definitions().is_empty());

        root.delete();
        assert!(root.document().is_some());
    }

    #[test]
    fn test_loop_validation() {
        let doc = ActionSequenceDocument::new();
        doc.add_input("regions", "string-list").unwrap();
        let root = doc.root();
        let known = root.add_loop("regions", None).unwrap();
        let unknown = root.add_loop("missing", None).unwrap();
        let empty = root.add_loop("", None).unwrap();

        assert!(known.validate(false).is_empty());
        let errors = unknown.validate(false);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ReferencesUnknownVariable);
        assert_eq!(errors[0].parameter, "loop-on");
        assert_eq!(empty.validate(false)[0].kind, ValidationErrorKind::Missing);
        assert_eq!(root.validate(true).len(), 2);
    }
}
