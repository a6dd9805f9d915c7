use actseq_dom::{
    ActionDefinition, ActionSequenceDocument, ControlStatement, DomResult, IoType,
};

use crate::registry::{install_test_registry, REPORT_COMPONENT};

pub const LOOKUP_COMPONENT: &str = "Lookup";

/// The customer report document and its statements.
#[derive(Debug, Clone)]
pub struct CustomerReport {
    pub document: ActionSequenceDocument,
    /// Root-level action publishing `custRecord`
    pub lookup: ActionDefinition,
    /// Conditional guarded by `custID > 0`
    pub conditional: ControlStatement,
    /// Report action inside the conditional, reading `custRecord` as `data`
    pub report: ActionDefinition,
}

impl CustomerReport {
    /// Rebind the report's `data` input to `variable`.
    pub fn bind_report_data(&self, variable: &str) -> DomResult<()> {
        self.report
            .set_input_param("data", Some(variable), IoType::ResultSet)
            .map(|_| ())
    }
}

/// Build:
///
/// ```text
/// inputs:  custID (integer)
/// actions: Lookup            -> result published as custRecord
///          if custID > 0
///              Report        <- data bound to custRecord
/// ```
///
/// Installs the test registry first so the report action validates its
/// `data` input.
pub fn customer_report_document() -> DomResult<CustomerReport> {
    install_test_registry();

    let document = ActionSequenceDocument::new();
    document.set_title("Customer report");
    document.add_input("custID", IoType::Integer)?;

    let root = document.root();
    let lookup = root.add_action(LOOKUP_COMPONENT, None)?;
    lookup.set_output("result", Some("custRecord"), IoType::ResultSet)?;

    let conditional = root.add_if("custID > 0", None)?;
    let report = conditional.add_action(REPORT_COMPONENT, None)?;
    report.set_input_param("data", Some("custRecord"), IoType::ResultSet)?;

    Ok(CustomerReport {
        document,
        lookup,
        conditional,
        report,
    })
}
