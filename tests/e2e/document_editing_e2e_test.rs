//! An editing session over a document using the built-in variants,
//! observed by a recording listener.

use actseq_actions::{CopyParamAction, PrintArg, PrintParamAction};
use actseq_dom::{DefaultValue, IoType, ResourceType, ValidationErrorKind};
use actseq_test_utils::{
    assert_no_validation_errors, assert_single_validation_error, customer_report_document,
    RecordingListener,
};
use actseq_tests::outline;
use pretty_assertions::assert_eq;

#[test]
fn editing_session_fires_one_event_per_step() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let document = &fixture.document;
    let recording = RecordingListener::attach(document);

    let id = document.input("custID").ok_or_else(|| anyhow::anyhow!("custID missing"))?;
    id.set_default_value(Some(DefaultValue::Scalar("7".to_string())))?;

    let copy = fixture
        .conditional
        .add_action_variant(CopyParamAction::ID, Some(0))?;
    CopyParamAction::set_copy_from(&copy, "custID", IoType::Integer)?;
    CopyParamAction::set_output_copy(&copy, Some("idCopy"))?;

    let print = fixture.conditional.add_action_variant(PrintParamAction::ID, None)?;
    PrintParamAction::set_inputs_to_print(
        &print,
        &[PrintArg::constant("Customer"), PrintArg::variable("idCopy", IoType::Integer)],
    )?;

    assert_eq!(
        outline(&document.root()),
        vec![
            "action 'Lookup'",
            "conditional",
            "  action 'org.pentaho.component.UtilityComponent'",
            "  action 'Report'",
            "  action 'org.pentaho.component.UtilityComponent'",
        ]
    );
    assert_no_validation_errors(&document.validate())?;

    let types = recording.event_types();
    assert_eq!(types.first(), Some(&"io.changed"));
    assert_eq!(types.iter().filter(|t| **t == "action.added").count(), 2);
    assert!(types.iter().all(|t| !t.ends_with(".removed")));
    Ok(())
}

#[test]
fn renaming_a_document_input_breaks_its_readers() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let document = &fixture.document;
    let id = document.add_input("custID", IoType::Integer)?;
    id.set_default_value(Some(DefaultValue::Scalar("7".to_string())))?;

    let copy = fixture.conditional.add_action_variant(CopyParamAction::ID, None)?;
    CopyParamAction::set_copy_from(&copy, "custID", IoType::Integer)?;
    CopyParamAction::set_output_copy(&copy, Some("idCopy"))?;
    assert_no_validation_errors(&document.validate())?;

    id.set_name("customerId")?;
    let errors = document.validate();
    let error = assert_single_validation_error(
        &errors,
        "copy-from",
        ValidationErrorKind::ReferencesUnknownVariable,
    )?;
    assert_eq!(
        error.message,
        "'Copy from' input parameter references unknown variable."
    );

    CopyParamAction::set_copy_from(&copy, "customerId", IoType::Integer)?;
    assert_no_validation_errors(&document.validate())?;
    Ok(())
}

#[test]
fn resources_resolve_implicitly_and_integrity_is_checked() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let document = &fixture.document;
    document.add_resource("template", ResourceType::SolutionFile, "reports/customer.xml", None)?;

    let implicit = fixture
        .report
        .resource("template")
        .ok_or_else(|| anyhow::anyhow!("template not visible"))?;
    assert!(implicit.is_implicit());
    assert_eq!(implicit.resource_type(), Some(ResourceType::SolutionFile));
    assert!(fixture.report.validate_resource("template").is_none());
    assert!(document.check_integrity().is_empty());

    let duplicate = document.add_resource("template", ResourceType::Url, "http://x", None);
    assert_eq!(
        duplicate.map(|_| ()).map_err(|e| e.error_code()),
        Err("ERR_DOM_DUPLICATE_NAME")
    );
    Ok(())
}
