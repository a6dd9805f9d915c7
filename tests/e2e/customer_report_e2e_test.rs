//! The customer report scenario, end to end.

use actseq_dom::ValidationErrorKind;
use actseq_test_utils::{
    assert_no_validation_errors, assert_single_validation_error, customer_report_document,
    init_test_tracing, REPORT_COMPONENT,
};
use actseq_tests::outline;
use pretty_assertions::assert_eq;

#[test]
fn customer_report_validates_cleanly() -> anyhow::Result<()> {
    init_test_tracing();
    let fixture = customer_report_document()?;

    assert_eq!(
        outline(&fixture.document.root()),
        vec!["action 'Lookup'", "conditional", "  action 'Report'"]
    );
    assert_eq!(fixture.report.variant_id(), Some("report"));
    assert_no_validation_errors(&fixture.document.validate())?;
    Ok(())
}

#[test]
fn unknown_binding_is_the_only_finding() -> anyhow::Result<()> {
    init_test_tracing();
    let fixture = customer_report_document()?;
    fixture.bind_report_data("bogus")?;

    let errors = fixture.document.validate();
    let error = assert_single_validation_error(
        &errors,
        "data",
        ValidationErrorKind::ReferencesUnknownVariable,
    )?;
    assert_eq!(
        error.action().map(|a| a.component_name()).as_deref(),
        Some(REPORT_COMPONENT)
    );

    fixture.bind_report_data("custRecord")?;
    assert_no_validation_errors(&fixture.document.validate())?;
    Ok(())
}

#[test]
fn removing_the_input_binding_reports_it_missing() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    fixture.report.remove_input("data");

    let errors = fixture.document.validate();
    assert_single_validation_error(&errors, "data", ValidationErrorKind::Missing)?;
    Ok(())
}

#[test]
fn xml_rendering_keeps_the_structure() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let xml = fixture.document.to_xml();

    for fragment in [
        "<title>Customer report</title>",
        "<custID type=\"integer\"",
        "<component-name>Lookup</component-name>",
        "<result type=\"result-set\" mapping=\"custRecord\"",
        "<data type=\"result-set\" mapping=\"custRecord\"",
    ] {
        assert!(xml.contains(fragment), "missing {fragment} in:\n{xml}");
    }
    let lookup = xml.find("Lookup").unwrap_or_default();
    let report = xml.find("Report").unwrap_or_default();
    assert!(lookup < report);
    Ok(())
}
