use actseq_dom::{
    ActionDefinition, ActionSequenceDocument, DefaultValue, DomConfig, IoType, Table,
    TableColumn, ValidationErrorKind,
};
use actseq_test_utils::{
    assert_no_validation_errors, assert_single_validation_error, customer_report_document,
};
use pretty_assertions::assert_eq;

fn variable_names(action: &ActionDefinition) -> Vec<String> {
    action
        .available_variables(None)
        .iter()
        .map(|v| v.variable_name())
        .collect()
}

#[test]
fn report_sees_input_and_lookup_output() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;

    assert_eq!(variable_names(&fixture.report), vec!["custID", "custRecord"]);
    assert_eq!(variable_names(&fixture.lookup), vec!["custID"]);
    assert_no_validation_errors(&fixture.document.validate())?;
    Ok(())
}

#[test]
fn forward_references_are_unknown() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let root = fixture.document.root();

    let mut lookup = fixture.lookup.clone();
    root.add_existing_action(&mut lookup, None)?;

    let errors = fixture.document.validate();
    let error = assert_single_validation_error(
        &errors,
        "data",
        ValidationErrorKind::ReferencesUnknownVariable,
    )?;
    assert_eq!(error.action(), Some(&fixture.report));
    Ok(())
}

#[test]
fn binding_must_match_the_variable_type() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    fixture
        .lookup
        .set_output("result", Some("custRecord"), IoType::String)?;

    let errors = fixture.document.validate();
    assert_single_validation_error(
        &errors,
        "data",
        ValidationErrorKind::ReferencesUnknownVariable,
    )?;
    Ok(())
}

#[test]
fn document_inputs_need_a_default() -> anyhow::Result<()> {
    let fixture = customer_report_document()?;
    let seed = fixture.document.add_input("seed", IoType::ResultSet)?;
    fixture.bind_report_data("seed")?;

    let errors = fixture.document.validate();
    assert_single_validation_error(&errors, "data", ValidationErrorKind::Uninitialized)?;

    seed.set_default_value(Some(DefaultValue::ResultSet(
        Table::new(vec![TableColumn::new("id")]).with_row(["42"]),
    )))?;
    assert_no_validation_errors(&fixture.document.validate())?;
    Ok(())
}

fn loop_document(
    config: DomConfig,
) -> anyhow::Result<(ActionSequenceDocument, Vec<ActionDefinition>)> {
    let document = ActionSequenceDocument::with_config(config);
    let rows = document.add_input("rows", IoType::StringList)?;
    rows.set_default_value(Some(DefaultValue::StringList(vec!["a".to_string()])))?;

    let root = document.root();
    let each_row = root.add_loop("rows", None)?;
    let format = each_row.add_action("Format", None)?;
    format.set_output("text", Some("line"), IoType::String)?;
    let guarded = each_row.add_if("line != ''", None)?;
    let print = guarded.add_action("Print", None)?;
    let after = root.add_action("Summary", None)?;
    Ok((document, vec![format, print, after]))
}

#[test]
fn loop_outputs_stay_inside_the_loop() -> anyhow::Result<()> {
    let (document, actions) = loop_document(DomConfig::default())?;

    assert_eq!(variable_names(&actions[0]), vec!["rows"]);
    assert_eq!(variable_names(&actions[1]), vec!["rows", "line"]);
    assert_eq!(variable_names(&actions[2]), vec!["rows"]);

    let closing: Vec<String> = document
        .available_variables(None)
        .iter()
        .map(|v| v.variable_name())
        .collect();
    assert_eq!(closing, vec!["rows"]);
    assert!(document.validate().is_empty());
    Ok(())
}

#[test]
fn relaxed_scoping_exposes_loop_outputs() -> anyhow::Result<()> {
    let config = DomConfig {
        branch_outputs_visible_after: true,
        ..DomConfig::default()
    };
    let (document, actions) = loop_document(config)?;

    assert_eq!(variable_names(&actions[2]), vec!["rows", "line"]);
    assert_eq!(
        document
            .available_variables(Some(&IoType::String))
            .iter()
            .map(|v| v.variable_name())
            .collect::<Vec<_>>(),
        vec!["line"]
    );
    Ok(())
}
