use std::sync::Once;

use actseq_actions::{
    install_builtin_registry, CopyParamAction, PrintArg, PrintParamAction, UTILITY_COMPONENT,
};
use actseq_dom::{
    action_registry, ActionSequenceDocument, DefaultValue, DomError, ExecutableStatement, IoType,
};
use pretty_assertions::assert_eq;

static INSTALL: Once = Once::new();

fn install() {
    INSTALL.call_once(|| {
        install_builtin_registry().expect("registry installs once per test binary");
    });
}

#[test]
fn second_install_is_rejected() {
    install();
    let err = install_builtin_registry().unwrap_err();
    assert!(matches!(err, DomError::RegistryAlreadyInstalled));
    assert_eq!(action_registry().len(), 5);
}

#[test]
fn variants_are_recognised_from_markup() -> anyhow::Result<()> {
    install();
    let document = ActionSequenceDocument::new();
    let root = document.root();

    let copy = root.add_action_variant(CopyParamAction::ID, None)?;
    assert_eq!(copy.variant_id(), Some(CopyParamAction::ID));

    let print = root.add_action(UTILITY_COMPONENT, None)?;
    assert_eq!(print.variant_id(), None);
    print.set_component_value("print/delimiter", Some("\",\""), false);

    let ids: Vec<Option<String>> = root
        .children()
        .iter()
        .filter_map(ExecutableStatement::as_action)
        .map(|a| a.variant_id().map(str::to_string))
        .collect();
    assert_eq!(
        ids,
        vec![
            Some(CopyParamAction::ID.to_string()),
            Some(PrintParamAction::ID.to_string())
        ]
    );
    Ok(())
}

#[test]
fn copy_then_print_validates_cleanly() -> anyhow::Result<()> {
    install();
    let document = ActionSequenceDocument::new();
    let region = document.add_input("region", IoType::String)?;
    region.set_default_value(Some(DefaultValue::Scalar("EMEA".to_string())))?;

    let root = document.root();
    let copy = root.add_action_variant(CopyParamAction::ID, None)?;
    CopyParamAction::set_copy_from(&copy, "region", IoType::String)?;
    CopyParamAction::set_output_copy(&copy, Some("regionCopy"))?;

    let print = root.add_action_variant(PrintParamAction::ID, None)?;
    PrintParamAction::set_inputs_to_print(
        &print,
        &[PrintArg::constant("Region:"), PrintArg::variable("regionCopy", IoType::String)],
    )?;
    assert!(document.validate().is_empty());

    // moving the printer ahead of the copy leaves its variable undefined
    let mut print = print;
    root.add_existing_action(&mut print, Some(0))?;
    let errors = document.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].parameter, "regionCopy");
    assert_eq!(errors[0].code(), "REFERENCES_UNKNOWN_VARIABLE");
    Ok(())
}
