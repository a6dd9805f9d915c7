//! Runs in its own binary: the registry can only be installed once per
//! process.

use std::sync::Once;

use actseq_dom::{
    action_registry, install_action_registry, ActionDefinition, ActionRegistry,
    ActionSequenceDocument, ActionVariant, DomError, IoType, ValidationError,
    ValidationErrorKind,
};
use pretty_assertions::assert_eq;

const GREETER: &str = "org.example.Greeter";

struct Greeting;

impl ActionVariant for Greeting {
    fn id(&self) -> &str {
        "greeting"
    }

    fn component_name(&self) -> &str {
        GREETER
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        action.has_component_name(GREETER)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value("template", Some("Hello {name}"), false);
    }

    fn validate(&self, action: &ActionDefinition) -> Vec<ValidationError> {
        action.validate_input("name").into_iter().collect()
    }

    fn reserved_input_names(&self, _action: &ActionDefinition) -> Vec<String> {
        vec!["name".to_string()]
    }
}

static INSTALL: Once = Once::new();

fn install() {
    INSTALL.call_once(|| {
        install_action_registry(ActionRegistry::new().with(Greeting))
            .expect("first install succeeds");
    });
}

#[test]
fn registered_variant_is_created_and_recognised() -> anyhow::Result<()> {
    install();
    let document = ActionSequenceDocument::new();
    let root = document.root();

    let created = root.add_action_variant("greeting", None)?;
    assert_eq!(created.variant_id(), Some("greeting"));
    assert_eq!(created.component_value("template").as_deref(), Some("Hello {name}"));

    let generic = root.add_action("Greeter", None)?;
    assert_eq!(generic.variant_id(), Some("greeting"));
    assert_eq!(generic.reserved_input_names(), vec!["name"]);

    let other = root.add_action("Report", None)?;
    assert_eq!(other.variant_id(), None);
    assert!(other.validate().is_empty());
    Ok(())
}

#[test]
fn variant_validation_runs_through_the_document() -> anyhow::Result<()> {
    install();
    let document = ActionSequenceDocument::new();
    let greeting = document.root().add_action_variant("greeting", None)?;

    let errors = document.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::Missing);

    greeting.set_input_value("name", Some("world"))?;
    assert!(document.validate().is_empty());

    greeting.set_input_param("name", Some("visitor"), IoType::String)?;
    assert_eq!(
        document.validate()[0].kind,
        ValidationErrorKind::ReferencesUnknownVariable
    );
    Ok(())
}

#[test]
fn unknown_variants_and_reinstall_are_rejected() {
    install();
    let document = ActionSequenceDocument::new();

    let err = document.root().add_action_variant("chart", None).unwrap_err();
    assert_eq!(err.error_code(), "ERR_DOM_UNKNOWN_VARIANT");
    assert!(document.root().children().is_empty());

    assert!(matches!(
        install_action_registry(ActionRegistry::new()),
        Err(DomError::RegistryAlreadyInstalled)
    ));
    assert_eq!(action_registry().ids(), vec!["greeting"]);
}
