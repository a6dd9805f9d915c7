use actseq_dom::{
    ActionDefinition, ActionInputSource, ActionVariant, DomResult, IoType, ValidationError,
    ValidationErrorKind,
};

use super::{runs_command, MAP_VALUES_COMMAND, UTILITY_COMPONENT};

const MAP_PATH: &str = "getmapvalues/property-map";
const PROPERTY_MAP: &str = "property-map";
const KEYS_PATH: &str = "getmapvalues/arg";

/// Publishes selected entries of a property map as string outputs, one
/// output per key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintMapValsAction;

impl PrintMapValsAction {
    pub const ID: &'static str = "print-map-values";

    fn map_input_name(action: &ActionDefinition) -> Option<String> {
        action
            .component_value(MAP_PATH)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn property_map(action: &ActionDefinition) -> Option<ActionInputSource> {
        action.input(&Self::map_input_name(action)?)
    }

    /// Read the map from `variable`; `None` unbinds it.
    pub fn set_property_map(action: &ActionDefinition, variable: Option<&str>) -> DomResult<()> {
        match variable {
            None => {
                if let Some(name) = Self::map_input_name(action) {
                    action.remove_input(&name);
                }
                action.set_component_value(MAP_PATH, Some(""), false);
            }
            Some(variable) => {
                action.set_component_value(MAP_PATH, Some(PROPERTY_MAP), false);
                action.set_input_param(PROPERTY_MAP, Some(variable), IoType::PropertyMap)?;
            }
        }
        Ok(())
    }

    pub fn keys(action: &ActionDefinition) -> Vec<String> {
        action.component_values(KEYS_PATH)
    }

    /// Replace the keys. Every output is dropped and one string output
    /// per key is published under the key itself.
    pub fn set_keys(action: &ActionDefinition, keys: &[&str]) -> DomResult<()> {
        action.delete_all_outputs();
        for &key in keys {
            action.set_output(key, Some(key), IoType::String)?;
        }
        action.set_component_values(KEYS_PATH, keys);
        Ok(())
    }
}

impl ActionVariant for PrintMapValsAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn component_name(&self) -> &str {
        UTILITY_COMPONENT
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        runs_command(action, MAP_VALUES_COMMAND)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value(MAP_VALUES_COMMAND, Some(""), false);
    }

    fn validate(&self, action: &ActionDefinition) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match Self::map_input_name(action) {
            Some(name) => errors.extend(action.validate_input(&name)),
            None => errors.push(ValidationError::new(
                action.clone(),
                PROPERTY_MAP,
                ValidationErrorKind::Missing,
                "Missing property map input.",
            )),
        }
        errors.extend(
            Self::keys(action)
                .iter()
                .filter_map(|key| action.validate_output(key)),
        );
        errors
    }

    fn reserved_input_names(&self, _action: &ActionDefinition) -> Vec<String> {
        vec![PROPERTY_MAP.to_string()]
    }

    fn reserved_output_names(&self, action: &ActionDefinition) -> Vec<String> {
        Self::keys(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actseq_dom::{ActionSequenceDocument, DefaultValue};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_keys_become_outputs() -> DomResult<()> {
        let action = ActionDefinition::of_variant(Arc::new(PrintMapValsAction));
        action.add_output("stale", IoType::Integer)?;

        PrintMapValsAction::set_keys(&action, &["city", "zip"])?;

        assert_eq!(PrintMapValsAction::keys(&action), vec!["city", "zip"]);
        let outputs: Vec<(String, Option<String>, IoType)> = action
            .outputs()
            .iter()
            .map(|o| (o.name(), o.public_name(), o.io_type()))
            .collect();
        assert_eq!(
            outputs,
            vec![
                ("city".to_string(), Some("city".to_string()), IoType::String),
                ("zip".to_string(), Some("zip".to_string()), IoType::String),
            ]
        );
        assert!(PrintMapValsAction.accepts(&action));
        Ok(())
    }

    #[test]
    fn test_property_map_binding_and_validation() -> DomResult<()> {
        let document = ActionSequenceDocument::new();
        let mut action = ActionDefinition::of_variant(Arc::new(PrintMapValsAction));
        document.root().add_existing_action(&mut action, None)?;

        let kinds = |action: &ActionDefinition| -> Vec<(String, ValidationErrorKind)> {
            action
                .validate()
                .into_iter()
                .map(|e| (e.parameter, e.kind))
                .collect()
        };
        assert_eq!(
            kinds(&action),
            vec![("property-map".to_string(), ValidationErrorKind::Missing)]
        );

        let address = document.add_input("address", IoType::PropertyMap)?;
        address.set_default_value(Some(DefaultValue::PropertyMap(vec![(
            "city".to_string(),
            "Lisbon".to_string(),
        )])))?;
        PrintMapValsAction::set_property_map(&action, Some("address"))?;
        PrintMapValsAction::set_keys(&action, &["city"])?;
        assert!(kinds(&action).is_empty());
        assert_eq!(
            PrintMapValsAction::property_map(&action).map(|s| s.name()).as_deref(),
            Some("property-map")
        );

        PrintMapValsAction::set_property_map(&action, None)?;
        assert!(PrintMapValsAction::property_map(&action).is_none());
        assert!(action.input_param("property-map").is_none());
        Ok(())
    }
}
