//! Variants described by data instead of code.

use actseq_dom::{ActionDefinition, ActionVariant, IoType, ValidationError};
use tracing::warn;

/// A variant recognised by component name alone, requiring a fixed set of
/// inputs, outputs and resources.
///
/// New definitions are created with every requirement declared: inputs
/// bound to the variable of the same name, outputs unpublished and
/// resources mapped to themselves.
#[derive(Debug, Clone)]
pub struct ContractAction {
    id: String,
    component_name: String,
    inputs: Vec<(String, IoType)>,
    outputs: Vec<(String, IoType)>,
    resources: Vec<String>,
}

impl ContractAction {
    pub fn new(id: impl Into<String>, component_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_name: component_name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn requires_input(mut self, name: impl Into<String>, io_type: impl Into<IoType>) -> Self {
        self.inputs.push((name.into(), io_type.into()));
        self
    }

    pub fn requires_output(mut self, name: impl Into<String>, io_type: impl Into<IoType>) -> Self {
        self.outputs.push((name.into(), io_type.into()));
        self
    }

    pub fn requires_resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    pub fn required_inputs(&self) -> &[(String, IoType)] {
        &self.inputs
    }

    pub fn required_outputs(&self) -> &[(String, IoType)] {
        &self.outputs
    }

    pub fn required_resources(&self) -> &[String] {
        &self.resources
    }
}

impl ActionVariant for ContractAction {
    fn id(&self) -> &str {
        &self.id
    }

    fn component_name(&self) -> &str {
        &self.component_name
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        action.has_component_name(&self.component_name)
    }

    fn initialize(&self, action: &ActionDefinition) {
        for (name, io_type) in &self.inputs {
            if let Err(err) = action.add_input(name, io_type.clone()) {
                warn!(variant = %self.id, input = %name, error = %err, "Skipping contract input");
            }
        }
        for (name, io_type) in &self.outputs {
            if let Err(err) = action.add_output(name, io_type.clone()) {
                warn!(variant = %self.id, output = %name, error = %err, "Skipping contract output");
            }
        }
        for name in &self.resources {
            if let Err(err) = action.add_resource(name, None) {
                warn!(variant = %self.id, resource = %name, error = %err, "Skipping contract resource");
            }
        }
    }

    fn validate(&self, action: &ActionDefinition) -> Vec<ValidationError> {
        let inputs = self.inputs.iter().filter_map(|(name, _)| action.validate_input(name));
        let outputs = self.outputs.iter().filter_map(|(name, _)| action.validate_output(name));
        let resources = self.resources.iter().filter_map(|name| action.validate_resource(name));
        inputs.chain(outputs).chain(resources).collect()
    }

    fn reserved_input_names(&self, _action: &ActionDefinition) -> Vec<String> {
        self.inputs.iter().map(|(name, _)| name.clone()).collect()
    }

    fn reserved_output_names(&self, _action: &ActionDefinition) -> Vec<String> {
        self.outputs.iter().map(|(name, _)| name.clone()).collect()
    }

    fn reserved_resource_names(&self, _action: &ActionDefinition) -> Vec<String> {
        self.resources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actseq_dom::{
        ActionSequenceDocument, DefaultValue, ResourceType, Table, TableColumn, ValidationErrorKind,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn chart_contract() -> ContractAction {
        ContractAction::new("chart", "org.example.ChartComponent")
            .requires_input("chart-data", IoType::ResultSet)
            .requires_output("chart-output", IoType::Content)
            .requires_resource("chart-attributes")
    }

    #[test]
    fn test_initialize_declares_requirements() {
        let action = ActionDefinition::of_variant(Arc::new(chart_contract()));

        assert_eq!(action.component_name(), "org.example.ChartComponent");
        assert_eq!(
            action.input_param("chart-data").map(|i| i.io_type()),
            Some(IoType::ResultSet)
        );
        assert!(action.output("chart-output").is_some());
        assert!(action.explicit_resource("chart-attributes").is_some());
        assert_eq!(action.reserved_input_names(), vec!["chart-data"]);
        assert_eq!(action.reserved_resource_names(), vec!["chart-attributes"]);
    }

    #[test]
    fn test_validate_reports_each_requirement() -> actseq_dom::DomResult<()> {
        let document = ActionSequenceDocument::new();
        let mut action = ActionDefinition::of_variant(Arc::new(chart_contract()));
        action.remove_output("chart-output");
        document.root().add_existing_action(&mut action, None)?;

        let found = |action: &ActionDefinition| -> Vec<(String, ValidationErrorKind)> {
            action
                .validate()
                .into_iter()
                .map(|e| (e.parameter, e.kind))
                .collect()
        };
        assert_eq!(
            found(&action),
            vec![
                ("chart-data".to_string(), ValidationErrorKind::ReferencesUnknownVariable),
                ("chart-output".to_string(), ValidationErrorKind::OutputMissing),
            ]
        );

        let data = document.add_input("chart-data", IoType::ResultSet)?;
        data.set_default_value(Some(DefaultValue::ResultSet(
            Table::new(vec![TableColumn::new("region")]).with_row(["EMEA"]),
        )))?;
        action.add_output("chart-output", IoType::Content)?;
        document.add_resource("chart-attributes", ResourceType::File, "chart.xml", None)?;
        assert!(found(&action).is_empty());

        action.remove_resource("chart-attributes");
        document.remove_resource("chart-attributes");
        assert_eq!(
            found(&action),
            vec![("chart-attributes".to_string(), ValidationErrorKind::Missing)]
        );
        Ok(())
    }
}
