use actseq_dom::{
    ActionDefinition, ActionInputSource, ActionVariant, DomResult, InputValue, IoType,
    ValidationError,
};
use tracing::debug;

use super::{runs_command, PRINT_COMMAND, UTILITY_COMPONENT};

const DELIMITER_PATH: &str = "print/delimiter";
const ARGS_PATH: &str = "print/arg";
const CONSTANT_PREFIX: &str = "printParam";

/// One value handed to the print command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintArg {
    /// Input bound to the variable of the same name
    Variable { name: String, io_type: IoType },
    /// Literal stored as a constant under a generated name
    Constant(String),
}

impl PrintArg {
    pub fn variable(name: impl Into<String>, io_type: impl Into<IoType>) -> Self {
        PrintArg::Variable {
            name: name.into(),
            io_type: io_type.into(),
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        PrintArg::Constant(value.into())
    }
}

/// Prints a list of inputs separated by a delimiter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintParamAction;

impl PrintParamAction {
    pub const ID: &'static str = "print-param";

    /// The delimiter, without the quotes it is stored in.
    pub fn delimiter(action: &ActionDefinition) -> Option<String> {
        let stored = action.component_value(DELIMITER_PATH)?;
        match stored.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Some(inner) => Some(inner.to_string()),
            None => Some(stored),
        }
    }

    pub fn set_delimiter(action: &ActionDefinition, delimiter: Option<&str>) {
        let quoted = delimiter.map(|d| format!("\"{d}\""));
        action.set_component_value(DELIMITER_PATH, quoted.as_deref(), false);
    }

    /// Input names listed as print arguments, in print order.
    pub fn print_arg_names(action: &ActionDefinition) -> Vec<String> {
        action.component_values(ARGS_PATH)
    }

    /// The listed arguments that resolve to an input or constant.
    pub fn inputs_to_print(action: &ActionDefinition) -> Vec<ActionInputSource> {
        Self::print_arg_names(action)
            .iter()
            .filter_map(|name| action.input(name))
            .collect()
    }

    /// Replace the printed arguments. Previous arguments are removed,
    /// constants included.
    pub fn set_inputs_to_print(action: &ActionDefinition, args: &[PrintArg]) -> DomResult<()> {
        for old in Self::inputs_to_print(action) {
            action.remove_input(&old.name());
        }

        let mut names = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                PrintArg::Variable { name, io_type } => {
                    action.set_input_param(name, Some(name), io_type.clone())?;
                    names.push(name.clone());
                }
                PrintArg::Constant(value) => {
                    let name = Self::unique_constant_name(action);
                    action.set_input_value(&name, Some(value))?;
                    names.push(name);
                }
            }
        }
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        action.set_component_values(ARGS_PATH, &names);
        debug!(count = names.len(), "Set print arguments");
        Ok(())
    }

    /// Append one argument, keeping the current ones.
    pub fn add_input_to_print(action: &ActionDefinition, arg: PrintArg) -> DomResult<()> {
        let mut args: Vec<PrintArg> = Self::inputs_to_print(action)
            .into_iter()
            .filter_map(|source| match source {
                ActionInputSource::Variable(input) => {
                    Some(PrintArg::variable(input.name(), input.io_type()))
                }
                ActionInputSource::Constant(constant) => {
                    constant.raw_value().map(PrintArg::Constant)
                }
            })
            .collect();
        args.push(arg);
        Self::set_inputs_to_print(action, &args)
    }

    fn unique_constant_name(action: &ActionDefinition) -> String {
        (1..)
            .map(|i| format!("{CONSTANT_PREFIX}{i}"))
            .find(|name| action.input_param(name).is_none() && action.component_element(name).is_none())
            .unwrap_or_else(|| CONSTANT_PREFIX.to_string())
    }
}

impl ActionVariant for PrintParamAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn component_name(&self) -> &str {
        UTILITY_COMPONENT
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        runs_command(action, PRINT_COMMAND)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value(PRINT_COMMAND, Some(""), false);
    }

    fn validate(&self, action: &ActionDefinition) -> Vec<ValidationError> {
        Self::print_arg_names(action)
            .iter()
            .filter_map(|name| action.validate_input(name))
            .collect()
    }

    fn reserved_input_names(&self, action: &ActionDefinition) -> Vec<String> {
        Self::print_arg_names(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn print_action() -> ActionDefinition {
        ActionDefinition::of_variant(Arc::new(PrintParamAction))
    }

    #[test]
    fn test_delimiter_is_quoted() {
        let action = print_action();
        assert_eq!(PrintParamAction::delimiter(&action), None);

        PrintParamAction::set_delimiter(&action, Some(", "));
        assert_eq!(action.component_value("print/delimiter").as_deref(), Some("\", \""));
        assert_eq!(PrintParamAction::delimiter(&action).as_deref(), Some(", "));

        PrintParamAction::set_delimiter(&action, Some(""));
        assert_eq!(PrintParamAction::delimiter(&action).as_deref(), Some(""));

        PrintParamAction::set_delimiter(&action, None);
        assert_eq!(PrintParamAction::delimiter(&action), None);
        assert!(PrintParamAction.accepts(&action));
    }

    #[test]
    fn test_constants_get_generated_names() -> DomResult<()> {
        let action = print_action();
        PrintParamAction::set_inputs_to_print(
            &action,
            &[
                PrintArg::constant("Region:"),
                PrintArg::variable("region", IoType::String),
                PrintArg::constant("done"),
            ],
        )?;

        assert_eq!(
            PrintParamAction::print_arg_names(&action),
            vec!["printParam1", "region", "printParam2"]
        );
        assert_eq!(
            action.input_constant("printParam1").and_then(|c| c.raw_value()).as_deref(),
            Some("Region:")
        );
        assert_eq!(
            action.input_param("region").map(|i| i.referenced_variable_name()).as_deref(),
            Some("region")
        );
        Ok(())
    }

    #[test]
    fn test_add_keeps_existing_arguments() -> DomResult<()> {
        let action = print_action();
        PrintParamAction::add_input_to_print(&action, PrintArg::constant("Total:"))?;
        PrintParamAction::add_input_to_print(&action, PrintArg::variable("total", "integer"))?;

        let printed: Vec<String> = PrintParamAction::inputs_to_print(&action)
            .iter()
            .map(ActionInputSource::name)
            .collect();
        assert_eq!(printed, vec!["printParam1", "total"]);
        assert_eq!(action.reserved_input_names(), vec!["printParam1", "total"]);

        PrintParamAction::set_inputs_to_print(&action, &[])?;
        assert!(action.input_params().is_empty());
        assert!(action.input_constant("printParam1").is_none());
        assert!(PrintParamAction::print_arg_names(&action).is_empty());
        assert!(PrintParamAction.accepts(&action));
        Ok(())
    }
}
