use actseq_dom::{
    ActionDefinition, ActionInputSource, ActionOutput, ActionVariant, DomResult, IoType,
    ValidationError, ValidationErrorKind,
};

use super::{configured_name, runs_command, COPY_COMMAND, UTILITY_COMPONENT};

const COPY_FROM: &str = "copy-from";
const COPY_TO: &str = "copy-to";
const COPY_FROM_PATH: &str = "copy/from";
const COPY_RETURN_PATH: &str = "copy/return";

/// Copies one variable into a new output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyParamAction;

impl CopyParamAction {
    pub const ID: &'static str = "copy-param";

    /// Private name of the input being copied.
    pub fn copy_from_name(action: &ActionDefinition) -> String {
        configured_name(action, COPY_FROM_PATH, COPY_FROM)
    }

    /// Private name of the output receiving the copy.
    pub fn copy_to_name(action: &ActionDefinition) -> String {
        configured_name(action, COPY_RETURN_PATH, COPY_TO)
    }

    pub fn copy_from(action: &ActionDefinition) -> Option<ActionInputSource> {
        action.input(&Self::copy_from_name(action))
    }

    /// Copy from `variable`. The copy output, if declared, takes the same
    /// type.
    pub fn set_copy_from(
        action: &ActionDefinition,
        variable: &str,
        io_type: impl Into<IoType>,
    ) -> DomResult<()> {
        let io_type = io_type.into();
        let name = Self::copy_from_name(action);
        action.set_component_value(COPY_FROM_PATH, Some(&name), false);
        action.set_input_param(&name, Some(variable), io_type.clone())?;
        if let Some(output) = Self::output_copy(action) {
            output.set_type(io_type);
        }
        Ok(())
    }

    pub fn output_copy(action: &ActionDefinition) -> Option<ActionOutput> {
        action.output(&Self::copy_to_name(action))
    }

    /// Publish the copy as `public_name`; `None` drops the output.
    pub fn set_output_copy(
        action: &ActionDefinition,
        public_name: Option<&str>,
    ) -> DomResult<Option<ActionOutput>> {
        let name = Self::copy_to_name(action);
        let io_type = Self::copy_from(action)
            .and_then(|source| source.as_variable().map(|input| input.io_type()))
            .unwrap_or(IoType::String);
        let output = action.set_output(&name, public_name, io_type)?;
        if output.is_some() {
            action.set_component_value(COPY_RETURN_PATH, Some(&name), false);
        }
        Ok(output)
    }
}

impl ActionVariant for CopyParamAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn component_name(&self) -> &str {
        UTILITY_COMPONENT
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        runs_command(action, COPY_COMMAND)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value(COPY_FROM_PATH, Some(COPY_FROM), false);
        action.set_component_value(COPY_RETURN_PATH, Some(COPY_TO), false);
    }

    fn validate(&self, action: &ActionDefinition) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(mut error) = action.validate_input(&Self::copy_from_name(action)) {
            let message = match error.kind {
                ValidationErrorKind::Missing => Some("Missing input parameter to copy from."),
                ValidationErrorKind::ReferencesUnknownVariable => {
                    Some("'Copy from' input parameter references unknown variable.")
                }
                ValidationErrorKind::Uninitialized => {
                    Some("'Copy from' input parameter is uninitialized.")
                }
                _ => None,
            };
            if let Some(message) = message {
                error.message = message.to_string();
            }
            errors.push(error);
        }
        if let Some(mut error) = action.validate_output(&Self::copy_to_name(action)) {
            error.message = "Missing output parameter to copy to.".to_string();
            errors.push(error);
        }
        errors
    }

    fn reserved_input_names(&self, action: &ActionDefinition) -> Vec<String> {
        vec![Self::copy_from_name(action)]
    }

    fn reserved_output_names(&self, action: &ActionDefinition) -> Vec<String> {
        vec![Self::copy_to_name(action)]
    }
}
