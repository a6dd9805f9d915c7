//! Variants of the utility component.
//!
//! The utility component runs one command, named by the single command
//! element in its component definition. A definition carrying more than one
//! command stays generic.

use actseq_dom::ActionDefinition;

mod copy_param;
mod print_map_vals;
mod print_param;

pub use copy_param::CopyParamAction;
pub use print_map_vals::PrintMapValsAction;
pub use print_param::{PrintArg, PrintParamAction};

pub const UTILITY_COMPONENT: &str = "org.pentaho.component.UtilityComponent";

pub(crate) const COPY_COMMAND: &str = "copy";
pub(crate) const FORMAT_COMMAND: &str = "format";
pub(crate) const PRINT_COMMAND: &str = "print";
pub(crate) const MAP_VALUES_COMMAND: &str = "getmapvalues";

const COMMANDS: [&str; 4] = [COPY_COMMAND, FORMAT_COMMAND, PRINT_COMMAND, MAP_VALUES_COMMAND];

/// Whether `action` is a utility action running `command` and nothing else.
pub(crate) fn runs_command(action: &ActionDefinition, command: &str) -> bool {
    action.has_component_name(UTILITY_COMPONENT)
        && action.component_elements(command).len() == 1
        && COMMANDS
            .iter()
            .filter(|other| **other != command)
            .all(|other| action.component_element(other).is_none())
}

/// The non-blank text at `path`, or `fallback`.
pub(crate) fn configured_name(action: &ActionDefinition, path: &str, fallback: &str) -> String {
    action
        .component_value(path)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
