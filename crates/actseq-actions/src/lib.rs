//!
//! Built-in action variants for action sequence documents
//!

use actseq_dom::{install_action_registry, ActionRegistry, DomResult};

pub mod contract;
pub mod scheduler;
pub mod utility;

pub use contract::ContractAction;
pub use scheduler::{ResumeSchedulerAction, SuspendSchedulerAction, SCHEDULER_ADMIN_COMPONENT};
pub use utility::{
    CopyParamAction, PrintArg, PrintMapValsAction, PrintParamAction, UTILITY_COMPONENT,
};

/// Registry holding every built-in variant.
pub fn builtin_registry() -> ActionRegistry {
    ActionRegistry::new()
        .with(CopyParamAction)
        .with(PrintParamAction)
        .with(PrintMapValsAction)
        .with(SuspendSchedulerAction)
        .with(ResumeSchedulerAction)
}

/// Install [`builtin_registry`] as the process-wide registry.
pub fn install_builtin_registry() -> DomResult<()> {
    install_action_registry(builtin_registry())
}
