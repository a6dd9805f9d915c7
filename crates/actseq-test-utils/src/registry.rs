//! The action registry used by integration tests.

use actseq_actions::{builtin_registry, ContractAction};
use actseq_dom::{action_registry, install_action_registry, ActionRegistry, IoType};
use once_cell::sync::OnceCell;
use tracing::debug;

pub const REPORT_COMPONENT: &str = "Report";
pub const REPORT_VARIANT: &str = "report";

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Built-in variants plus a report action requiring a result-set input
/// named `data`.
pub fn test_registry() -> ActionRegistry {
    builtin_registry().with(
        ContractAction::new(REPORT_VARIANT, REPORT_COMPONENT)
            .requires_input("data", IoType::ResultSet),
    )
}

/// Install [`test_registry`] process-wide. Safe to call from every test;
/// only the first call installs.
pub fn install_test_registry() -> &'static ActionRegistry {
    INSTALLED.get_or_init(|| {
        if let Err(err) = install_action_registry(test_registry()) {
            debug!(error = %err, "Keeping the registry installed earlier");
        }
    });
    action_registry()
}
