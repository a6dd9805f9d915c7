//! Testing utilities for action sequence documents.
//!
//! Recording listeners, document fixtures, the test action registry and
//! assertion helpers shared by the integration tests of every crate.

pub mod assertions;
pub mod builders;
pub mod listener;
pub mod registry;

pub use assertions::*;
pub use builders::*;
pub use listener::{RecordedEvent, Recording, RecordingListener};
pub use registry::{install_test_registry, test_registry, REPORT_COMPONENT, REPORT_VARIANT};

/// Initialize tracing for tests. `RUST_LOG` overrides the default filter;
/// repeated calls are ignored.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("actseq_dom=debug,actseq_actions=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
