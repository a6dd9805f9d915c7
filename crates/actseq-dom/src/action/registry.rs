//! Action variants and the process-wide registry that recognises them.
//!
//! A variant is recognised from the action's markup (usually its component
//! name and payload) and contributes validation and reserved names. The
//! embedding application installs one [`ActionRegistry`] before the first
//! action is resolved; if none is installed, an empty registry is frozen in
//! and every action stays generic.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DomError, DomResult};
use crate::validation::ValidationError;

use super::ActionDefinition;

/// A recognised kind of action definition.
pub trait ActionVariant: Send + Sync {
    /// Registry key, unique within a registry.
    fn id(&self) -> &str;

    /// Component name written into newly created definitions.
    fn component_name(&self) -> &str;

    /// Whether `action` (viewed generically) is of this variant.
    fn accepts(&self, action: &ActionDefinition) -> bool;

    /// Fill in a freshly created, still detached definition.
    fn initialize(&self, _action: &ActionDefinition) {}

    /// Variant-specific findings, usually built with the
    /// `validate_input`/`validate_output` helpers of the action.
    fn validate(&self, _action: &ActionDefinition) -> Vec<ValidationError> {
        Vec::new()
    }

    /// Private names the variant manages itself.
    fn reserved_input_names(&self, _action: &ActionDefinition) -> Vec<String> {
        Vec::new()
    }

    fn reserved_output_names(&self, _action: &ActionDefinition) -> Vec<String> {
        Vec::new()
    }

    fn reserved_resource_names(&self, _action: &ActionDefinition) -> Vec<String> {
        Vec::new()
    }
}

/// Ordered list of variants; the first one accepting an action wins.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    variants: Vec<Arc<dyn ActionVariant>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<V>(&mut self, variant: V) -> &mut Self
    where
        V: ActionVariant + 'static,
    {
        self.variants.push(Arc::new(variant));
        self
    }

    pub fn with<V>(mut self, variant: V) -> Self
    where
        V: ActionVariant + 'static,
    {
        self.register(variant);
        self
    }

    pub fn resolve(&self, action: &ActionDefinition) -> Option<Arc<dyn ActionVariant>> {
        let found = self.variants.iter().find(|v| v.accepts(action)).cloned();
        if let Some(variant) = &found {
            debug!(variant = variant.id(), "Resolved action variant");
        }
        found
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ActionVariant>> {
        self.variants.iter().find(|v| v.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("variants", &self.ids())
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceCell<ActionRegistry> = OnceCell::new();

/// Install the process-wide registry. Only the first call succeeds, and
/// only if no action has been resolved yet.
pub fn install_action_registry(registry: ActionRegistry) -> DomResult<()> {
    let ids = registry.ids().join(", ");
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| DomError::RegistryAlreadyInstalled)?;
    info!(variants = %ids, "Installed action registry");
    Ok(())
}

/// The process-wide registry, freezing an empty one on first use if none
/// was installed.
pub fn action_registry() -> &'static ActionRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        debug!("No action registry installed, all actions are generic");
        ActionRegistry::default()
    })
}
