//! Scheduler administration actions.

use actseq_dom::{ActionDefinition, ActionVariant};

pub const SCHEDULER_ADMIN_COMPONENT: &str = "org.pentaho.component.SchedulerAdminComponent";

const SCHEDULER_ACTION: &str = "schedulerAction";
pub const SUSPEND_COMMAND: &str = "suspendScheduler";
pub const RESUME_COMMAND: &str = "resumeScheduler";

fn scheduler_command(action: &ActionDefinition) -> Option<String> {
    if !action.has_component_name(SCHEDULER_ADMIN_COMPONENT) {
        return None;
    }
    action.component_value(SCHEDULER_ACTION)
}

/// Suspends the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspendSchedulerAction;

impl SuspendSchedulerAction {
    pub const ID: &'static str = "suspend-scheduler";
}

impl ActionVariant for SuspendSchedulerAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn component_name(&self) -> &str {
        SCHEDULER_ADMIN_COMPONENT
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        scheduler_command(action).as_deref() == Some(SUSPEND_COMMAND)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value(SCHEDULER_ACTION, Some(SUSPEND_COMMAND), false);
    }
}

/// Resumes a suspended scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeSchedulerAction;

impl ResumeSchedulerAction {
    pub const ID: &'static str = "resume-scheduler";
}

impl ActionVariant for ResumeSchedulerAction {
    fn id(&self) -> &str {
        Self::ID
    }

    fn component_name(&self) -> &str {
        SCHEDULER_ADMIN_COMPONENT
    }

    fn accepts(&self, action: &ActionDefinition) -> bool {
        scheduler_command(action).as_deref() == Some(RESUME_COMMAND)
    }

    fn initialize(&self, action: &ActionDefinition) {
        action.set_component_value(SCHEDULER_ACTION, Some(RESUME_COMMAND), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_command_selects_variant() {
        let suspend = ActionDefinition::of_variant(Arc::new(SuspendSchedulerAction));
        assert_eq!(suspend.component_value("schedulerAction").as_deref(), Some(SUSPEND_COMMAND));
        assert!(SuspendSchedulerAction.accepts(&suspend));
        assert!(!ResumeSchedulerAction.accepts(&suspend));

        suspend.set_component_value("schedulerAction", Some(RESUME_COMMAND), false);
        assert!(ResumeSchedulerAction.accepts(&suspend));

        let other = ActionDefinition::new("org.example.Component");
        other.set_component_value("schedulerAction", Some(SUSPEND_COMMAND), false);
        assert!(!SuspendSchedulerAction.accepts(&other));
    }
}
