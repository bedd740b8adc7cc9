use crate::activation::{Context, InstanceReference};
use crate::error::{DiError, DiResult};
use crate::formatter;
use crate::registration::AnyBox;

use super::{ActivationStrategy, InitializationStrategy};

/// Runs the binding's activation and deactivation actions.
///
/// Only takes part in activation and deactivation; asking it to initialize
/// an instance fails with [`DiError::NotSupported`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BindingActionStrategy;

impl ActivationStrategy for BindingActionStrategy {
    fn activate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        for action in context.binding().activation_actions() {
            action(context, reference);
        }
        Ok(())
    }

    fn deactivate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        for action in context.binding().deactivation_actions() {
            action(context, reference);
        }
        Ok(())
    }
}

impl InitializationStrategy for BindingActionStrategy {
    fn initialize(&self, _context: &Context, _instance: AnyBox) -> DiResult<AnyBox> {
        Err(DiError::NotSupported(formatter::initialization_not_supported(
            "BindingActionStrategy",
        )))
    }
}

/// Runs the binding's initialization actions, threading the instance through each.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitializationActionStrategy;

impl InitializationStrategy for InitializationActionStrategy {
    fn initialize(&self, context: &Context, instance: AnyBox) -> DiResult<AnyBox> {
        context
            .binding()
            .initialization_actions()
            .iter()
            .try_fold(instance, |instance, action| action(context, instance))
    }
}
