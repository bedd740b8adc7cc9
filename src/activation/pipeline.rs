use std::sync::Arc;

use tracing::trace;

use crate::error::DiResult;
use crate::registration::AnyBox;

use super::cache::ActivationCache;
use super::context::{Context, InstanceReference};
use super::strategies::{ActivationStrategy, InitializationStrategy};

/// Runs the strategy stages for one instance.
///
/// Creation asks the binding's provider for the raw instance and runs every
/// initialization strategy in order. Activation and deactivation each run
/// their strategy list in order, at most once per instance when an
/// activation cache is attached.
pub struct Pipeline {
    initialization: Vec<Arc<dyn InitializationStrategy>>,
    activation: Vec<Arc<dyn ActivationStrategy>>,
    deactivation: Vec<Arc<dyn ActivationStrategy>>,
    cache: Option<Arc<ActivationCache>>,
}

impl Pipeline {
    pub fn new(
        initialization: Vec<Arc<dyn InitializationStrategy>>,
        activation: Vec<Arc<dyn ActivationStrategy>>,
        deactivation: Vec<Arc<dyn ActivationStrategy>>,
        cache: Option<Arc<ActivationCache>>,
    ) -> Self {
        Self { initialization, activation, deactivation, cache }
    }

    /// Creates and initializes a new instance for `context`.
    pub fn create(&self, context: &Context) -> DiResult<AnyBox> {
        let instance = context.binding().provider().create(context)?;
        self.initialize(context, instance)
    }

    pub fn initialize(&self, context: &Context, instance: AnyBox) -> DiResult<AnyBox> {
        self.initialization
            .iter()
            .try_fold(instance, |instance, strategy| strategy.initialize(context, instance))
    }

    /// Runs activation strategies unless the instance was already activated.
    pub fn activate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        if let Some(cache) = &self.cache {
            if cache.is_activated(reference.instance()) {
                trace!(service = context.request().service().display_name(), "already activated");
                return Ok(());
            }
        }
        for strategy in &self.activation {
            strategy.activate(context, reference)?;
        }
        Ok(())
    }

    /// Runs deactivation strategies unless the instance was already deactivated.
    pub fn deactivate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        if let Some(cache) = &self.cache {
            if cache.is_deactivated(reference.instance()) {
                trace!(service = context.request().service().display_name(), "already deactivated");
                return Ok(());
            }
        }
        for strategy in &self.deactivation {
            strategy.deactivate(context, reference)?;
        }
        Ok(())
    }

    pub fn initialization_strategies(&self) -> &[Arc<dyn InitializationStrategy>] {
        &self.initialization
    }

    pub fn activation_strategies(&self) -> &[Arc<dyn ActivationStrategy>] {
        &self.activation
    }

    pub fn deactivation_strategies(&self) -> &[Arc<dyn ActivationStrategy>] {
        &self.deactivation
    }

    pub fn activation_cache(&self) -> Option<&Arc<ActivationCache>> {
        self.cache.as_ref()
    }
}
