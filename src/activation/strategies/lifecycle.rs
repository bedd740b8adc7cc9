use crate::activation::{Context, InstanceReference};
use crate::error::DiResult;
use crate::registration::AnyBox;

use super::{ActivationStrategy, InitializationStrategy};

/// Calls [`Initializable::initialize`](crate::Initializable::initialize) on types registered as initializable.
#[derive(Debug, Default, Clone, Copy)]
pub struct InitializableStrategy;

impl InitializationStrategy for InitializableStrategy {
    fn initialize(&self, context: &Context, mut instance: AnyBox) -> DiResult<AnyBox> {
        if let Some(hook) = &context.plan().type_info().hooks().initialize {
            hook(instance.as_mut())?;
        }
        Ok(instance)
    }
}

/// Starts instances on activation and stops them on deactivation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartableStrategy;

impl ActivationStrategy for StartableStrategy {
    fn activate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        if let Some(start) = &context.plan().type_info().hooks().start {
            start(reference.instance());
        }
        Ok(())
    }

    fn deactivate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        if let Some(stop) = &context.plan().type_info().hooks().stop {
            stop(reference.instance());
        }
        Ok(())
    }
}

/// Disposes instances on deactivation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisposableStrategy;

impl ActivationStrategy for DisposableStrategy {
    fn deactivate(&self, context: &Context, reference: &InstanceReference) -> DiResult<()> {
        if let Some(dispose) = &context.plan().type_info().hooks().dispose {
            dispose(reference.instance());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::strategies::test_support::{context_for, CannedResolver};
    use crate::planning::Plan;
    use crate::reflection::TypeInfo;
    use crate::registration::AnyArc;
    use crate::traits::{Dispose, Initializable, Startable};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Engine {
        initialized: bool,
        starts: AtomicUsize,
        stops: AtomicUsize,
        disposals: AtomicUsize,
    }

    impl Initializable for Engine {
        fn initialize(&mut self) {
            self.initialized = true;
        }
    }

    impl Startable for Engine {
        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Dispose for Engine {
        fn dispose(&self) {
            self.disposals.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn context() -> Context {
        let info = TypeInfo::builder::<Engine>()
            .default_constructor()
            .initializable()
            .startable()
            .disposable()
            .build()
            .unwrap();
        context_for::<Engine>(Plan::new(Arc::new(info)), Vec::new(), Arc::new(CannedResolver::default()))
    }

    #[test]
    fn hooks_fire_at_their_stage() {
        let ctx = context();
        let instance = InitializableStrategy.initialize(&ctx, Box::new(Engine::default())).unwrap();
        assert!(instance.downcast_ref::<Engine>().unwrap().initialized);

        let shared: AnyArc = Arc::from(instance);
        let reference = InstanceReference::new(shared);
        StartableStrategy.activate(&ctx, &reference).unwrap();
        StartableStrategy.deactivate(&ctx, &reference).unwrap();
        DisposableStrategy.deactivate(&ctx, &reference).unwrap();

        let engine = reference.downcast_ref::<Engine>().unwrap();
        assert_eq!(engine.starts.load(Ordering::SeqCst), 1);
        assert_eq!(engine.stops.load(Ordering::SeqCst), 1);
        assert_eq!(engine.disposals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn types_without_hooks_pass_through() {
        let ctx = context_for::<u8>(
            Plan::new(Arc::new(TypeInfo::opaque(crate::key::key_of_type::<u8>()))),
            Vec::new(),
            Arc::new(CannedResolver::default()),
        );
        let instance = InitializableStrategy.initialize(&ctx, Box::new(4u8)).unwrap();
        let reference = InstanceReference::new(Arc::from(instance));
        StartableStrategy.activate(&ctx, &reference).unwrap();
        DisposableStrategy.deactivate(&ctx, &reference).unwrap();
        assert_eq!(reference.downcast_ref::<u8>(), Some(&4));
    }
}
