//! Pipeline stages.
//!
//! Initialization strategies run on every newly created instance, in
//! registration order, each receiving the instance returned by the previous
//! stage. Activation strategies run once initialization completes and again,
//! through their `deactivate` half, when the instance is released.

use crate::error::DiResult;
use crate::registration::AnyBox;

use super::context::{Context, InstanceReference};

mod activation_cache;
mod binding_actions;
mod lifecycle;
mod method_injection;
mod property_injection;

pub use activation_cache::ActivationCacheStrategy;
pub use binding_actions::{BindingActionStrategy, InitializationActionStrategy};
pub use lifecycle::{DisposableStrategy, InitializableStrategy, StartableStrategy};
pub use method_injection::MethodInjectionStrategy;
pub use property_injection::PropertyInjectionStrategy;

/// A stage run on instances that are still exclusively owned.
///
/// Strategies may mutate the instance in place or replace it entirely.
pub trait InitializationStrategy: Send + Sync {
    fn initialize(&self, context: &Context, instance: AnyBox) -> DiResult<AnyBox>;
}

/// A stage run after initialization and before teardown.
pub trait ActivationStrategy: Send + Sync {
    fn activate(&self, _context: &Context, _reference: &InstanceReference) -> DiResult<()> {
        Ok(())
    }

    fn deactivate(&self, _context: &Context, _reference: &InstanceReference) -> DiResult<()> {
        Ok(())
    }
}
