//! The activation pipeline.
//!
//! Turns a resolved [`Context`] into a live, injected instance and later tears
//! it down again. The provider supplies the raw instance, initialization
//! strategies inject it, activation strategies run once it is shared, and
//! deactivation strategies run when its scope releases it.

pub mod cache;
pub mod context;
pub mod pipeline;
pub mod providers;
pub mod request;
pub mod strategies;

pub use cache::ActivationCache;
pub use context::{Context, InstanceReference};
pub use pipeline::Pipeline;
pub use providers::{
    CallbackProvider, ConstantProvider, ConstructorScorer, Provider, StandardConstructorScorer,
    StandardProvider,
};
pub use request::Request;
pub use strategies::{
    ActivationCacheStrategy, ActivationStrategy, BindingActionStrategy, DisposableStrategy,
    InitializableStrategy, InitializationActionStrategy, InitializationStrategy,
    MethodInjectionStrategy, PropertyInjectionStrategy, StartableStrategy,
};
