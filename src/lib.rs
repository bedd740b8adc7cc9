//! # ferrous-kernel
//!
//! Activation pipeline and planning engine for a reflection-free dependency
//! injection kernel.
//!
//! ## Features
//!
//! - **Plans**: per-type injection directives built once and shared
//! - **Constructor, property and method injection** driven by registered type metadata
//! - **Parameter overrides**: constructor arguments, property values and weak property values
//! - **Scopes**: transient, singleton, per-thread and user-owned activation scopes
//! - **Lifecycle**: initialization, start/stop and disposal strategies, run at most once per instance
//! - **Modules**: named groups of bindings that can be loaded and unloaded
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_kernel::{Kernel, ParameterInfo, Resolver, TypeInfo};
//! use std::sync::Arc;
//!
//! trait Weapon: Send + Sync {
//!     fn hit(&self, target: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct Sword;
//!
//! impl Weapon for Sword {
//!     fn hit(&self, target: &str) -> String {
//!         format!("Chopped {} clean in half", target)
//!     }
//! }
//!
//! struct Samurai {
//!     weapon: Arc<dyn Weapon>,
//! }
//!
//! let kernel = Kernel::builder()
//!     .register(TypeInfo::builder::<Sword>().default_constructor())
//!     .register(
//!         TypeInfo::builder::<Samurai>()
//!             .constructor([ParameterInfo::of::<dyn Weapon>("weapon")], |args| {
//!                 Ok(Samurai { weapon: args.get_trait::<dyn Weapon>(0)? })
//!             }),
//!     )
//!     .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|sword| sword as Arc<dyn Weapon>))
//!     .build()
//!     .unwrap();
//!
//! let samurai = kernel.get::<Samurai>().unwrap();
//! assert_eq!(samurai.weapon.hit("the evildoers"), "Chopped the evildoers clean in half");
//! ```
//!
//! ## Property Injection and Overrides
//!
//! ```rust
//! use ferrous_kernel::{Kernel, PropertyValue, Resolver, TypeInfo};
//!
//! #[derive(Default)]
//! struct Shuriken {
//!     count: u32,
//! }
//!
//! let kernel = Kernel::builder()
//!     .register(
//!         TypeInfo::builder::<Shuriken>()
//!             .default_constructor()
//!             .property("count", |s: &mut Shuriken, count: std::sync::Arc<u32>| s.count = *count),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let shuriken = kernel
//!     .get_with::<Shuriken>([PropertyValue::new("count", 3u32).unwrap().into()])
//!     .unwrap();
//! assert_eq!(shuriken.count, 3);
//! ```

// Module declarations
pub mod activation;
pub mod collection;
pub mod config;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod parameters;
pub mod planning;
pub mod provider;
pub mod reflection;
pub mod registration;
pub mod traits;

mod formatter;

// Re-export core types
pub use activation::{
    ActivationCache, ActivationCacheStrategy, ActivationStrategy, BindingActionStrategy, CallbackProvider,
    ConstantProvider, ConstructorScorer, Context, DisposableStrategy, InitializableStrategy,
    InitializationActionStrategy, InitializationStrategy, InstanceReference, MethodInjectionStrategy, Pipeline,
    PropertyInjectionStrategy, Provider, Request, StandardConstructorScorer, StandardProvider, StartableStrategy,
};
pub use collection::{BindingBuilder, KernelBuilder, KernelBuilderExt, Module};
pub use config::{KernelSettings, DEFAULT_MAX_RESOLUTION_DEPTH};
pub use error::{DiError, DiResult};
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{ActivationObserver, TracingObserver};
pub use parameters::{
    ConstructorArgument, Parameter, PropertyValue, TypeMatchingConstructorArgument, WeakPropertyValue,
};
pub use planning::{
    ConstructorInjectionDirective, ConstructorReflectionStrategy, Directive, DirectiveVariant,
    MethodInjectionDirective, MethodReflectionStrategy, Plan, Planner, PlanningStrategy,
    PropertyInjectionDirective, PropertyReflectionStrategy, Target, TargetKind,
};
pub use provider::{ActivationScope, Kernel, ScopeHandle};
pub use reflection::{
    Arguments, ConstructorInfo, InjectionHeuristic, Member, MethodInfo, ParameterInfo, PropertyInfo,
    ReflectionSelector, StandardInjectionHeuristic, StandardSelector, TypeInfo, TypeInfoBuilder, TypeRegistry,
    Visibility,
};
pub use registration::{AnyArc, AnyBox, Binding, BindingId};
pub use traits::{DependencyResolver, Dispose, Initializable, Resolver, Startable};
