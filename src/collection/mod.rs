//! Kernel configuration.
//!
//! [`KernelBuilder`] collects type registrations, bindings, observers and
//! custom strategies, then assembles the planner and pipeline in
//! [`KernelBuilder::build`]. Configuration errors are remembered and reported
//! by `build` so registrations can be chained.

use std::marker::PhantomData;
use std::mem;
use std::sync::Arc;

use tracing::debug;

use crate::activation::{
    ActivationCacheStrategy, ActivationStrategy, BindingActionStrategy, CallbackProvider, ConstantProvider,
    ConstructorScorer, Context, DisposableStrategy, InitializableStrategy, InitializationActionStrategy,
    InitializationStrategy, InstanceReference, MethodInjectionStrategy, Pipeline, PropertyInjectionStrategy,
    Provider, Request, StandardConstructorScorer, StandardProvider, StartableStrategy,
};
use crate::activation::ActivationCache;
use crate::config::KernelSettings;
use crate::error::{ensure_not_empty, DiError, DiResult};
use crate::formatter;
use crate::key::{key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::observer::{ActivationObserver, Observers};
use crate::parameters::{ConstructorArgument, Parameter, PropertyValue};
use crate::planning::{
    ConstructorReflectionStrategy, MethodReflectionStrategy, Planner, PlanningStrategy, PropertyReflectionStrategy,
};
use crate::provider::{current_thread_scope, ActivationScope, Kernel, KernelParts};
use crate::reflection::{
    InjectionHeuristic, ReflectionSelector, StandardInjectionHeuristic, StandardSelector, TypeInfo, TypeInfoBuilder,
    TypeRegistry,
};
use crate::registration::{
    ActivationAction, AnyArc, AnyBox, Binding, BindingCondition, BindingRegistry, Exposer, InitializationAction,
};

pub mod module_system;
pub use module_system::*;

/// Configures and builds a [`Kernel`].
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Kernel, KernelSettings, Resolver};
///
/// struct Greeting(&'static str);
///
/// let kernel = Kernel::builder()
///     .settings(KernelSettings::default().with_method_injection(false))
///     .bind::<Greeting, _>(|b| b.to_method(|_| Ok(Greeting("hello"))))
///     .bind::<Greeting, _>(|b| b.to_method(|_| Ok(Greeting("bonjour"))).named("fr"))
///     .build()
///     .unwrap();
///
/// assert_eq!(kernel.get_named::<Greeting>("fr").unwrap().0, "bonjour");
/// ```
pub struct KernelBuilder {
    settings: KernelSettings,
    types: TypeRegistry,
    pending: Vec<PendingBinding>,
    observers: Observers,
    selector: Option<Arc<dyn ReflectionSelector>>,
    heuristics: Vec<Arc<dyn InjectionHeuristic>>,
    planning: Vec<Arc<dyn PlanningStrategy>>,
    initialization: Vec<Arc<dyn InitializationStrategy>>,
    activation: Vec<Arc<dyn ActivationStrategy>>,
    deactivation: Vec<Arc<dyn ActivationStrategy>>,
    scorer: Option<Arc<dyn ConstructorScorer>>,
    pub(crate) modules: Vec<(String, Box<dyn Module>)>,
    pub(crate) loading: Option<String>,
    errors: Vec<DiError>,
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self {
            settings: KernelSettings::default(),
            types: TypeRegistry::new(),
            pending: Vec::new(),
            observers: Observers::new(),
            selector: None,
            heuristics: Vec::new(),
            planning: Vec::new(),
            initialization: Vec::new(),
            activation: Vec::new(),
            deactivation: Vec::new(),
            scorer: None,
            modules: Vec::new(),
            loading: None,
            errors: Vec::new(),
        }
    }

    pub fn settings(&mut self, settings: KernelSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    // ----- Types and bindings -----

    /// Registers the members of `T` for planning.
    pub fn register<T: Send + Sync + 'static>(&mut self, info: TypeInfoBuilder<T>) -> &mut Self {
        match info.build() {
            Ok(info) => self.types.insert(info),
            Err(error) => self.errors.push(error),
        }
        self
    }

    pub fn register_info(&mut self, info: TypeInfo) -> &mut Self {
        self.types.insert(info);
        self
    }

    /// Adds a binding for the service `S`.
    ///
    /// ```rust
    /// use ferrous_kernel::{Kernel, Resolver};
    ///
    /// let kernel = Kernel::builder()
    ///     .bind::<u16, _>(|b| b.to_constant(8080))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(*kernel.get::<u16>().unwrap(), 8080);
    /// ```
    pub fn bind<S, F>(&mut self, configure: F) -> &mut Self
    where
        S: ?Sized + 'static,
        F: FnOnce(BindingBuilder<S>) -> BindingBuilder<S>,
    {
        match configure(BindingBuilder::new()).finish() {
            Ok(mut pending) => {
                pending.module = self.loading.clone();
                self.pending.push(pending);
            }
            Err(error) => self.errors.push(error),
        }
        self
    }

    /// Number of bindings added so far.
    pub fn binding_count(&self) -> usize {
        self.pending.len()
    }

    // ----- Diagnostics and components -----

    pub fn observer(&mut self, observer: Arc<dyn ActivationObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Replaces the standard member selector.
    pub fn selector(&mut self, selector: Arc<dyn ReflectionSelector>) -> &mut Self {
        self.selector = Some(selector);
        self
    }

    /// Adds a heuristic alongside the standard one; any heuristic can select a member.
    pub fn heuristic(&mut self, heuristic: Arc<dyn InjectionHeuristic>) -> &mut Self {
        self.heuristics.push(heuristic);
        self
    }

    /// Runs after the standard planning strategies.
    pub fn planning_strategy(&mut self, strategy: Arc<dyn PlanningStrategy>) -> &mut Self {
        self.planning.push(strategy);
        self
    }

    /// Runs after the standard initialization strategies.
    pub fn initialization_strategy(&mut self, strategy: Arc<dyn InitializationStrategy>) -> &mut Self {
        self.initialization.push(strategy);
        self
    }

    /// Runs after the standard activation strategies.
    pub fn activation_strategy(&mut self, strategy: Arc<dyn ActivationStrategy>) -> &mut Self {
        self.activation.push(strategy);
        self
    }

    /// Runs after the standard deactivation strategies, before the activation cache records the instance.
    pub fn deactivation_strategy(&mut self, strategy: Arc<dyn ActivationStrategy>) -> &mut Self {
        self.deactivation.push(strategy);
        self
    }

    pub fn constructor_scorer(&mut self, scorer: Arc<dyn ConstructorScorer>) -> &mut Self {
        self.scorer = Some(scorer);
        self
    }

    // ----- Modules -----

    /// Loads `module` and its bindings.
    ///
    /// Fails with [`DiError::NotSupported`] when the module has no name or a
    /// module of the same name is already loaded. Bindings added by a module
    /// that fails to load are discarded.
    pub fn load<M: Module>(&mut self, module: M) -> DiResult<&mut Self> {
        let name = module
            .name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DiError::NotSupported(formatter::module_name_missing(std::any::type_name::<M>())))?;
        if self.has_module(&name) {
            return Err(DiError::NotSupported(formatter::module_already_loaded(&name)));
        }

        let outer = self.loading.replace(name.clone());
        let result = module.load(self);
        self.loading = outer;

        if let Err(error) = result {
            self.pending.retain(|p| p.module.as_deref() != Some(name.as_str()));
            return Err(error);
        }
        debug!(module = %name, "module loaded");
        self.modules.push((name, Box::new(module)));
        Ok(self)
    }

    /// Unloads the module called `name` and removes its bindings.
    pub fn unload(&mut self, name: &str) -> DiResult<&mut Self> {
        let position = self
            .modules
            .iter()
            .position(|(loaded, _)| loaded == name)
            .ok_or_else(|| DiError::NotSupported(formatter::module_not_loaded(name)))?;
        let (name, module) = self.modules.remove(position);
        module.unload(self);
        let before = self.pending.len();
        self.pending.retain(|p| p.module.as_deref() != Some(name.as_str()));
        debug!(module = %name, removed = before - self.pending.len(), "module unloaded");
        Ok(self)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|(loaded, _)| loaded == name)
    }

    // ----- Build -----

    /// Builds the kernel, reporting the first configuration error.
    ///
    /// The builder is left empty afterwards.
    pub fn build(&mut self) -> DiResult<Kernel> {
        if !self.errors.is_empty() {
            let error = self.errors.remove(0);
            self.errors.clear();
            return Err(error);
        }

        let settings = self.settings.clone();
        let types = Arc::new(mem::take(&mut self.types));
        let selector = self
            .selector
            .take()
            .unwrap_or_else(|| Arc::new(StandardSelector::new(settings.inject_non_public)));
        let scorer = self
            .scorer
            .take()
            .unwrap_or_else(|| Arc::new(StandardConstructorScorer));

        let mut heuristics: Vec<Arc<dyn InjectionHeuristic>> = vec![Arc::new(StandardInjectionHeuristic)];
        heuristics.append(&mut self.heuristics);

        let mut planning: Vec<Arc<dyn PlanningStrategy>> =
            vec![Arc::new(ConstructorReflectionStrategy::new(selector.clone()))];
        if settings.property_injection {
            planning.push(Arc::new(PropertyReflectionStrategy::new(selector.clone(), heuristics.clone())));
        }
        if settings.method_injection {
            planning.push(Arc::new(MethodReflectionStrategy::new(selector.clone(), heuristics)));
        }
        planning.append(&mut self.planning);

        let mut initialization: Vec<Arc<dyn InitializationStrategy>> = Vec::new();
        if settings.property_injection {
            initialization.push(Arc::new(PropertyInjectionStrategy::new(selector.clone())));
        }
        if settings.method_injection {
            initialization.push(Arc::new(MethodInjectionStrategy));
        }
        initialization.push(Arc::new(InitializableStrategy));
        initialization.push(Arc::new(InitializationActionStrategy));
        initialization.append(&mut self.initialization);

        let cache = Arc::new(ActivationCache::new());
        let cache_strategy: Option<Arc<dyn ActivationStrategy>> = if settings.activation_cache_disabled {
            None
        } else {
            Some(Arc::new(ActivationCacheStrategy::new(cache.clone())))
        };

        let mut activation: Vec<Arc<dyn ActivationStrategy>> = Vec::new();
        activation.extend(cache_strategy.clone());
        activation.push(Arc::new(StartableStrategy));
        activation.push(Arc::new(BindingActionStrategy));
        activation.append(&mut self.activation);

        let mut deactivation: Vec<Arc<dyn ActivationStrategy>> = vec![
            Arc::new(StartableStrategy),
            Arc::new(DisposableStrategy),
            Arc::new(BindingActionStrategy),
        ];
        deactivation.append(&mut self.deactivation);
        deactivation.extend(cache_strategy);

        let pipeline = Pipeline::new(
            initialization,
            activation,
            deactivation,
            (!settings.activation_cache_disabled).then(|| cache.clone()),
        );

        let mut bindings = BindingRegistry::new();
        for pending in self.pending.drain(..) {
            bindings.insert(pending.into_binding(&scorer));
        }
        let modules = mem::take(&mut self.modules)
            .into_iter()
            .map(|(name, _)| name)
            .collect();

        Ok(Kernel::from_parts(KernelParts {
            planner: Planner::new(types.clone(), planning),
            settings,
            bindings,
            types,
            pipeline,
            cache,
            observers: mem::take(&mut self.observers),
            scorer,
            modules,
        }))
    }
}

enum BindingTarget {
    /// Constructed through the plan of this type
    Standard(Key),
    Provider(Arc<dyn Provider>),
}

/// A configured binding waiting for the kernel's constructor scorer.
struct PendingBinding {
    service: Key,
    target: BindingTarget,
    exposer: Option<Exposer>,
    lifetime: Lifetime,
    condition: Option<BindingCondition>,
    name: Option<String>,
    module: Option<String>,
    parameters: Vec<Parameter>,
    initialization_actions: Vec<InitializationAction>,
    activation_actions: Vec<ActivationAction>,
    deactivation_actions: Vec<ActivationAction>,
}

impl PendingBinding {
    fn into_binding(self, scorer: &Arc<dyn ConstructorScorer>) -> Binding {
        let provider: Arc<dyn Provider> = match self.target {
            BindingTarget::Standard(implementation) => {
                Arc::new(StandardProvider::new(implementation, scorer.clone()))
            }
            BindingTarget::Provider(provider) => provider,
        };

        let mut binding = Binding::new(self.service, provider).with_lifetime(self.lifetime);
        if let Some(condition) = self.condition {
            binding = binding.with_condition(condition);
        }
        if let Some(name) = self.name {
            binding = binding.with_name(name);
        }
        if let Some(exposer) = self.exposer {
            binding = binding.with_exposer(exposer);
        }
        binding.set_module(self.module);
        let binding = self.parameters.into_iter().fold(binding, Binding::with_parameter);
        let binding = self
            .initialization_actions
            .into_iter()
            .fold(binding, Binding::with_initialization_action);
        let binding = self
            .activation_actions
            .into_iter()
            .fold(binding, Binding::with_activation_action);
        self.deactivation_actions
            .into_iter()
            .fold(binding, Binding::with_deactivation_action)
    }
}

/// Fluent configuration of one binding for the service `S`.
///
/// A binding needs a target: `to_self`, `to`, `to_method` or `to_constant`.
/// Bindings are transient unless a scope is chosen; constants default to
/// singleton.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Kernel, Resolver, TypeInfo};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Connection;
///
/// let opened = Arc::new(AtomicUsize::new(0));
/// let counter = opened.clone();
///
/// let kernel = Kernel::builder()
///     .register(TypeInfo::builder::<Connection>().default_constructor())
///     .bind::<Connection, _>(move |b| {
///         b.to_self()
///             .in_singleton_scope()
///             .on_activation(move |_, _: &Connection| {
///                 counter.fetch_add(1, Ordering::SeqCst);
///             })
///     })
///     .build()
///     .unwrap();
///
/// kernel.get::<Connection>().unwrap();
/// kernel.get::<Connection>().unwrap();
/// assert_eq!(opened.load(Ordering::SeqCst), 1);
/// ```
pub struct BindingBuilder<S: ?Sized> {
    target: Option<BindingTarget>,
    exposer: Option<Exposer>,
    lifetime: Option<Lifetime>,
    default_lifetime: Lifetime,
    condition: Option<BindingCondition>,
    name: Option<String>,
    parameters: Vec<Parameter>,
    initialization_actions: Vec<InitializationAction>,
    activation_actions: Vec<ActivationAction>,
    deactivation_actions: Vec<ActivationAction>,
    errors: Vec<DiError>,
    _service: PhantomData<fn() -> Box<S>>,
}

impl<S: ?Sized + 'static> BindingBuilder<S> {
    fn new() -> Self {
        Self {
            target: None,
            exposer: None,
            lifetime: None,
            default_lifetime: Lifetime::Transient,
            condition: None,
            name: None,
            parameters: Vec::new(),
            initialization_actions: Vec::new(),
            activation_actions: Vec::new(),
            deactivation_actions: Vec::new(),
            errors: Vec::new(),
            _service: PhantomData,
        }
    }

    fn finish(mut self) -> DiResult<PendingBinding> {
        if !self.errors.is_empty() {
            return Err(self.errors.remove(0));
        }
        let target = self.target.ok_or_else(|| {
            DiError::InvalidOperation(formatter::binding_without_target(std::any::type_name::<S>()))
        })?;
        Ok(PendingBinding {
            service: key_of_type::<S>(),
            target,
            exposer: self.exposer,
            lifetime: self.lifetime.unwrap_or(self.default_lifetime),
            condition: self.condition,
            name: self.name,
            module: None,
            parameters: self.parameters,
            initialization_actions: self.initialization_actions,
            activation_actions: self.activation_actions,
            deactivation_actions: self.deactivation_actions,
        })
    }

    // ----- Targets -----

    /// Activates the registered type `I` and hands out `cast(instance)`.
    ///
    /// Meant for trait object services; resolve them with
    /// [`Resolver::get_trait`](crate::Resolver::get_trait).
    pub fn to<I>(mut self, cast: impl Fn(Arc<I>) -> Arc<S> + Send + Sync + 'static) -> Self
    where
        I: Send + Sync + 'static,
        S: Send + Sync,
    {
        self.target = Some(BindingTarget::Standard(key_of_type::<I>()));
        self.exposer = Some(Arc::new(move |instance: AnyArc| -> DiResult<AnyArc> {
            let implementation = instance
                .downcast::<I>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<I>()))?;
            let exposed: Arc<S> = cast(implementation);
            Ok(Arc::new(exposed) as AnyArc)
        }));
        self
    }

    /// Uses a custom provider.
    pub fn to_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.target = Some(BindingTarget::Provider(provider));
        self
    }

    // ----- Scopes -----

    pub fn in_transient_scope(mut self) -> Self {
        self.lifetime = Some(Lifetime::Transient);
        self
    }

    /// One instance per kernel.
    pub fn in_singleton_scope(mut self) -> Self {
        self.lifetime = Some(Lifetime::Singleton);
        self
    }

    /// One instance per calling thread.
    pub fn in_thread_scope(mut self) -> Self {
        self.lifetime = Some(Lifetime::custom(|_| Some(current_thread_scope())));
        self
    }

    /// One instance per live `scope`; transient once the scope is dropped.
    pub fn in_activation_scope(mut self, scope: &ActivationScope) -> Self {
        let handle = scope.handle();
        self.lifetime = Some(Lifetime::custom(move |_| {
            handle.is_alive().then(|| handle.clone())
        }));
        self
    }

    /// One instance per scope object returned by `callback`.
    pub fn in_scope<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Context) -> Option<crate::provider::ScopeHandle> + Send + Sync + 'static,
    {
        self.lifetime = Some(Lifetime::custom(callback));
        self
    }

    // ----- Selection -----

    /// Only applies to requests for which `condition` holds.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Only applies to dependencies of an activation requested as `P`.
    pub fn when_injected_into<P: ?Sized + 'static>(self) -> Self {
        self.when(|request| {
            request
                .parent()
                .map(|parent| parent.service().is::<P>())
                .unwrap_or(false)
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match ensure_not_empty(&name, "name") {
            Ok(()) => self.name = Some(name),
            Err(error) => self.errors.push(error),
        }
        self
    }

    // ----- Parameters -----

    pub fn with_constructor_argument<T: Send + Sync + 'static>(self, name: &str, value: T) -> Self {
        let argument = ConstructorArgument::new(name, value).map(Parameter::from);
        self.push_parameter(argument)
    }

    pub fn with_property_value<T: Send + Sync + 'static>(self, name: &str, value: T) -> Self {
        let value = PropertyValue::new(name, value).map(Parameter::from);
        self.push_parameter(value)
    }

    pub fn with_parameter(mut self, parameter: impl Into<Parameter>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    fn push_parameter(mut self, parameter: DiResult<Parameter>) -> Self {
        match parameter {
            Ok(parameter) => self.parameters.push(parameter),
            Err(error) => self.errors.push(error),
        }
        self
    }

    // ----- Actions -----

    /// Runs `action` on each activated instance that is an `I`.
    pub fn on_activation<I, F>(mut self, action: F) -> Self
    where
        I: Send + Sync + 'static,
        F: Fn(&Context, &I) + Send + Sync + 'static,
    {
        self.activation_actions.push(typed_action(action));
        self
    }

    /// Runs `action` on each deactivated instance that is an `I`.
    pub fn on_deactivation<I, F>(mut self, action: F) -> Self
    where
        I: Send + Sync + 'static,
        F: Fn(&Context, &I) + Send + Sync + 'static,
    {
        self.deactivation_actions.push(typed_action(action));
        self
    }

    /// Mutates each new `I` after injection, before it is activated.
    pub fn on_initialization<I, F>(mut self, action: F) -> Self
    where
        I: Send + Sync + 'static,
        F: Fn(&Context, &mut I) -> DiResult<()> + Send + Sync + 'static,
    {
        self.initialization_actions.push(Arc::new(move |context: &Context, mut instance: AnyBox| -> DiResult<AnyBox> {
            if let Some(value) = instance.downcast_mut::<I>() {
                action(context, value)?;
            }
            Ok(instance)
        }));
        self
    }

    /// Adds an untyped initialization action, which may replace the instance.
    pub fn with_initialization_action(mut self, action: InitializationAction) -> Self {
        self.initialization_actions.push(action);
        self
    }
}

impl<S: Send + Sync + 'static> BindingBuilder<S> {
    /// Activates `S` itself through its registered constructors.
    pub fn to_self(mut self) -> Self {
        self.target = Some(BindingTarget::Standard(key_of_type::<S>()));
        self
    }

    /// Creates instances with `factory`.
    pub fn to_method<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Context) -> DiResult<S> + Send + Sync + 'static,
    {
        self.target = Some(BindingTarget::Provider(Arc::new(CallbackProvider::new(factory))));
        self
    }

    /// Hands out `value`; singleton unless another scope is chosen.
    pub fn to_constant(mut self, value: S) -> Self
    where
        S: Clone,
    {
        self.target = Some(BindingTarget::Provider(Arc::new(ConstantProvider::new(value))));
        self.default_lifetime = Lifetime::Singleton;
        self
    }
}

fn typed_action<I, F>(action: F) -> ActivationAction
where
    I: Send + Sync + 'static,
    F: Fn(&Context, &I) + Send + Sync + 'static,
{
    Arc::new(move |context: &Context, reference: &InstanceReference| {
        if let Some(instance) = reference.downcast_ref::<I>() {
            action(context, instance);
        }
    })
}
