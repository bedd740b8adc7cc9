//! The kernel: binding selection, scoping and the activation entry point.
//!
//! A [`Kernel`] owns the planner, the pipeline and every scoped instance it
//! activated. It is cheap to clone and fully thread-safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::activation::{
    ActivationCache, ConstructorScorer, Context, InstanceReference, Pipeline, Request, StandardProvider,
};
use crate::config::KernelSettings;
use crate::error::{DiError, DiResult};
use crate::formatter;
use crate::key::Key;
use crate::observer::Observers;
use crate::planning::Planner;
use crate::reflection::TypeRegistry;
use crate::registration::{AnyArc, Binding, BindingId, BindingRegistry};
use crate::traits::DependencyResolver;

pub mod scope;
pub use scope::{ActivationScope, ScopeHandle};
pub(crate) use scope::current_thread_scope;
use scope::{CacheEntry, Remembered, ScopeCache};

/// Dependency injection kernel.
///
/// Resolution selects a binding for the request, plans the binding's
/// implementation type once, and runs the activation pipeline. Instances
/// bound to a scope are remembered until the scope is released, the kernel
/// is pruned after the scope object was dropped, or the kernel is disposed.
///
/// # Examples
///
/// ```
/// use ferrous_kernel::{Kernel, ParameterInfo, Resolver, TypeInfo};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Sword;
///
/// struct Samurai {
///     weapon: Arc<Sword>,
/// }
///
/// let kernel = Kernel::builder()
///     .register(TypeInfo::builder::<Sword>().default_constructor())
///     .register(
///         TypeInfo::builder::<Samurai>()
///             .constructor([ParameterInfo::of::<Sword>("weapon")], |args| {
///                 Ok(Samurai { weapon: args.get::<Sword>(0)? })
///             }),
///     )
///     .bind::<Sword, _>(|b| b.to_self().in_singleton_scope())
///     .build()
///     .unwrap();
///
/// let first = kernel.get::<Samurai>().unwrap();
/// let second = kernel.get::<Samurai>().unwrap();
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.weapon, &second.weapon));
/// ```
#[derive(Clone)]
pub struct Kernel {
    inner: Arc<KernelInner>,
}

pub(crate) struct KernelInner {
    settings: KernelSettings,
    bindings: BindingRegistry,
    types: Arc<TypeRegistry>,
    planner: Planner,
    pipeline: Pipeline,
    cache: Arc<ActivationCache>,
    scopes: ScopeCache,
    // Owns the singleton scope for the kernel's whole life
    _root_scope: ActivationScope,
    root: ScopeHandle,
    implicit: DashMap<Key, Arc<Binding>, ahash::RandomState>,
    observers: Observers,
    scorer: Arc<dyn ConstructorScorer>,
    modules: Vec<String>,
    resolver: Arc<dyn DependencyResolver>,
    disposed: AtomicBool,
}

/// Parts the builder hands over to a new kernel.
pub(crate) struct KernelParts {
    pub(crate) settings: KernelSettings,
    pub(crate) bindings: BindingRegistry,
    pub(crate) types: Arc<TypeRegistry>,
    pub(crate) planner: Planner,
    pub(crate) pipeline: Pipeline,
    pub(crate) cache: Arc<ActivationCache>,
    pub(crate) observers: Observers,
    pub(crate) scorer: Arc<dyn ConstructorScorer>,
    pub(crate) modules: Vec<String>,
}

/// Resolver handed to contexts; it does not keep the kernel alive.
struct WeakKernel {
    inner: Weak<KernelInner>,
}

impl DependencyResolver for WeakKernel {
    fn resolve(&self, request: &Request) -> DiResult<Option<AnyArc>> {
        match self.inner.upgrade() {
            Some(inner) => inner.resolve(request),
            None => Err(DiError::InvalidOperation(formatter::kernel_disposed(request))),
        }
    }

    fn can_resolve(&self, request: &Request) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.can_resolve(request))
            .unwrap_or(false)
    }
}

impl Kernel {
    /// Starts configuring a new kernel.
    pub fn builder() -> crate::collection::KernelBuilder {
        crate::collection::KernelBuilder::new()
    }

    pub(crate) fn from_parts(parts: KernelParts) -> Self {
        let root_scope = ActivationScope::new();
        let root = root_scope.handle();
        let inner = Arc::new_cyclic(|weak: &Weak<KernelInner>| KernelInner {
            settings: parts.settings,
            bindings: parts.bindings,
            types: parts.types,
            planner: parts.planner,
            pipeline: parts.pipeline,
            cache: parts.cache,
            scopes: ScopeCache::new(),
            _root_scope: root_scope,
            root,
            implicit: DashMap::with_hasher(ahash::RandomState::new()),
            observers: parts.observers,
            scorer: parts.scorer,
            modules: parts.modules,
            resolver: Arc::new(WeakKernel { inner: weak.clone() }),
            disposed: AtomicBool::new(false),
        });
        debug!(
            bindings = inner.bindings.len(),
            types = inner.types.len(),
            modules = inner.modules.len(),
            "kernel built"
        );
        Self { inner }
    }

    pub fn settings(&self) -> &KernelSettings {
        &self.inner.settings
    }

    pub fn planner(&self) -> &Planner {
        &self.inner.planner
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    /// The kernel-wide activation cache, also when the pipeline ignores it.
    pub fn activation_cache(&self) -> &Arc<ActivationCache> {
        &self.inner.cache
    }

    /// Number of explicit bindings.
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.len()
    }

    /// Explicit bindings for `service`, in registration order.
    pub fn bindings_for(&self, service: Key) -> &[Arc<Binding>] {
        self.inner.bindings.get(&service)
    }

    /// Number of instances currently remembered by any scope.
    pub fn scoped_instance_count(&self) -> usize {
        self.inner.scopes.len()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.inner.modules.iter().any(|m| m == name)
    }

    /// Names of the loaded modules, in load order.
    pub fn modules(&self) -> &[String] {
        &self.inner.modules
    }

    /// Deactivates and forgets the scoped instance `instance`.
    ///
    /// Returns `false` when the kernel was not remembering it, which is
    /// always the case for transient instances.
    pub fn release<T: ?Sized>(&self, instance: &Arc<T>) -> DiResult<bool> {
        let address = Arc::as_ptr(instance) as *const () as usize;
        let released = self.inner.scopes.release(address);
        let found = !released.is_empty();
        self.inner.deactivate_all(released)?;
        Ok(found)
    }

    /// Deactivates everything activated into `scope`; returns how many instances.
    pub fn release_scope(&self, scope: &ActivationScope) -> DiResult<usize> {
        self.release_handle(&scope.handle())
    }

    pub fn release_handle(&self, scope: &ScopeHandle) -> DiResult<usize> {
        let released = self.inner.scopes.clear(scope);
        self.inner.deactivate_all(released)
    }

    /// Deactivates instances whose scope object was dropped and forgets
    /// activation cache entries for dropped instances.
    pub fn prune(&self) -> DiResult<usize> {
        let released = self.inner.scopes.prune();
        let count = self.inner.deactivate_all(released)?;
        self.inner.cache.prune();
        trace!(released = count, "pruned");
        Ok(count)
    }

    /// Deactivates every scoped instance, newest first.
    ///
    /// Later resolutions fail. Calling it again does nothing; dropping the
    /// last clone of the kernel disposes it too.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }
}

impl DependencyResolver for Kernel {
    fn resolve(&self, request: &Request) -> DiResult<Option<AnyArc>> {
        self.inner.resolve(request)
    }

    fn can_resolve(&self, request: &Request) -> bool {
        self.inner.can_resolve(request)
    }
}

impl KernelInner {
    fn resolve(&self, request: &Request) -> DiResult<Option<AnyArc>> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(DiError::InvalidOperation(formatter::kernel_disposed(request)));
        }
        if request.depth() > self.settings.max_resolution_depth {
            return Err(DiError::DepthExceeded(self.settings.max_resolution_depth));
        }

        let Some(binding) = self.select_binding(request)? else {
            if request.is_optional() {
                return Ok(None);
            }
            return Err(DiError::NotFound(request.service().display_name()));
        };
        if is_cyclic(request, binding.id()) {
            return Err(DiError::Activation(formatter::cyclic_dependency(request)));
        }

        let plan = self.planner.get_plan(binding.provider().implementation_type())?;
        let request = Arc::new(request.clone().activating(binding.id()));
        let context = Context::new(request, binding, plan, self.resolver.clone());
        let instance = self.activate(&context)?;
        context.binding().expose(instance).map(Some)
    }

    fn can_resolve(&self, request: &Request) -> bool {
        if self.disposed.load(Ordering::Acquire) {
            return false;
        }
        let bindings = self.bindings.get(&request.service());
        if bindings.iter().any(|b| b.matches(request)) {
            return true;
        }
        bindings.is_empty() && request.name().is_none() && self.self_bindable(request.service())
    }

    /// Conditional bindings that match win over unconditional ones.
    fn select_binding(&self, request: &Request) -> DiResult<Option<Arc<Binding>>> {
        let bindings = self.bindings.get(&request.service());
        if bindings.is_empty() {
            if request.name().is_some() {
                return Ok(None);
            }
            return Ok(self.implicit_binding(request.service()));
        }

        let matching: Vec<&Arc<Binding>> = bindings.iter().filter(|b| b.matches(request)).collect();
        let conditional: Vec<&Arc<Binding>> =
            matching.iter().copied().filter(|b| b.is_conditional()).collect();
        let candidates = if conditional.is_empty() { matching } else { conditional };

        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(Arc::clone(only))),
            many => Err(DiError::Activation(formatter::multiple_bindings(request, many.len()))),
        }
    }

    fn self_bindable(&self, service: Key) -> bool {
        self.settings.allow_implicit_self_binding
            && self
                .types
                .get(&service)
                .map(|info| !info.constructors().is_empty())
                .unwrap_or(false)
    }

    fn implicit_binding(&self, service: Key) -> Option<Arc<Binding>> {
        if !self.self_bindable(service) {
            return None;
        }
        if let Some(binding) = self.implicit.get(&service) {
            return Some(binding.clone());
        }
        let provider = Arc::new(StandardProvider::new(service, self.scorer.clone()));
        let binding = Arc::new(Binding::new(service, provider).implicit());
        trace!(service = service.display_name(), "implicit self-binding");
        Some(self.implicit.entry(service).or_insert(binding).clone())
    }

    fn activate(&self, context: &Context) -> DiResult<AnyArc> {
        if !self.observers.has_observers() {
            return self.activate_in_scope(context);
        }
        let started = Instant::now();
        self.observers.activating(context);
        let result = self.activate_in_scope(context);
        match &result {
            Ok(_) => self.observers.activated(context, started.elapsed()),
            Err(error) => self.observers.activation_failed(context.request(), error),
        }
        result
    }

    fn activate_in_scope(&self, context: &Context) -> DiResult<AnyArc> {
        let Some(scope) = context.binding().lifetime().scope_for(context, &self.root) else {
            let instance: AnyArc = Arc::from(self.pipeline.create(context)?);
            self.pipeline.activate(context, &InstanceReference::new(instance.clone()))?;
            return Ok(instance);
        };

        if let Some(existing) = self.scopes.try_get(context.binding().id(), &scope) {
            return Ok(existing);
        }

        // Never hold the scope cache lock while creating; the first stored instance wins
        let instance: AnyArc = Arc::from(self.pipeline.create(context)?);
        match self.scopes.remember(context, &scope, instance.clone()) {
            Remembered::Existing(existing) => {
                trace!(
                    service = context.request().service().display_name(),
                    "lost activation race, discarding instance"
                );
                Ok(existing)
            }
            Remembered::Stored { stale } => {
                if let Some(stale) = stale {
                    self.deactivate(stale)?;
                }
                self.pipeline.activate(context, &InstanceReference::new(instance.clone()))?;
                Ok(instance)
            }
        }
    }

    fn deactivate(&self, entry: CacheEntry) -> DiResult<()> {
        let reference = InstanceReference::new(entry.instance);
        self.pipeline.deactivate(&entry.context, &reference)?;
        self.observers.deactivated(&entry.context);
        Ok(())
    }

    /// Deactivates every entry; the first failure is returned after all ran.
    fn deactivate_all(&self, entries: Vec<CacheEntry>) -> DiResult<usize> {
        let count = entries.len();
        let mut first_error = None;
        for entry in entries {
            if let Err(error) = self.deactivate(entry) {
                warn!(%error, "deactivation failed");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(count),
        }
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let entries = self.scopes.clear_all();
        debug!(instances = entries.len(), "disposing kernel");
        // Failures are logged by deactivate_all
        let _ = self.deactivate_all(entries);
        self.implicit.clear();
        self.cache.clear();
    }
}

impl Drop for KernelInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// True when an ancestor is already being activated through `binding`.
fn is_cyclic(request: &Request, binding: BindingId) -> bool {
    let mut parent = request.parent();
    while let Some(ancestor) = parent {
        if ancestor.binding() == Some(binding) {
            return true;
        }
        parent = ancestor.parent();
    }
    false
}
