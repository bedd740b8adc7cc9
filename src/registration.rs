//! Binding types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::activation::{Context, InstanceReference, Provider, Request};
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::parameters::Parameter;

// Type-erased Arc for shared instances and injected values
pub type AnyArc = Arc<dyn Any + Send + Sync>;
// Type-erased Box for instances still being initialized
pub type AnyBox = Box<dyn Any + Send + Sync>;

/// Callback run on activation or deactivation of an instance.
pub type ActivationAction = Arc<dyn Fn(&Context, &InstanceReference) + Send + Sync>;
/// Callback run as the last initialization stage; may replace the instance.
pub type InitializationAction = Arc<dyn Fn(&Context, AnyBox) -> DiResult<AnyBox> + Send + Sync>;
/// Predicate deciding whether a binding applies to a request.
pub type BindingCondition = Arc<dyn Fn(&Request) -> bool + Send + Sync>;
/// Converts an activated implementation instance into the value requesters receive.
pub type Exposer = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique binding identity, used to key scoped instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        BindingId(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A resolved type-to-implementation binding.
///
/// Bindings are assembled by the kernel builder and are immutable once the
/// kernel is built; the activation core only reads them.
#[derive(Clone)]
pub struct Binding {
    id: BindingId,
    service: Key,
    provider: Arc<dyn Provider>,
    lifetime: Lifetime,
    condition: Option<BindingCondition>,
    name: Option<String>,
    module: Option<String>,
    implicit: bool,
    parameters: Vec<Parameter>,
    initialization_actions: Vec<InitializationAction>,
    activation_actions: Vec<ActivationAction>,
    deactivation_actions: Vec<ActivationAction>,
    exposer: Option<Exposer>,
}

impl Binding {
    /// Creates a transient, unconditional binding.
    pub fn new(service: Key, provider: Arc<dyn Provider>) -> Self {
        Self {
            id: BindingId::next(),
            service,
            provider,
            lifetime: Lifetime::Transient,
            condition: None,
            name: None,
            module: None,
            implicit: false,
            parameters: Vec::new(),
            initialization_actions: Vec::new(),
            activation_actions: Vec::new(),
            deactivation_actions: Vec::new(),
            exposer: None,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_condition(mut self, condition: BindingCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_initialization_action(mut self, action: InitializationAction) -> Self {
        self.initialization_actions.push(action);
        self
    }

    pub fn with_activation_action(mut self, action: ActivationAction) -> Self {
        self.activation_actions.push(action);
        self
    }

    pub fn with_deactivation_action(mut self, action: ActivationAction) -> Self {
        self.deactivation_actions.push(action);
        self
    }

    /// Hands requesters `exposer(instance)` instead of the implementation instance.
    pub fn with_exposer(mut self, exposer: Exposer) -> Self {
        self.exposer = Some(exposer);
        self
    }

    pub(crate) fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub(crate) fn set_module(&mut self, module: Option<String>) {
        self.module = module;
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn service(&self) -> Key {
        self.service
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name of the module that registered this binding, if any.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn initialization_actions(&self) -> &[InitializationAction] {
        &self.initialization_actions
    }

    pub fn activation_actions(&self) -> &[ActivationAction] {
        &self.activation_actions
    }

    pub fn deactivation_actions(&self) -> &[ActivationAction] {
        &self.deactivation_actions
    }

    /// The value handed to requesters for an activated `instance`.
    pub fn expose(&self, instance: AnyArc) -> DiResult<AnyArc> {
        match &self.exposer {
            Some(exposer) => exposer(instance),
            None => Ok(instance),
        }
    }

    /// True when the request's name constraint and this binding's condition both hold.
    pub fn matches(&self, request: &Request) -> bool {
        if let Some(wanted) = request.name() {
            if self.name.as_deref() != Some(wanted) {
                return false;
            }
        }
        match &self.condition {
            Some(condition) => condition(request),
            None => true,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("service", &self.service.display_name())
            .field("implementation", &self.provider.implementation_type().display_name())
            .field("lifetime", &self.lifetime)
            .field("name", &self.name)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

/// Binding registry keyed by service type, preserving registration order.
#[derive(Default, Clone)]
pub(crate) struct BindingRegistry {
    bindings: HashMap<Key, Vec<Arc<Binding>>, ahash::RandomState>,
}

impl BindingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, binding: Binding) {
        self.bindings
            .entry(binding.service())
            .or_default()
            .push(Arc::new(binding));
    }

    pub(crate) fn get(&self, key: &Key) -> &[Arc<Binding>] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }
}
