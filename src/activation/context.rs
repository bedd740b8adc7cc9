use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::parameters::Parameter;
use crate::planning::Plan;
use crate::registration::{AnyArc, Binding};
use crate::traits::DependencyResolver;

use super::request::Request;

/// All state for one activation attempt.
///
/// A context pairs the request with the binding chosen for it and the plan of
/// the binding's implementation type. Its parameters are the request's
/// parameters followed by the binding's. Contexts are cheap to clone; scoped
/// instances keep theirs so they can be deactivated later.
#[derive(Clone)]
pub struct Context {
    request: Arc<Request>,
    binding: Arc<Binding>,
    plan: Arc<Plan>,
    parameters: Vec<Parameter>,
    resolver: Arc<dyn DependencyResolver>,
}

impl Context {
    pub fn new(
        request: Arc<Request>,
        binding: Arc<Binding>,
        plan: Arc<Plan>,
        resolver: Arc<dyn DependencyResolver>,
    ) -> Self {
        let parameters = request
            .parameters()
            .iter()
            .chain(binding.parameters())
            .cloned()
            .collect();
        Self { request, binding, plan, parameters, resolver }
    }

    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }

    pub fn binding(&self) -> &Arc<Binding> {
        &self.binding
    }

    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Resolver used for dependencies of this activation.
    pub fn resolver(&self) -> &Arc<dyn DependencyResolver> {
        &self.resolver
    }

    /// Parameters that propagate to dependency requests.
    pub fn inherited_parameters(&self) -> Vec<Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.should_inherit())
            .cloned()
            .collect()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .field("binding", &self.binding)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// An activated instance passed through activation and deactivation strategies.
#[derive(Clone)]
pub struct InstanceReference {
    instance: AnyArc,
}

impl InstanceReference {
    pub fn new(instance: AnyArc) -> Self {
        Self { instance }
    }

    pub fn instance(&self) -> &AnyArc {
        &self.instance
    }

    pub fn is<T: Any>(&self) -> bool {
        self.instance.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }

    /// True when both references point at the same allocation.
    pub fn same_as(&self, other: &InstanceReference) -> bool {
        Arc::as_ptr(&self.instance) as *const () == Arc::as_ptr(&other.instance) as *const ()
    }

    pub fn into_inner(self) -> AnyArc {
        self.instance
    }
}

impl fmt::Debug for InstanceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceReference")
            .field("address", &Arc::as_ptr(&self.instance))
            .finish()
    }
}
