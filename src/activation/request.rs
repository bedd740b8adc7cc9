use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::key::{key_of_type, Key};
use crate::parameters::Parameter;
use crate::planning::{Target, TargetKind};
use crate::registration::BindingId;

/// A request to resolve one service.
///
/// Root requests come from the caller; child requests are created by
/// [`Target::resolve_within`] for each injection point and keep a link to
/// the request they were made for, so error messages can print the whole
/// activation path.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{ConstructorArgument, Request};
///
/// let request = Request::of::<String>()
///     .named("greeting")
///     .with_parameter(ConstructorArgument::new("text", "hi").unwrap().into());
///
/// assert_eq!(request.name(), Some("greeting"));
/// assert_eq!(request.depth(), 0);
/// assert_eq!(request.parameters().len(), 1);
/// ```
#[derive(Clone)]
pub struct Request {
    service: Key,
    name: Option<String>,
    parameters: Vec<Parameter>,
    target: Option<Target>,
    parent: Option<Arc<Request>>,
    depth: usize,
    optional: bool,
    binding: Option<BindingId>,
}

impl Request {
    pub fn new(service: Key) -> Self {
        Self {
            service,
            name: None,
            parameters: Vec::new(),
            target: None,
            parent: None,
            depth: 0,
            optional: false,
            binding: None,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(key_of_type::<T>())
    }

    /// Restricts resolution to bindings registered under `name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// An optional request resolves to nothing instead of failing when no binding exists.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Marks this request as being activated through `binding`.
    pub(crate) fn activating(mut self, binding: BindingId) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Creates the request for a dependency of this one.
    pub fn create_child(self: &Arc<Self>, target: &Target, parameters: Vec<Parameter>) -> Request {
        Request {
            service: target.service(),
            name: None,
            parameters,
            target: Some(target.clone()),
            parent: Some(self.clone()),
            depth: self.depth + 1,
            optional: target.has_default_value(),
            binding: None,
        }
    }

    pub fn service(&self) -> Key {
        self.service
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The injection point this request was created for, `None` for root requests.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn parent(&self) -> Option<&Arc<Request>> {
        self.parent.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The binding this request is being activated through, once one was selected.
    pub fn binding(&self) -> Option<BindingId> {
        self.binding
    }

    /// The request chain from the root down to this request, one numbered line each.
    pub fn activation_path(&self) -> String {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent.as_deref() {
            chain.push(parent);
            current = parent;
        }

        let mut out = String::new();
        for (index, request) in chain.iter().rev().enumerate() {
            let _ = writeln!(out, "  {}) {}", index + 1, request.describe());
        }
        out
    }

    fn describe(&self) -> String {
        match (&self.target, &self.parent) {
            (Some(target), Some(parent)) => {
                let place = match target.kind() {
                    TargetKind::Parameter { .. } => "parameter",
                    TargetKind::Property => "property",
                };
                format!(
                    "Injection of dependency {} into {} {} of {}",
                    self.service.short_name(),
                    place,
                    target.name(),
                    parent.service.short_name()
                )
            }
            _ => format!("Request for {}", self.service.short_name()),
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("service", &self.service.display_name())
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("depth", &self.depth)
            .field("optional", &self.optional)
            .finish()
    }
}
