//! Per-request parameter overrides.
//!
//! Parameters let a caller (or a binding) take precedence over standard
//! resolution for one named injection point. Constructor arguments are
//! consulted by the standard provider; property values by the property
//! injection strategy. At most one parameter may apply to a target.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::activation::Context;
use crate::error::{ensure_not_empty, DiResult};
use crate::key::{key_of_type, Key};
use crate::planning::Target;
use crate::registration::AnyArc;

/// Produces an override value for a target.
pub type ValueCallback = Arc<dyn Fn(&Context, &Target) -> AnyArc + Send + Sync>;

fn constant(value: AnyArc) -> ValueCallback {
    Arc::new(move |_, _| value.clone())
}

fn typed_callback<T, F>(callback: F) -> ValueCallback
where
    T: Send + Sync + 'static,
    F: Fn(&Context, &Target) -> T + Send + Sync + 'static,
{
    Arc::new(move |ctx, target| Arc::new(callback(ctx, target)) as AnyArc)
}

/// Overrides the constructor parameter with the same name.
#[derive(Clone)]
pub struct ConstructorArgument {
    name: String,
    value: ValueCallback,
    should_inherit: bool,
}

impl ConstructorArgument {
    /// Overrides parameter `name` with `value`.
    ///
    /// ```rust
    /// use ferrous_kernel::{ConstructorArgument, DiError};
    ///
    /// let arg = ConstructorArgument::new("port", 8080u16).unwrap();
    /// assert_eq!(arg.name(), "port");
    /// assert!(matches!(ConstructorArgument::new("", 1u8), Err(DiError::NullArgument("name"))));
    /// ```
    pub fn new<T: Send + Sync + 'static>(name: impl Into<String>, value: T) -> DiResult<Self> {
        Self::from_value(name, Arc::new(value))
    }

    /// Overrides parameter `name` with an already shared value.
    pub fn from_value(name: impl Into<String>, value: AnyArc) -> DiResult<Self> {
        let name = name.into();
        ensure_not_empty(&name, "name")?;
        Ok(Self { name, value: constant(value), should_inherit: false })
    }

    /// Overrides parameter `name` with a value computed per activation.
    pub fn from_callback<T, F>(name: impl Into<String>, callback: F) -> DiResult<Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Context, &Target) -> T + Send + Sync + 'static,
    {
        let name = name.into();
        ensure_not_empty(&name, "name")?;
        Ok(Self { name, value: typed_callback(callback), should_inherit: false })
    }

    /// Propagates the argument to dependency requests.
    pub fn inherited(mut self, should_inherit: bool) -> Self {
        self.should_inherit = should_inherit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Overrides every constructor parameter whose declared type matches.
#[derive(Clone)]
pub struct TypeMatchingConstructorArgument {
    service: Key,
    value: ValueCallback,
    should_inherit: bool,
}

impl TypeMatchingConstructorArgument {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            service: key_of_type::<T>(),
            value: constant(Arc::new(value)),
            should_inherit: false,
        }
    }

    pub fn from_callback<T, F>(callback: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Context, &Target) -> T + Send + Sync + 'static,
    {
        Self {
            service: key_of_type::<T>(),
            value: typed_callback(callback),
            should_inherit: false,
        }
    }

    pub fn inherited(mut self, should_inherit: bool) -> Self {
        self.should_inherit = should_inherit;
        self
    }

    pub fn service(&self) -> Key {
        self.service
    }
}

/// Overrides the property with the same name.
#[derive(Clone)]
pub struct PropertyValue {
    name: String,
    value: ValueCallback,
    should_inherit: bool,
}

impl PropertyValue {
    /// Sets property `name` to `value`.
    ///
    /// ```rust
    /// use ferrous_kernel::PropertyValue;
    ///
    /// let value = PropertyValue::new("retries", 3u32).unwrap();
    /// assert_eq!(value.name(), "retries");
    /// assert!(PropertyValue::new("", 3u32).is_err());
    /// ```
    pub fn new<T: Send + Sync + 'static>(name: impl Into<String>, value: T) -> DiResult<Self> {
        Self::from_value(name, Arc::new(value))
    }

    pub fn from_value(name: impl Into<String>, value: AnyArc) -> DiResult<Self> {
        let name = name.into();
        ensure_not_empty(&name, "name")?;
        Ok(Self { name, value: constant(value), should_inherit: false })
    }

    pub fn from_callback<T, F>(name: impl Into<String>, callback: F) -> DiResult<Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Context, &Target) -> T + Send + Sync + 'static,
    {
        let name = name.into();
        ensure_not_empty(&name, "name")?;
        Ok(Self { name, value: typed_callback(callback), should_inherit: false })
    }

    pub fn inherited(mut self, should_inherit: bool) -> Self {
        self.should_inherit = should_inherit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Property value that observes its payload without keeping it alive.
///
/// Once every strong reference to the payload is gone the override yields
/// nothing, and property injection behaves as if it had not been supplied.
///
/// ```rust
/// use ferrous_kernel::WeakPropertyValue;
/// use std::sync::Arc;
///
/// let payload = Arc::new(String::from("cached"));
/// let value = WeakPropertyValue::new("cache", &payload).unwrap();
/// assert!(value.is_alive());
///
/// drop(payload);
/// assert!(!value.is_alive());
/// ```
#[derive(Clone)]
pub struct WeakPropertyValue {
    name: String,
    value: Weak<dyn Any + Send + Sync>,
    should_inherit: bool,
}

impl WeakPropertyValue {
    pub fn new<T: Send + Sync + 'static>(name: impl Into<String>, value: &Arc<T>) -> DiResult<Self> {
        let name = name.into();
        ensure_not_empty(&name, "name")?;
        let erased: AnyArc = value.clone();
        Ok(Self {
            name,
            value: Arc::downgrade(&erased),
            should_inherit: false,
        })
    }

    pub fn inherited(mut self, should_inherit: bool) -> Self {
        self.should_inherit = should_inherit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_alive(&self) -> bool {
        self.value.strong_count() > 0
    }
}

/// A parameter override attached to a request or binding.
#[derive(Clone)]
pub enum Parameter {
    ConstructorArgument(ConstructorArgument),
    TypeMatchingConstructorArgument(TypeMatchingConstructorArgument),
    PropertyValue(PropertyValue),
    WeakPropertyValue(WeakPropertyValue),
}

impl Parameter {
    /// Name matched against target names.
    pub fn name(&self) -> &str {
        match self {
            Parameter::ConstructorArgument(p) => &p.name,
            Parameter::TypeMatchingConstructorArgument(p) => p.service.display_name(),
            Parameter::PropertyValue(p) => &p.name,
            Parameter::WeakPropertyValue(p) => &p.name,
        }
    }

    /// Whether the override propagates to dependency requests.
    pub fn should_inherit(&self) -> bool {
        match self {
            Parameter::ConstructorArgument(p) => p.should_inherit,
            Parameter::TypeMatchingConstructorArgument(p) => p.should_inherit,
            Parameter::PropertyValue(p) => p.should_inherit,
            Parameter::WeakPropertyValue(p) => p.should_inherit,
        }
    }

    /// The override value for `target`; `None` once a weak payload has been dropped.
    pub fn get_value(&self, context: &Context, target: &Target) -> Option<AnyArc> {
        match self {
            Parameter::ConstructorArgument(p) => Some((p.value)(context, target)),
            Parameter::TypeMatchingConstructorArgument(p) => Some((p.value)(context, target)),
            Parameter::PropertyValue(p) => Some((p.value)(context, target)),
            Parameter::WeakPropertyValue(p) => p.value.upgrade(),
        }
    }

    /// Whether this parameter overrides `target`.
    pub fn applies_to_target(&self, _context: &Context, target: &Target) -> bool {
        match self {
            Parameter::TypeMatchingConstructorArgument(p) => p.service == target.service(),
            _ => self.name() == target.name(),
        }
    }

    pub fn is_constructor_argument(&self) -> bool {
        matches!(
            self,
            Parameter::ConstructorArgument(_) | Parameter::TypeMatchingConstructorArgument(_)
        )
    }

    pub fn is_property_value(&self) -> bool {
        matches!(self, Parameter::PropertyValue(_) | Parameter::WeakPropertyValue(_))
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Parameter::ConstructorArgument(_) => "ConstructorArgument",
            Parameter::TypeMatchingConstructorArgument(_) => "TypeMatchingConstructorArgument",
            Parameter::PropertyValue(_) => "PropertyValue",
            Parameter::WeakPropertyValue(_) => "WeakPropertyValue",
        };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("should_inherit", &self.should_inherit())
            .finish()
    }
}

impl From<ConstructorArgument> for Parameter {
    fn from(value: ConstructorArgument) -> Self {
        Parameter::ConstructorArgument(value)
    }
}

impl From<TypeMatchingConstructorArgument> for Parameter {
    fn from(value: TypeMatchingConstructorArgument) -> Self {
        Parameter::TypeMatchingConstructorArgument(value)
    }
}

impl From<PropertyValue> for Parameter {
    fn from(value: PropertyValue) -> Self {
        Parameter::PropertyValue(value)
    }
}

impl From<WeakPropertyValue> for Parameter {
    fn from(value: WeakPropertyValue) -> Self {
        Parameter::WeakPropertyValue(value)
    }
}
