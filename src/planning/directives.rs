//! Plan directives.
//!
//! Each directive pairs a registered member with its injector and the
//! targets describing its injection points. Directives are immutable once
//! created and owned by the plan that holds them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::reflection::{Arguments, ConstructorInfo, MethodInfo, PropertyInfo};
use crate::registration::{AnyArc, AnyBox};

use super::plan::Plan;
use super::targets::Target;

/// Instructs the provider how to construct the type.
#[derive(Clone)]
pub struct ConstructorInjectionDirective {
    constructor: ConstructorInfo,
    targets: Vec<Target>,
}

impl ConstructorInjectionDirective {
    pub fn new(constructor: &ConstructorInfo) -> Self {
        let targets = constructor
            .parameters()
            .iter()
            .enumerate()
            .map(|(position, p)| Target::from_parameter(position, p))
            .collect();
        Self { constructor: constructor.clone(), targets }
    }

    pub fn constructor(&self) -> &ConstructorInfo {
        &self.constructor
    }

    /// One target per parameter, in declared order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn has_inject_marker(&self) -> bool {
        self.constructor.is_marked_inject()
    }

    /// Runs the constructor with `arguments`.
    pub fn inject(&self, arguments: &Arguments) -> DiResult<AnyBox> {
        (self.constructor.injector())(arguments)
    }
}

impl fmt::Debug for ConstructorInjectionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInjectionDirective")
            .field("targets", &self.targets)
            .field("inject", &self.has_inject_marker())
            .finish()
    }
}

/// Instructs the property injection strategy to write one property.
#[derive(Clone)]
pub struct PropertyInjectionDirective {
    property: PropertyInfo,
    target: Target,
}

impl PropertyInjectionDirective {
    pub fn new(property: &PropertyInfo) -> Self {
        Self {
            property: property.clone(),
            target: Target::from_property(property),
        }
    }

    pub fn property(&self) -> &PropertyInfo {
        &self.property
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }

    /// Writes `value` into the property of `instance`.
    pub fn inject(&self, instance: &mut (dyn Any + Send + Sync), value: AnyArc) -> DiResult<()> {
        (self.property.injector())(instance, value)
    }
}

impl fmt::Debug for PropertyInjectionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInjectionDirective")
            .field("target", &self.target)
            .finish()
    }
}

/// Instructs the method injection strategy to invoke one method.
#[derive(Clone)]
pub struct MethodInjectionDirective {
    method: MethodInfo,
    targets: Vec<Target>,
}

impl MethodInjectionDirective {
    pub fn new(method: &MethodInfo) -> Self {
        let targets = method
            .parameters()
            .iter()
            .enumerate()
            .map(|(position, p)| Target::from_parameter(position, p))
            .collect();
        Self { method: method.clone(), targets }
    }

    pub fn method(&self) -> &MethodInfo {
        &self.method
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// Invokes the method on `instance` with `arguments`.
    pub fn inject(&self, instance: &mut (dyn Any + Send + Sync), arguments: &Arguments) -> DiResult<()> {
        (self.method.injector())(instance, arguments)
    }
}

impl fmt::Debug for MethodInjectionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInjectionDirective")
            .field("name", &self.method.name())
            .field("targets", &self.targets)
            .finish()
    }
}

/// Any directive a plan can hold.
///
/// The three built-in variants are stored in dedicated slots of the plan;
/// `Custom` carries directives contributed by user planning strategies.
#[derive(Clone)]
pub enum Directive {
    Constructor(ConstructorInjectionDirective),
    Property(PropertyInjectionDirective),
    Method(MethodInjectionDirective),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Directive {
    /// Wraps a user-defined directive value.
    pub fn custom<D: Any + Send + Sync>(directive: D) -> Self {
        Directive::Custom(Arc::new(directive))
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Constructor(d) => d.fmt(f),
            Directive::Property(d) => d.fmt(f),
            Directive::Method(d) => d.fmt(f),
            Directive::Custom(_) => f.write_str("CustomDirective"),
        }
    }
}

impl From<ConstructorInjectionDirective> for Directive {
    fn from(value: ConstructorInjectionDirective) -> Self {
        Directive::Constructor(value)
    }
}

impl From<PropertyInjectionDirective> for Directive {
    fn from(value: PropertyInjectionDirective) -> Self {
        Directive::Property(value)
    }
}

impl From<MethodInjectionDirective> for Directive {
    fn from(value: MethodInjectionDirective) -> Self {
        Directive::Method(value)
    }
}

/// A directive type that can be queried on a [`Plan`].
///
/// The built-in directives read their dedicated slot; custom directive types
/// only need an empty impl and are found among the plan's generic directives.
///
/// ```rust
/// use ferrous_kernel::{Directive, DirectiveVariant, Plan, TypeInfo};
/// use std::sync::Arc;
///
/// struct Audit(&'static str);
/// impl DirectiveVariant for Audit {}
///
/// let mut plan = Plan::new(Arc::new(TypeInfo::opaque(ferrous_kernel::key_of_type::<u8>())));
/// plan.add(Directive::custom(Audit("created")));
/// assert!(plan.has::<Audit>());
/// assert_eq!(plan.get_one::<Audit>().unwrap().unwrap().0, "created");
/// ```
pub trait DirectiveVariant: Any + Send + Sync + Sized {
    /// The plan slot dedicated to this variant, empty for custom directives.
    fn slot(_plan: &Plan) -> &[Self] {
        &[]
    }

    /// Views a generic directive as this variant.
    fn from_directive(directive: &Directive) -> Option<&Self> {
        match directive {
            Directive::Custom(custom) => custom.downcast_ref::<Self>(),
            _ => None,
        }
    }
}

impl DirectiveVariant for ConstructorInjectionDirective {
    fn slot(plan: &Plan) -> &[Self] {
        plan.constructors()
    }

    fn from_directive(directive: &Directive) -> Option<&Self> {
        match directive {
            Directive::Constructor(d) => Some(d),
            _ => None,
        }
    }
}

impl DirectiveVariant for PropertyInjectionDirective {
    fn slot(plan: &Plan) -> &[Self] {
        plan.properties()
    }

    fn from_directive(directive: &Directive) -> Option<&Self> {
        match directive {
            Directive::Property(d) => Some(d),
            _ => None,
        }
    }
}

impl DirectiveVariant for MethodInjectionDirective {
    fn slot(plan: &Plan) -> &[Self] {
        plan.methods()
    }

    fn from_directive(directive: &Directive) -> Option<&Self> {
        match directive {
            Directive::Method(d) => Some(d),
            _ => None,
        }
    }
}
