//! Activation plans.

use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::reflection::TypeInfo;

use super::directives::{
    ConstructorInjectionDirective, Directive, DirectiveVariant, MethodInjectionDirective,
    PropertyInjectionDirective,
};

/// Describes how one type is constructed and injected.
///
/// A plan is built once per type by the [`Planner`](super::Planner), mutated
/// only while its planning strategies run, and read concurrently afterwards.
/// All directive sequences keep insertion order.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Plan, TypeInfo, PropertyInjectionDirective, key_of_type};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Ninja { stars: u32 }
///
/// let info = Arc::new(
///     TypeInfo::builder::<Ninja>()
///         .default_constructor()
///         .property::<u32, _>("stars", |n, v| n.stars = *v)
///         .build()
///         .unwrap(),
/// );
///
/// let mut plan = Plan::new(info.clone());
/// plan.add(PropertyInjectionDirective::new(&info.properties()[0]).into());
///
/// assert_eq!(plan.key(), key_of_type::<Ninja>());
/// assert!(plan.has::<PropertyInjectionDirective>());
/// assert_eq!(plan.properties()[0].name(), "stars");
/// ```
pub struct Plan {
    info: Arc<TypeInfo>,
    directives: Vec<Directive>,
    constructors: Vec<ConstructorInjectionDirective>,
    properties: Vec<PropertyInjectionDirective>,
    methods: Vec<MethodInjectionDirective>,
}

impl Plan {
    pub fn new(info: Arc<TypeInfo>) -> Self {
        Self {
            info,
            directives: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The planned type.
    pub fn key(&self) -> Key {
        self.info.key()
    }

    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    /// Adds a directive, routing built-in variants to their slot.
    pub fn add(&mut self, directive: Directive) {
        match directive {
            Directive::Constructor(d) => self.constructors.push(d),
            Directive::Property(d) => self.properties.push(d),
            Directive::Method(d) => self.methods.push(d),
            other => self.directives.push(other),
        }
    }

    /// True if at least one directive of type `T` exists.
    pub fn has<T: DirectiveVariant>(&self) -> bool {
        !T::slot(self).is_empty() || self.directives.iter().any(|d| T::from_directive(d).is_some())
    }

    /// The single directive of type `T`, if any.
    ///
    /// Fails with [`DiError::InvalidOperation`] when more than one exists.
    pub fn get_one<T: DirectiveVariant>(&self) -> DiResult<Option<&T>> {
        let mut all = self.get_all::<T>();
        let first = all.next();
        if first.is_some() && all.next().is_some() {
            return Err(DiError::InvalidOperation(format!(
                "plan for {} contains more than one {}",
                self.key().display_name(),
                std::any::type_name::<T>()
            )));
        }
        Ok(first)
    }

    /// Every directive of type `T`: generic directives first, then the
    /// dedicated slot, each in insertion order.
    pub fn get_all<T: DirectiveVariant>(&self) -> impl Iterator<Item = &T> + '_ {
        self.directives
            .iter()
            .filter_map(T::from_directive)
            .chain(T::slot(self).iter())
    }

    pub fn constructors(&self) -> &[ConstructorInjectionDirective] {
        &self.constructors
    }

    pub fn properties(&self) -> &[PropertyInjectionDirective] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodInjectionDirective] {
        &self.methods
    }

    /// Generic directives not covered by a dedicated slot.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn directive_count(&self) -> usize {
        self.directives.len() + self.constructors.len() + self.properties.len() + self.methods.len()
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("type", &self.key().display_name())
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("directives", &self.directives)
            .finish()
    }
}
