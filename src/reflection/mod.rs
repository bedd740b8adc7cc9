//! Registration-time type metadata.
//!
//! Rust has no runtime reflection, so every injectable type describes its
//! constructors, properties and methods once, at configuration time, through
//! [`TypeInfo::builder`]. The closures registered here are the "compiled
//! injectors" the planner wraps into directives: each performs exactly one
//! construction, write or invocation and holds no state of its own.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{ensure_not_empty, DiError, DiResult};
use crate::key::{key_of_type, Key};
use crate::registration::{AnyArc, AnyBox};
use crate::traits::{Dispose, Initializable, Startable};

pub mod heuristics;
pub mod selector;

pub use heuristics::{InjectionHeuristic, StandardInjectionHeuristic};
pub use selector::{ReflectionSelector, StandardSelector};

/// Creates an instance from resolved constructor arguments.
pub type ConstructorInjector = Arc<dyn Fn(&Arguments) -> DiResult<AnyBox> + Send + Sync>;
/// Writes one value into a property of an instance.
pub type PropertyInjector =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), AnyArc) -> DiResult<()> + Send + Sync>;
/// Invokes one method of an instance with resolved arguments.
pub type MethodInjector =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &Arguments) -> DiResult<()> + Send + Sync>;

type InitializeHook = Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> DiResult<()> + Send + Sync>;
type InstanceHook = Arc<dyn Fn(&AnyArc) + Send + Sync>;

/// Member visibility, consulted by the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    NonPublic,
}

/// Resolved argument values, in declared parameter order.
#[derive(Clone, Default)]
pub struct Arguments {
    values: SmallVec<[AnyArc; 4]>,
}

impl Arguments {
    pub fn new(values: impl IntoIterator<Item = AnyArc>) -> Self {
        Self { values: values.into_iter().collect() }
    }

    /// Returns argument `index` as `Arc<T>`.
    ///
    /// ```rust
    /// use ferrous_kernel::{AnyArc, Arguments};
    /// use std::sync::Arc;
    ///
    /// let args = Arguments::new([Arc::new(5u32) as AnyArc, Arc::new("x".to_string()) as AnyArc]);
    /// assert_eq!(*args.get::<u32>(0).unwrap(), 5);
    /// assert!(args.get::<u32>(1).is_err());
    /// assert!(args.get::<u32>(2).is_err());
    /// ```
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self.values.get(index).cloned().ok_or_else(|| {
            DiError::InvalidOperation(format!(
                "argument index {} out of range ({} arguments)",
                index,
                self.values.len()
            ))
        })?;
        value
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Returns argument `index` as a trait object bound with `to::<I>(cast)`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        let outer = self.get::<Arc<T>>(index)?;
        Ok((*outer).clone())
    }

    pub fn raw(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A constructor or method parameter.
#[derive(Clone)]
pub struct ParameterInfo {
    name: String,
    service: Key,
    default: Option<AnyArc>,
}

impl ParameterInfo {
    /// A required parameter of service type `T`.
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self { name: name.into(), service: key_of_type::<T>(), default: None }
    }

    /// A parameter of type `T` that falls back to `default` when `T` cannot be resolved.
    pub fn optional<T: Send + Sync + 'static>(name: impl Into<String>, default: T) -> Self {
        Self {
            name: name.into(),
            service: key_of_type::<T>(),
            default: Some(Arc::new(default)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> Key {
        self.service
    }

    pub fn default_value(&self) -> Option<&AnyArc> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterInfo")
            .field("name", &self.name)
            .field("service", &self.service.display_name())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// A registered constructor.
#[derive(Clone)]
pub struct ConstructorInfo {
    parameters: Vec<ParameterInfo>,
    inject: bool,
    injector: ConstructorInjector,
}

impl ConstructorInfo {
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// True when the constructor was explicitly marked for injection.
    pub fn is_marked_inject(&self) -> bool {
        self.inject
    }

    pub fn injector(&self) -> &ConstructorInjector {
        &self.injector
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("parameters", &self.parameters)
            .field("inject", &self.inject)
            .finish()
    }
}

/// A registered writable property.
#[derive(Clone)]
pub struct PropertyInfo {
    name: String,
    service: Key,
    visibility: Visibility,
    inject: bool,
    injector: PropertyInjector,
}

impl PropertyInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared value type.
    pub fn service(&self) -> Key {
        self.service
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_marked_inject(&self) -> bool {
        self.inject
    }

    pub fn injector(&self) -> &PropertyInjector {
        &self.injector
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("service", &self.service.display_name())
            .field("visibility", &self.visibility)
            .field("inject", &self.inject)
            .finish()
    }
}

/// A registered method that can take injected arguments.
#[derive(Clone)]
pub struct MethodInfo {
    name: String,
    parameters: Vec<ParameterInfo>,
    visibility: Visibility,
    inject: bool,
    injector: MethodInjector,
}

impl MethodInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_marked_inject(&self) -> bool {
        self.inject
    }

    pub fn injector(&self) -> &MethodInjector {
        &self.injector
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .field("inject", &self.inject)
            .finish()
    }
}

/// Borrowed view over any injectable member, handed to heuristics.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Constructor(&'a ConstructorInfo),
    Property(&'a PropertyInfo),
    Method(&'a MethodInfo),
}

impl<'a> Member<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Member::Constructor(_) => ".ctor",
            Member::Property(p) => p.name(),
            Member::Method(m) => m.name(),
        }
    }

    pub fn is_marked_inject(&self) -> bool {
        match self {
            Member::Constructor(c) => c.is_marked_inject(),
            Member::Property(p) => p.is_marked_inject(),
            Member::Method(m) => m.is_marked_inject(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Member::Constructor(_) => Visibility::Public,
            Member::Property(p) => p.visibility(),
            Member::Method(m) => m.visibility(),
        }
    }
}

/// Lifecycle hooks recorded for types implementing the lifecycle traits.
#[derive(Clone, Default)]
pub(crate) struct LifecycleHooks {
    pub(crate) initialize: Option<InitializeHook>,
    pub(crate) start: Option<InstanceHook>,
    pub(crate) stop: Option<InstanceHook>,
    pub(crate) dispose: Option<InstanceHook>,
}

/// Everything the planner knows about one concrete type.
#[derive(Clone)]
pub struct TypeInfo {
    key: Key,
    constructors: Vec<ConstructorInfo>,
    properties: Vec<PropertyInfo>,
    methods: Vec<MethodInfo>,
    hooks: LifecycleHooks,
}

impl TypeInfo {
    /// Starts describing `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_kernel::{TypeInfo, ParameterInfo};
    /// use std::sync::Arc;
    ///
    /// struct Sword;
    /// struct Samurai { weapon: Arc<Sword>, name: String }
    ///
    /// let info = TypeInfo::builder::<Samurai>()
    ///     .constructor([ParameterInfo::of::<Sword>("weapon")], |args| {
    ///         Ok(Samurai { weapon: args.get::<Sword>(0)?, name: String::new() })
    ///     })
    ///     .injected_property::<String, _>("name", |s, v| s.name = (*v).clone())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(info.constructors().len(), 1);
    /// assert_eq!(info.property("name").unwrap().name(), "name");
    /// ```
    pub fn builder<T: Send + Sync + 'static>() -> TypeInfoBuilder<T> {
        TypeInfoBuilder {
            info: TypeInfo::opaque(key_of_type::<T>()),
            _marker: PhantomData,
        }
    }

    /// Metadata for a type nothing was registered for: no members, no hooks.
    pub fn opaque(key: Key) -> Self {
        Self {
            key,
            constructors: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            hooks: LifecycleHooks::default(),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// Looks a property up by exact (case-sensitive) name.
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub(crate) fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key.display_name())
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Fluent builder for [`TypeInfo`].
pub struct TypeInfoBuilder<T> {
    info: TypeInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeInfoBuilder<T> {
    /// Registers a constructor.
    pub fn constructor<F>(self, parameters: impl IntoIterator<Item = ParameterInfo>, factory: F) -> Self
    where
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_constructor(parameters, false, factory)
    }

    /// Registers a constructor explicitly marked for injection; it wins constructor selection.
    pub fn injected_constructor<F>(
        self,
        parameters: impl IntoIterator<Item = ParameterInfo>,
        factory: F,
    ) -> Self
    where
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_constructor(parameters, true, factory)
    }

    /// Registers a parameterless constructor backed by `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor([], |_| Ok(T::default()))
    }

    fn add_constructor<F>(
        mut self,
        parameters: impl IntoIterator<Item = ParameterInfo>,
        inject: bool,
        factory: F,
    ) -> Self
    where
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        let injector: ConstructorInjector =
            Arc::new(move |args| factory(args).map(|value| Box::new(value) as AnyBox));
        self.info.constructors.push(ConstructorInfo {
            parameters: parameters.into_iter().collect(),
            inject,
            injector,
        });
        self
    }

    /// Registers a public property the planner leaves alone unless a heuristic selects it.
    /// Property values passed at resolution time can still target it.
    pub fn property<V, F>(self, name: &str, setter: F) -> Self
    where
        V: Send + Sync + 'static,
        F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    {
        self.property_as(name, Visibility::Public, false, setter)
    }

    /// Registers a public property marked for injection.
    pub fn injected_property<V, F>(self, name: &str, setter: F) -> Self
    where
        V: Send + Sync + 'static,
        F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    {
        self.property_as(name, Visibility::Public, true, setter)
    }

    /// Registers a property with explicit visibility and injection marker.
    pub fn property_as<V, F>(mut self, name: &str, visibility: Visibility, inject: bool, setter: F) -> Self
    where
        V: Send + Sync + 'static,
        F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    {
        let injector: PropertyInjector = Arc::new(move |instance, value| {
            let target = instance
                .downcast_mut::<T>()
                .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
            let value = value
                .downcast::<V>()
                .map_err(|_| DiError::TypeMismatch(std::any::type_name::<V>()))?;
            setter(target, value);
            Ok(())
        });
        self.info.properties.push(PropertyInfo {
            name: name.to_string(),
            service: key_of_type::<V>(),
            visibility,
            inject,
            injector,
        });
        self
    }

    /// Registers a public method the planner leaves alone unless a heuristic selects it.
    pub fn method<F>(self, name: &str, parameters: impl IntoIterator<Item = ParameterInfo>, invoker: F) -> Self
    where
        F: Fn(&mut T, &Arguments) -> DiResult<()> + Send + Sync + 'static,
    {
        self.method_as(name, Visibility::Public, false, parameters, invoker)
    }

    /// Registers a public method marked for injection.
    pub fn injected_method<F>(
        self,
        name: &str,
        parameters: impl IntoIterator<Item = ParameterInfo>,
        invoker: F,
    ) -> Self
    where
        F: Fn(&mut T, &Arguments) -> DiResult<()> + Send + Sync + 'static,
    {
        self.method_as(name, Visibility::Public, true, parameters, invoker)
    }

    pub fn method_as<F>(
        mut self,
        name: &str,
        visibility: Visibility,
        inject: bool,
        parameters: impl IntoIterator<Item = ParameterInfo>,
        invoker: F,
    ) -> Self
    where
        F: Fn(&mut T, &Arguments) -> DiResult<()> + Send + Sync + 'static,
    {
        let injector: MethodInjector = Arc::new(move |instance, args| {
            let target = instance
                .downcast_mut::<T>()
                .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
            invoker(target, args)
        });
        self.info.methods.push(MethodInfo {
            name: name.to_string(),
            parameters: parameters.into_iter().collect(),
            visibility,
            inject,
            injector,
        });
        self
    }

    /// Runs [`Initializable::initialize`] during the initialization stage.
    pub fn initializable(mut self) -> Self
    where
        T: Initializable,
    {
        self.info.hooks.initialize = Some(Arc::new(|instance| {
            let target = instance
                .downcast_mut::<T>()
                .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
            target.initialize();
            Ok(())
        }));
        self
    }

    /// Starts instances on activation and stops them on deactivation.
    pub fn startable(mut self) -> Self
    where
        T: Startable,
    {
        self.info.hooks.start = Some(Arc::new(|instance| {
            if let Some(target) = instance.downcast_ref::<T>() {
                target.start();
            }
        }));
        self.info.hooks.stop = Some(Arc::new(|instance| {
            if let Some(target) = instance.downcast_ref::<T>() {
                target.stop();
            }
        }));
        self
    }

    /// Disposes instances on deactivation.
    pub fn disposable(mut self) -> Self
    where
        T: Dispose,
    {
        self.info.hooks.dispose = Some(Arc::new(|instance| {
            if let Some(target) = instance.downcast_ref::<T>() {
                target.dispose();
            }
        }));
        self
    }

    /// Validates member names and returns the finished metadata.
    pub fn build(self) -> DiResult<TypeInfo> {
        let info = self.info;
        for ctor in &info.constructors {
            for param in &ctor.parameters {
                ensure_not_empty(&param.name, "name")?;
            }
        }
        for (index, property) in info.properties.iter().enumerate() {
            ensure_not_empty(&property.name, "name")?;
            if info.properties[..index].iter().any(|p| p.name == property.name) {
                return Err(DiError::InvalidOperation(format!(
                    "property '{}' registered twice on {}",
                    property.name,
                    info.key.display_name()
                )));
            }
        }
        for method in &info.methods {
            ensure_not_empty(&method.name, "name")?;
            for param in &method.parameters {
                ensure_not_empty(&param.name, "name")?;
            }
        }
        Ok(info)
    }
}

/// Registry of type metadata, populated at configuration time and read-only afterwards.
#[derive(Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<Key, Arc<TypeInfo>, ahash::RandomState>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the metadata for `info.key()`.
    pub fn insert(&mut self, info: TypeInfo) {
        self.types.insert(info.key(), Arc::new(info));
    }

    pub fn get(&self, key: &Key) -> Option<Arc<TypeInfo>> {
        self.types.get(key).cloned()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.types.contains_key(key)
    }

    /// Metadata for `key`, or an opaque description when none was registered.
    pub fn get_or_opaque(&self, key: Key) -> Arc<TypeInfo> {
        self.get(&key).unwrap_or_else(|| Arc::new(TypeInfo::opaque(key)))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
