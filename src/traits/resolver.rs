//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::activation::Request;
use crate::error::{DiError, DiResult};
use crate::parameters::Parameter;
use crate::registration::AnyArc;

/// Object-safe resolution of one request.
///
/// The kernel implements this trait, and contexts carry it so targets can
/// resolve their dependencies. `Ok(None)` is only returned for optional
/// requests that found no binding.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, request: &Request) -> DiResult<Option<AnyArc>>;

    /// True when `request` would find a binding.
    fn can_resolve(&self, request: &Request) -> bool;
}

fn required(request: &Request, value: Option<AnyArc>) -> DiResult<AnyArc> {
    value.ok_or(DiError::NotFound(request.service().display_name()))
}

fn downcast<T: Send + Sync + 'static>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

fn downcast_trait<T: ?Sized + Send + Sync + 'static>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<Arc<T>>()
        .map(|outer| (*outer).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Implemented for every [`DependencyResolver`].
///
/// # Examples
///
/// ```
/// use ferrous_kernel::{Kernel, Resolver};
///
/// let kernel = Kernel::builder()
///     .bind::<String, _>(|b| b.to_constant("configuration".to_string()))
///     .build()
///     .unwrap();
///
/// let config = kernel.get::<String>().unwrap();
/// assert_eq!(&*config, "configuration");
/// assert!(kernel.try_get::<u64>().unwrap().is_none());
/// ```
pub trait Resolver: DependencyResolver {
    /// Resolves a concrete service type.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let request = Request::of::<T>();
        let value = required(&request, self.resolve(&request)?)?;
        downcast(value)
    }

    /// Resolves a service bound under `name`.
    fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let request = Request::of::<T>().named(name);
        let value = required(&request, self.resolve(&request)?)?;
        downcast(value)
    }

    /// Resolves a service with parameter overrides for this activation.
    fn get_with<T: Send + Sync + 'static>(
        &self,
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> DiResult<Arc<T>> {
        let request = Request::of::<T>().with_parameters(parameters);
        let value = required(&request, self.resolve(&request)?)?;
        downcast(value)
    }

    /// Resolves a service if any binding exists for it.
    fn try_get<T: Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let request = Request::of::<T>().optional(true);
        self.resolve(&request)?.map(downcast).transpose()
    }

    /// Resolves a trait object service bound with `to::<I>(cast)`.
    ///
    /// ```
    /// use ferrous_kernel::{Kernel, Resolver, TypeInfo};
    /// use std::sync::Arc;
    ///
    /// trait Weapon: Send + Sync {
    ///     fn hit(&self) -> &'static str;
    /// }
    ///
    /// #[derive(Default)]
    /// struct Sword;
    /// impl Weapon for Sword {
    ///     fn hit(&self) -> &'static str { "slash" }
    /// }
    ///
    /// let kernel = Kernel::builder()
    ///     .register(TypeInfo::builder::<Sword>().default_constructor())
    ///     .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(kernel.get_trait::<dyn Weapon>().unwrap().hit(), "slash");
    /// ```
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let request = Request::of::<T>();
        let value = required(&request, self.resolve(&request)?)?;
        downcast_trait(value)
    }

    /// Resolves a trait object service bound under `name`.
    fn get_trait_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let request = Request::of::<T>().named(name);
        let value = required(&request, self.resolve(&request)?)?;
        downcast_trait(value)
    }

    /// Resolves a concrete service type, panicking on failure.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: DependencyResolver + ?Sized> Resolver for R {}
