//! Binding lifetimes.

use std::fmt;
use std::sync::Arc;

use crate::activation::Context;
use crate::provider::ScopeHandle;

/// Callback returning the scope an activation belongs to, or `None` for transient.
pub type ScopeCallback = Arc<dyn Fn(&Context) -> Option<ScopeHandle> + Send + Sync>;

/// Binding lifetimes controlling whether an activation is reused
///
/// # Lifetime Characteristics
///
/// - **Transient**: every activation produces a new instance, never cached
/// - **Singleton**: one instance per kernel, released when the kernel is disposed
/// - **Custom**: one instance per scope object returned by the callback,
///   released when that scope is released or dropped and pruned
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Kernel, Resolver};
/// use std::sync::Arc;
///
/// struct Counter;
///
/// let kernel = Kernel::builder()
///     .bind::<Counter, _>(|b| b.to_method(|_| Ok(Counter)).in_singleton_scope())
///     .build()
///     .unwrap();
///
/// let a = kernel.get::<Counter>().unwrap();
/// let b = kernel.get::<Counter>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone, Default)]
pub enum Lifetime {
    /// New instance per activation
    #[default]
    Transient,
    /// Single instance per kernel
    Singleton,
    /// Single instance per scope object chosen by the callback
    Custom(ScopeCallback),
}

impl Lifetime {
    /// Builds a custom lifetime from a scope callback.
    pub fn custom<F>(callback: F) -> Self
    where
        F: Fn(&Context) -> Option<ScopeHandle> + Send + Sync + 'static,
    {
        Lifetime::Custom(Arc::new(callback))
    }

    /// The scope `context` activates into, given the kernel's root scope.
    pub fn scope_for(&self, context: &Context, root: &ScopeHandle) -> Option<ScopeHandle> {
        match self {
            Lifetime::Transient => None,
            Lifetime::Singleton => Some(root.clone()),
            Lifetime::Custom(callback) => callback(context),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Lifetime::Transient)
    }
}

impl fmt::Debug for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("Transient"),
            Lifetime::Singleton => f.write_str("Singleton"),
            Lifetime::Custom(_) => f.write_str("Custom"),
        }
    }
}
