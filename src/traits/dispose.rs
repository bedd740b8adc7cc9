//! Lifecycle traits.
//!
//! A type opts into a hook by implementing the trait and registering it on
//! its [`TypeInfo`](crate::TypeInfo) with `.initializable()`, `.startable()`
//! or `.disposable()`.

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (e.g., flushing caches,
/// closing connections). `dispose` runs when the instance's scope releases it.
///
/// # Examples
///
/// ```
/// use ferrous_kernel::{Dispose, Kernel, Resolver, TypeInfo};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let kernel = Kernel::builder()
///     .register(TypeInfo::builder::<Cache>().default_constructor().disposable())
///     .bind::<Cache, _>(|b| b.to_self().in_singleton_scope())
///     .build()
///     .unwrap();
///
/// let cache = kernel.get::<Cache>().unwrap();
/// kernel.dispose();
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for services finishing their own setup once every dependency is injected.
///
/// Runs during initialization, after property and method injection, while
/// the instance is still exclusively owned.
pub trait Initializable: Send + Sync + 'static {
    fn initialize(&mut self);
}

/// Trait for services started on activation and stopped on deactivation.
pub trait Startable: Send + Sync + 'static {
    fn start(&self);
    fn stop(&self);
}
