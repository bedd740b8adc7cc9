//! Diagnostic observers for activation traceability.
//!
//! Observers are called synchronously around every activation the kernel
//! performs and every deactivation it runs. Keep implementations
//! lightweight; they sit on the resolution hot path.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::activation::{Context, Request};
use crate::error::DiError;

/// Observer trait for activation events.
///
/// Every method has an empty default so observers only implement what they
/// need.
///
/// # Examples
///
/// ```
/// use ferrous_kernel::{ActivationObserver, Context, Kernel, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting(AtomicUsize);
///
/// impl ActivationObserver for Counting {
///     fn activated(&self, _context: &Context, _elapsed: Duration) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counting::default());
/// let kernel = Kernel::builder()
///     .observer(counter.clone())
///     .bind::<u32, _>(|b| b.to_constant(7))
///     .build()
///     .unwrap();
///
/// kernel.get::<u32>().unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait ActivationObserver: Send + Sync {
    /// Called before the instance is looked up in its scope or created.
    fn activating(&self, _context: &Context) {}

    /// Called once the instance is activated, or found in its scope.
    fn activated(&self, _context: &Context, _elapsed: Duration) {}

    /// Called after the deactivation strategies ran for an instance.
    fn deactivated(&self, _context: &Context) {}

    /// Called when an activation fails; the error still propagates.
    fn activation_failed(&self, _request: &Request, _error: &DiError) {}
}

/// Collection of registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ActivationObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ActivationObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn activating(&self, context: &Context) {
        for observer in &self.observers {
            observer.activating(context);
        }
    }

    pub(crate) fn activated(&self, context: &Context, elapsed: Duration) {
        for observer in &self.observers {
            observer.activated(context, elapsed);
        }
    }

    pub(crate) fn deactivated(&self, context: &Context) {
        for observer in &self.observers {
            observer.deactivated(context);
        }
    }

    pub(crate) fn activation_failed(&self, request: &Request, error: &DiError) {
        for observer in &self.observers {
            observer.activation_failed(request, error);
        }
    }
}

/// Forwards activation events to `tracing`.
///
/// Successful activations are logged at `debug`, failures at `warn`.
///
/// ```
/// use ferrous_kernel::{Kernel, TracingObserver};
/// use std::sync::Arc;
///
/// let kernel = Kernel::builder()
///     .observer(Arc::new(TracingObserver::new()))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl ActivationObserver for TracingObserver {
    fn activating(&self, context: &Context) {
        debug!(
            service = context.request().service().display_name(),
            depth = context.request().depth(),
            "activating"
        );
    }

    fn activated(&self, context: &Context, elapsed: Duration) {
        debug!(
            service = context.request().service().display_name(),
            elapsed_us = elapsed.as_micros() as u64,
            "activated"
        );
    }

    fn deactivated(&self, context: &Context) {
        debug!(service = context.binding().service().display_name(), "deactivated");
    }

    fn activation_failed(&self, request: &Request, error: &DiError) {
        warn!(service = request.service().display_name(), %error, "activation failed");
    }
}
