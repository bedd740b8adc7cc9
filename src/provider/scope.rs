//! Scope objects and the scoped instance cache.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::activation::Context;
use crate::registration::{AnyArc, BindingId};

/// Non-owning identity of a scope object.
///
/// A handle observes the object it was taken from without keeping it alive.
/// Instances activated into a scope live until the scope is released or the
/// scope object is dropped and the kernel is pruned.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::ScopeHandle;
/// use std::sync::Arc;
///
/// let request = Arc::new("request-1".to_string());
/// let handle = ScopeHandle::from_arc(&request);
/// assert!(handle.is_alive());
/// assert_eq!(handle, ScopeHandle::from_arc(&request));
///
/// drop(request);
/// assert!(!handle.is_alive());
/// ```
#[derive(Clone)]
pub struct ScopeHandle {
    id: usize,
    target: Weak<dyn Any + Send + Sync>,
}

impl ScopeHandle {
    pub fn from_arc<T: Any + Send + Sync>(scope: &Arc<T>) -> Self {
        let erased: AnyArc = scope.clone();
        Self {
            id: Arc::as_ptr(scope) as *const () as usize,
            target: Arc::downgrade(&erased),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// False once the scope object has been dropped.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl PartialEq for ScopeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScopeHandle {}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("id", &format_args!("{:#x}", self.id))
            .field("alive", &self.is_alive())
            .finish()
    }
}

struct ScopeToken;

/// A user-owned scope.
///
/// Bind with `in_activation_scope(&scope)` to share one instance per scope
/// object; release it through [`Kernel::release_scope`](crate::Kernel::release_scope)
/// to deactivate everything activated into it.
///
/// ```rust
/// use ferrous_kernel::{ActivationScope, Kernel, Resolver};
/// use std::sync::Arc;
///
/// struct Session;
/// let scope = ActivationScope::new();
///
/// let kernel = Kernel::builder()
///     .bind::<Session, _>(|b| b.to_method(|_| Ok(Session)).in_activation_scope(&scope))
///     .build()
///     .unwrap();
///
/// let a = kernel.get::<Session>().unwrap();
/// let b = kernel.get::<Session>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// kernel.release_scope(&scope).unwrap();
/// assert!(!Arc::ptr_eq(&a, &kernel.get::<Session>().unwrap()));
/// ```
#[derive(Clone)]
pub struct ActivationScope {
    token: Arc<ScopeToken>,
}

impl ActivationScope {
    pub fn new() -> Self {
        Self { token: Arc::new(ScopeToken) }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle::from_arc(&self.token)
    }
}

impl Default for ActivationScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActivationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActivationScope").field(&self.handle().id()).finish()
    }
}

thread_local! {
    static THREAD_SCOPE: Arc<ScopeToken> = Arc::new(ScopeToken);
}

/// Handle for the calling thread's scope; dies when the thread exits.
pub(crate) fn current_thread_scope() -> ScopeHandle {
    THREAD_SCOPE.with(ScopeHandle::from_arc)
}

/// An instance remembered for one binding in one scope.
pub(crate) struct CacheEntry {
    pub(crate) context: Context,
    pub(crate) instance: AnyArc,
    pub(crate) scope: ScopeHandle,
    sequence: u64,
}

pub(crate) enum Remembered {
    /// Stored; a stale entry left by a dropped scope at the same address is handed back.
    Stored { stale: Option<CacheEntry> },
    /// Another activation stored an instance first.
    Existing(AnyArc),
}

/// Scoped instances keyed by `(binding, scope)`.
///
/// Removal methods hand the removed entries back, most recent first, so the
/// caller can deactivate them outside the lock.
#[derive(Default)]
pub(crate) struct ScopeCache {
    entries: Mutex<HashMap<(BindingId, usize), CacheEntry, ahash::RandomState>>,
    sequence: AtomicU64,
}

fn identity(instance: &AnyArc) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

fn newest_first(mut entries: Vec<CacheEntry>) -> Vec<CacheEntry> {
    entries.sort_by(|a, b| b.sequence.cmp(&a.sequence));
    entries
}

impl ScopeCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn try_get(&self, binding: BindingId, scope: &ScopeHandle) -> Option<AnyArc> {
        let entries = self.entries.lock();
        entries
            .get(&(binding, scope.id()))
            .filter(|entry| entry.scope.is_alive())
            .map(|entry| entry.instance.clone())
    }

    pub(crate) fn remember(&self, context: &Context, scope: &ScopeHandle, instance: AnyArc) -> Remembered {
        let key = (context.binding().id(), scope.id());
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            if existing.scope.is_alive() {
                return Remembered::Existing(existing.instance.clone());
            }
        }
        let entry = CacheEntry {
            context: context.clone(),
            instance,
            scope: scope.clone(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        Remembered::Stored { stale: entries.insert(key, entry) }
    }

    /// Removes the entries holding the allocation at `address`.
    pub(crate) fn release(&self, address: usize) -> Vec<CacheEntry> {
        self.remove_where(|entry| identity(&entry.instance) == address)
    }

    pub(crate) fn clear(&self, scope: &ScopeHandle) -> Vec<CacheEntry> {
        self.remove_where(|entry| entry.scope == *scope)
    }

    /// Removes entries whose scope object was dropped.
    pub(crate) fn prune(&self) -> Vec<CacheEntry> {
        self.remove_where(|entry| !entry.scope.is_alive())
    }

    pub(crate) fn clear_all(&self) -> Vec<CacheEntry> {
        let drained: Vec<_> = self.entries.lock().drain().map(|(_, entry)| entry).collect();
        newest_first(drained)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn remove_where(&self, predicate: impl Fn(&CacheEntry) -> bool) -> Vec<CacheEntry> {
        let mut entries = self.entries.lock();
        let keys: Vec<_> = entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(key, _)| *key)
            .collect();
        let removed = keys.iter().filter_map(|key| entries.remove(key)).collect();
        newest_first(removed)
    }
}
