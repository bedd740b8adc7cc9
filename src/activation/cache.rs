//! Identity-keyed record of activated and deactivated instances.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::registration::AnyArc;

type IdentitySet = DashMap<usize, Weak<dyn Any + Send + Sync>, ahash::RandomState>;

/// Inserts between sweeps of dead entries.
const PRUNE_INTERVAL: usize = 1024;

/// Tracks which instances have been activated and deactivated.
///
/// Membership is by reference identity, never by value: two equal values in
/// distinct allocations are tracked independently. Entries only observe the
/// instance; once it is dropped the entry no longer counts as a member, so a
/// later allocation at the same address is never mistaken for it.
///
/// Insertion is idempotent and safe under concurrent use. Dead entries are
/// swept every `PRUNE_INTERVAL` insertions, so short-lived instances do not
/// accumulate.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{ActivationCache, AnyArc};
/// use std::sync::Arc;
///
/// let cache = ActivationCache::new();
/// let a: AnyArc = Arc::new(5u32);
/// let b: AnyArc = Arc::new(5u32);
///
/// cache.add_deactivated_instance(&a);
/// cache.add_deactivated_instance(&a);
///
/// assert!(cache.is_deactivated(&a));
/// assert!(!cache.is_deactivated(&b));
/// assert_eq!(cache.deactivated_count(), 1);
/// ```
pub struct ActivationCache {
    activated: IdentitySet,
    deactivated: IdentitySet,
    inserts: AtomicUsize,
}

fn identity(instance: &AnyArc) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

fn insert(set: &IdentitySet, instance: &AnyArc) {
    match set.entry(identity(instance)) {
        Entry::Occupied(mut entry) => {
            // Address reused after the previous instance was dropped
            if entry.get().strong_count() == 0 {
                entry.insert(Arc::downgrade(instance));
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(Arc::downgrade(instance));
        }
    }
}

fn contains(set: &IdentitySet, instance: &AnyArc) -> bool {
    set.get(&identity(instance))
        .map(|entry| entry.strong_count() > 0)
        .unwrap_or(false)
}

fn live_count(set: &IdentitySet) -> usize {
    set.iter().filter(|entry| entry.value().strong_count() > 0).count()
}

impl ActivationCache {
    pub fn new() -> Self {
        Self {
            activated: DashMap::with_hasher(ahash::RandomState::new()),
            deactivated: DashMap::with_hasher(ahash::RandomState::new()),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn add_activated_instance(&self, instance: &AnyArc) {
        insert(&self.activated, instance);
        self.inserted();
    }

    pub fn is_activated(&self, instance: &AnyArc) -> bool {
        contains(&self.activated, instance)
    }

    /// Marks `instance` deactivated. Repeated calls are no-ops.
    pub fn add_deactivated_instance(&self, instance: &AnyArc) {
        insert(&self.deactivated, instance);
        self.inserted();
    }

    pub fn is_deactivated(&self, instance: &AnyArc) -> bool {
        contains(&self.deactivated, instance)
    }

    /// Number of live activated instances.
    pub fn activated_count(&self) -> usize {
        live_count(&self.activated)
    }

    /// Number of live deactivated instances.
    pub fn deactivated_count(&self) -> usize {
        live_count(&self.deactivated)
    }

    /// Drops entries whose instance no longer exists.
    pub fn prune(&self) {
        self.activated.retain(|_, weak| weak.strong_count() > 0);
        self.deactivated.retain(|_, weak| weak.strong_count() > 0);
    }

    pub fn clear(&self) {
        self.activated.clear();
        self.deactivated.clear();
    }

    fn inserted(&self) {
        if self.inserts.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.prune();
        }
    }
}

impl Default for ActivationCache {
    fn default() -> Self {
        Self::new()
    }
}
