/// Concurrent access integration tests
///
/// These tests verify that the kernel behaves correctly under concurrent access:
/// singleton consistency, plan sharing, thread scope isolation and idempotent
/// activation bookkeeping.

use ferrous_kernel::{key_of_type, ActivationCache, AnyArc, Kernel, ParameterInfo, Resolver, Startable, TypeInfo};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;

#[derive(Debug)]
pub struct CounterService {
    count: AtomicU32,
}

impl CounterService {
    pub fn new() -> Self {
        // Widen the window in which threads race to create the singleton
        thread::sleep(Duration::from_millis(5));
        Self { count: AtomicU32::new(0) }
    }

    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct Heartbeat {
    starts: AtomicUsize,
}

impl Startable for Heartbeat {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {}
}

pub struct Worker {
    counter: Arc<CounterService>,
}

fn kernel() -> Kernel {
    Kernel::builder()
        .register(TypeInfo::builder::<CounterService>().constructor([], |_| Ok(CounterService::new())))
        .register(
            TypeInfo::builder::<Worker>()
                .constructor([ParameterInfo::of::<CounterService>("counter")], |args| {
                    Ok(Worker { counter: args.get::<CounterService>(0)? })
                }),
        )
        .register(TypeInfo::builder::<Heartbeat>().default_constructor().startable())
        .bind::<CounterService, _>(|b| b.to_self().in_singleton_scope())
        .bind::<Heartbeat, _>(|b| b.to_self().in_singleton_scope())
        .build()
        .unwrap()
}

#[test]
fn test_concurrent_singleton_resolution() {
    let kernel = kernel();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let kernel = kernel.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let service = kernel.get::<CounterService>().unwrap();
                service.increment();
                service
            })
        })
        .collect();

    let services: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for service in &services[1..] {
        assert!(Arc::ptr_eq(&services[0], service));
    }
    assert_eq!(services[0].get_count(), THREADS as u32);
    assert_eq!(kernel.scoped_instance_count(), 1);
}

#[test]
fn test_concurrent_transients_share_their_singleton_dependency() {
    let kernel = kernel();

    let workers: Vec<Arc<Worker>> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|_| kernel.get::<Worker>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let distinct: HashSet<usize> = workers.iter().map(|w| Arc::as_ptr(w) as usize).collect();
    assert_eq!(distinct.len(), THREADS);
    for worker in &workers[1..] {
        assert!(Arc::ptr_eq(&workers[0].counter, &worker.counter));
    }
}

#[test]
fn test_concurrent_planning_shares_one_plan() {
    let kernel = kernel();
    let planner = kernel.planner();

    let plans = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|_| planner.get_plan(key_of_type::<Worker>()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    })
    .unwrap();

    for plan in &plans[1..] {
        assert!(Arc::ptr_eq(&plans[0], plan));
    }
    assert_eq!(planner.plan_count(), 1);
    assert_eq!(plans[0].constructors().len(), 1);
}

#[test]
fn test_concurrent_singleton_starts_once() {
    let kernel = kernel();
    let barrier = Barrier::new(THREADS);

    let beats = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    kernel.get::<Heartbeat>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    })
    .unwrap();

    assert_eq!(beats[0].starts.load(Ordering::SeqCst), 1);
    assert_eq!(kernel.activation_cache().activated_count(), 1);
}

#[test]
fn test_thread_scope_isolation_under_load() {
    let created = Arc::new(AtomicUsize::new(0));
    let factory_count = created.clone();
    let kernel = Kernel::builder()
        .bind::<CounterService, _>(move |b| {
            b.to_method(move |_| {
                factory_count.fetch_add(1, Ordering::SeqCst);
                Ok(CounterService { count: AtomicU32::new(0) })
            })
            .in_thread_scope()
        })
        .build()
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let kernel = kernel.clone();
            thread::spawn(move || {
                let first = kernel.get::<CounterService>().unwrap();
                for _ in 0..10 {
                    let again = kernel.get::<CounterService>().unwrap();
                    assert!(Arc::ptr_eq(&first, &again));
                    again.increment();
                }
                first.get_count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 10);
    }
    assert_eq!(created.load(Ordering::SeqCst), THREADS);
    assert_eq!(kernel.prune().unwrap(), THREADS);
}

#[test]
fn test_concurrent_cache_inserts_are_idempotent() {
    let cache = ActivationCache::new();
    let instance: AnyArc = Arc::new(String::from("shared"));

    crossbeam_utils::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|_| {
                for _ in 0..100 {
                    cache.add_activated_instance(&instance);
                    cache.add_deactivated_instance(&instance);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(cache.activated_count(), 1);
    assert_eq!(cache.deactivated_count(), 1);
    assert!(cache.is_deactivated(&instance));
}
