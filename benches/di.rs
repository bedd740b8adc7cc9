use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_kernel::*;
use std::sync::{Arc, Mutex};

trait Weapon: Send + Sync {
    fn damage(&self) -> u32;
}

#[derive(Default)]
struct Sword;

impl Weapon for Sword {
    fn damage(&self) -> u32 {
        7
    }
}

struct Samurai {
    weapon: Arc<dyn Weapon>,
}

#[derive(Default)]
struct Armor {
    weight: u32,
}

fn samurai_kernel(settings: KernelSettings) -> Kernel {
    Kernel::builder()
        .settings(settings)
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(
            TypeInfo::builder::<Samurai>()
                .constructor([ParameterInfo::of::<dyn Weapon>("weapon")], |args| {
                    Ok(Samurai { weapon: args.get_trait::<dyn Weapon>(0)? })
                }),
        )
        .register(
            TypeInfo::builder::<Armor>()
                .default_constructor()
                .injected_property::<u32, _>("weight", |a, v| a.weight = *v),
        )
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>).in_singleton_scope())
        .bind::<u32, _>(|b| b.to_constant(12u32))
        .build()
        .unwrap()
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let kernel = Kernel::builder()
        .bind::<u64, _>(|b| b.to_constant(42u64))
        .build()
        .unwrap();

    // Prime the singleton
    let _ = kernel.get::<u64>().unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = kernel.get::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_plan_cache_hit(c: &mut Criterion) {
    let kernel = samurai_kernel(KernelSettings::default());
    let key = key_of_type::<Samurai>();
    let _ = kernel.planner().get_plan(key).unwrap();

    c.bench_function("plan_cache_hit", |b| {
        b.iter(|| {
            let plan = kernel.planner().get_plan(black_box(key)).unwrap();
            black_box(plan);
        })
    });
}

fn bench_transient_activation(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_activation");

    let kernel = samurai_kernel(KernelSettings::default());
    group.bench_function("constructor_injection", |b| {
        b.iter(|| {
            let samurai = kernel.get::<Samurai>().unwrap();
            black_box(samurai.weapon.damage());
        })
    });

    group.bench_function("property_injection", |b| {
        b.iter(|| {
            let armor = kernel.get::<Armor>().unwrap();
            black_box(armor.weight);
        })
    });

    let uncached = samurai_kernel(KernelSettings::default().with_activation_cache_disabled(true));
    group.bench_function("constructor_injection_no_cache", |b| {
        b.iter(|| {
            let samurai = uncached.get::<Samurai>().unwrap();
            black_box(samurai.weapon.damage());
        })
    });

    group.finish();
}

fn bench_parameter_overrides(c: &mut Criterion) {
    let kernel = samurai_kernel(KernelSettings::default());

    c.bench_function("property_value_override", |b| {
        b.iter(|| {
            let armor = kernel
                .get_with::<Armor>([PropertyValue::new("weight", 3u32).unwrap().into()])
                .unwrap();
            black_box(armor.weight);
        })
    });
}

fn bench_named_binding_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("named_binding_scaling");

    for count in [1usize, 8, 64] {
        let mut builder = Kernel::builder();
        for i in 0..count {
            builder.bind::<usize, _>(|b| b.to_constant(i).named(format!("n{}", i)));
        }
        let kernel = builder.build().unwrap();
        let last = format!("n{}", count - 1);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let v = kernel.get_named::<usize>(&last).unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_activation_scope_lifecycle(c: &mut Criterion) {
    let current = Arc::new(Mutex::new(ActivationScope::new()));
    let lookup = current.clone();
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Armor>().default_constructor())
        .bind::<Armor, _>(move |b| b.to_self().in_scope(move |_| Some(lookup.lock().unwrap().handle())))
        .build()
        .unwrap();

    c.bench_function("activation_scope_resolve_release", |b| {
        b.iter(|| {
            let scope = ActivationScope::new();
            *current.lock().unwrap() = scope.clone();
            let armor = kernel.get::<Armor>().unwrap();
            black_box(armor.weight);
            black_box(kernel.release_scope(&scope).unwrap());
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_plan_cache_hit,
    bench_transient_activation,
    bench_parameter_overrides,
    bench_named_binding_scaling,
    bench_activation_scope_lifecycle
);

criterion_main!(micro_benches);
