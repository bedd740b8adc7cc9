use ferrous_kernel::{
    ConstructorArgument, DiError, Kernel, KernelSettings, ParameterInfo, Request, Resolver, TypeInfo,
    TypeMatchingConstructorArgument, DependencyResolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Weapon: Send + Sync {
    fn hit(&self, target: &str) -> String;
}

#[derive(Default)]
struct Sword;

impl Weapon for Sword {
    fn hit(&self, target: &str) -> String {
        format!("Chopped {} clean in half", target)
    }
}

#[derive(Default)]
struct Shuriken;

impl Weapon for Shuriken {
    fn hit(&self, target: &str) -> String {
        format!("Pierced {}'s armor", target)
    }
}

struct Samurai {
    weapon: Arc<dyn Weapon>,
}

fn samurai_info() -> ferrous_kernel::TypeInfoBuilder<Samurai> {
    TypeInfo::builder::<Samurai>().constructor([ParameterInfo::of::<dyn Weapon>("weapon")], |args| {
        Ok(Samurai { weapon: args.get_trait::<dyn Weapon>(0)? })
    })
}

#[test]
fn test_constructor_injection_through_trait_binding() {
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(samurai_info())
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>))
        .build()
        .unwrap();

    let samurai = kernel.get::<Samurai>().unwrap();
    assert_eq!(samurai.weapon.hit("the evildoers"), "Chopped the evildoers clean in half");
}

#[test]
fn test_transient_creates_new_instances() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();

    let kernel = Kernel::builder()
        .bind::<String, _>(move |b| {
            b.to_method(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("instance-{}", n))
            })
        })
        .build()
        .unwrap();

    let first = kernel.get::<String>().unwrap();
    let second = kernel.get::<String>().unwrap();
    assert_eq!(*first, "instance-1");
    assert_eq!(*second, "instance-2");
    assert_eq!(created.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_is_shared_and_created_once() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();

    let kernel = Kernel::builder()
        .bind::<Sword, _>(move |b| {
            b.to_method(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Sword)
            })
            .in_singleton_scope()
        })
        .build()
        .unwrap();

    let a = kernel.get::<Sword>().unwrap();
    let b = kernel.get::<Sword>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(kernel.scoped_instance_count(), 1);
}

#[test]
fn test_singleton_trait_binding_shares_the_implementation() {
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>).in_singleton_scope())
        .build()
        .unwrap();

    let a = kernel.get_trait::<dyn Weapon>().unwrap();
    let b = kernel.get_trait::<dyn Weapon>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_named_bindings() {
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(TypeInfo::builder::<Shuriken>().default_constructor())
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>).named("melee"))
        .bind::<dyn Weapon, _>(|b| b.to::<Shuriken>(|s| s as Arc<dyn Weapon>).named("ranged"))
        .build()
        .unwrap();

    let ranged = kernel.get_trait_named::<dyn Weapon>("ranged").unwrap();
    assert_eq!(ranged.hit("the ninja"), "Pierced the ninja's armor");

    let err = kernel.get_trait_named::<dyn Weapon>("siege").err().unwrap();
    assert!(matches!(err, DiError::NotFound(_)));
}

#[test]
fn test_multiple_matching_bindings_are_an_activation_error() {
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(TypeInfo::builder::<Shuriken>().default_constructor())
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>))
        .bind::<dyn Weapon, _>(|b| b.to::<Shuriken>(|s| s as Arc<dyn Weapon>))
        .build()
        .unwrap();

    let err = kernel.get_trait::<dyn Weapon>().err().unwrap();
    assert!(matches!(err, DiError::Activation(ref m) if m.contains("2 bindings")));
}

#[test]
fn test_conditional_binding_wins_over_unconditional() {
    struct Ninja {
        weapon: Arc<dyn Weapon>,
    }

    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(TypeInfo::builder::<Shuriken>().default_constructor())
        .register(samurai_info())
        .register(
            TypeInfo::builder::<Ninja>().constructor([ParameterInfo::of::<dyn Weapon>("weapon")], |args| {
                Ok(Ninja { weapon: args.get_trait::<dyn Weapon>(0)? })
            }),
        )
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>))
        .bind::<dyn Weapon, _>(|b| {
            b.to::<Shuriken>(|s| s as Arc<dyn Weapon>).when_injected_into::<Ninja>()
        })
        .build()
        .unwrap();

    assert_eq!(kernel.get::<Ninja>().unwrap().weapon.hit("x"), "Pierced x's armor");
    assert_eq!(kernel.get::<Samurai>().unwrap().weapon.hit("x"), "Chopped x clean in half");
}

#[test]
fn test_unregistered_service_is_not_found() {
    let kernel = Kernel::builder().build().unwrap();
    let err = kernel.get::<Sword>().err().unwrap();
    assert!(matches!(err, DiError::NotFound(name) if name.ends_with("Sword")));
    assert!(kernel.try_get::<Sword>().unwrap().is_none());
}

#[test]
fn test_implicit_self_binding_for_registered_types() {
    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .build()
        .unwrap();
    assert!(kernel.can_resolve(&Request::of::<Sword>()));
    assert!(kernel.get::<Sword>().is_ok());

    let strict = Kernel::builder()
        .settings(KernelSettings::default().with_implicit_self_binding(false))
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .build()
        .unwrap();
    assert!(!strict.can_resolve(&Request::of::<Sword>()));
    assert!(matches!(strict.get::<Sword>(), Err(DiError::NotFound(_))));
}

#[test]
fn test_missing_dependency_reports_the_activation_path() {
    let kernel = Kernel::builder().register(samurai_info()).build().unwrap();

    let err = kernel.get::<Samurai>().err().unwrap();
    let message = err.to_string();
    assert!(message.contains("parameter weapon"), "{}", message);
    assert!(message.contains("1) Request for Samurai"), "{}", message);
}

#[test]
fn test_default_parameter_value_is_used_when_unresolvable() {
    struct Dojo {
        students: Arc<u32>,
    }

    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Dojo>().constructor([ParameterInfo::optional("students", 12u32)], |args| {
                Ok(Dojo { students: args.get::<u32>(0)? })
            }),
        )
        .build()
        .unwrap();

    assert_eq!(*kernel.get::<Dojo>().unwrap().students, 12);
}

#[test]
fn test_constructor_arguments_override_resolution() {
    struct Server {
        port: u16,
        host: Arc<String>,
    }

    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Server>().constructor(
            [ParameterInfo::of::<u16>("port"), ParameterInfo::of::<String>("host")],
            |args| Ok(Server { port: *args.get::<u16>(0)?, host: args.get::<String>(1)? }),
        ))
        .bind::<String, _>(|b| b.to_constant("localhost".to_string()))
        .bind::<Server, _>(|b| b.to_self().with_constructor_argument("port", 8080u16))
        .build()
        .unwrap();

    let server = kernel.get::<Server>().unwrap();
    assert_eq!(server.port, 8080);
    assert_eq!(*server.host, "localhost");

    let custom = kernel
        .get_with::<Server>([TypeMatchingConstructorArgument::new("example.org".to_string()).into()])
        .unwrap();
    assert_eq!(*custom.host, "example.org");
}

#[test]
fn test_two_constructor_arguments_for_one_parameter_fail() {
    struct Server {
        port: u16,
    }

    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Server>()
                .constructor([ParameterInfo::of::<u16>("port")], |args| Ok(Server { port: *args.get::<u16>(0)? })),
        )
        .build()
        .unwrap();

    let err = kernel
        .get_with::<Server>([
            ConstructorArgument::new("port", 1u16).unwrap().into(),
            ConstructorArgument::new("port", 2u16).unwrap().into(),
        ])
        .err()
        .unwrap();
    assert!(matches!(err, DiError::Activation(ref m) if m.contains("more than one constructor argument")));

    let server = kernel
        .get_with::<Server>([ConstructorArgument::new("port", 3u16).unwrap().into()])
        .unwrap();
    assert_eq!(server.port, 3);
}

#[test]
fn test_constructor_selection() {
    struct Samurai {
        weapon: Option<Arc<Sword>>,
    }

    let info = || {
        TypeInfo::builder::<Samurai>()
            .constructor([], |_| Ok(Samurai { weapon: None }))
            .constructor([ParameterInfo::of::<Sword>("weapon")], |args| {
                Ok(Samurai { weapon: Some(args.get::<Sword>(0)?) })
            })
    };

    // The constructor with the most resolvable parameters wins
    let kernel = Kernel::builder()
        .register(info())
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .build()
        .unwrap();
    assert!(kernel.get::<Samurai>().unwrap().weapon.is_some());

    // Unresolvable parameters rule a constructor out
    let kernel = Kernel::builder().register(info()).build().unwrap();
    assert!(kernel.get::<Samurai>().unwrap().weapon.is_none());

    // A constructor marked for injection always wins
    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Samurai>()
                .injected_constructor([], |_| Ok(Samurai { weapon: None }))
                .constructor([ParameterInfo::of::<Sword>("weapon")], |args| {
                    Ok(Samurai { weapon: Some(args.get::<Sword>(0)?) })
                }),
        )
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .build()
        .unwrap();
    assert!(kernel.get::<Samurai>().unwrap().weapon.is_none());
}

#[test]
fn test_equally_scored_constructors_are_ambiguous() {
    struct Pair(u8);

    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Pair>()
                .constructor([], |_| Ok(Pair(1)))
                .constructor([], |_| Ok(Pair(2))),
        )
        .build()
        .unwrap();

    let err = kernel.get::<Pair>().err().unwrap();
    assert!(matches!(err, DiError::Activation(ref m) if m.contains("2 constructors")));
}

#[test]
fn test_factory_resolves_through_the_context() {
    struct Armory {
        weapon: Arc<dyn Weapon>,
    }

    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .bind::<dyn Weapon, _>(|b| b.to::<Sword>(|s| s as Arc<dyn Weapon>))
        .bind::<Armory, _>(|b| {
            b.to_method(|ctx| Ok(Armory { weapon: ctx.resolver().get_trait::<dyn Weapon>()? }))
        })
        .build()
        .unwrap();

    assert_eq!(kernel.get::<Armory>().unwrap().weapon.hit("a"), "Chopped a clean in half");
}

#[test]
fn test_cyclic_dependencies_are_detected() {
    struct Chicken;
    struct Egg;

    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Chicken>()
                .constructor([ParameterInfo::of::<Egg>("egg")], |_| Ok(Chicken)),
        )
        .register(
            TypeInfo::builder::<Egg>()
                .constructor([ParameterInfo::of::<Chicken>("chicken")], |_| Ok(Egg)),
        )
        .build()
        .unwrap();

    let err = kernel.get::<Chicken>().err().unwrap();
    assert!(err.is_activation(), "{}", err);
}

#[test]
fn test_decorator_over_the_same_service_is_not_a_cycle() {
    struct Sharpened {
        inner: Arc<dyn Weapon>,
    }

    impl Weapon for Sharpened {
        fn hit(&self, target: &str) -> String {
            format!("Sharply {}", self.inner.hit(target))
        }
    }

    let kernel = Kernel::builder()
        .register(TypeInfo::builder::<Sword>().default_constructor())
        .register(
            TypeInfo::builder::<Sharpened>()
                .constructor([ParameterInfo::of::<dyn Weapon>("inner")], |args| {
                    Ok(Sharpened { inner: args.get_trait::<dyn Weapon>(0)? })
                }),
        )
        .bind::<dyn Weapon, _>(|b| b.to::<Sharpened>(|s| s as Arc<dyn Weapon>))
        .bind::<dyn Weapon, _>(|b| {
            b.to::<Sword>(|s| s as Arc<dyn Weapon>)
                .when(|request: &Request| request.target().map_or(false, |t| t.name() == "inner"))
        })
        .build()
        .unwrap();

    let weapon = kernel.get_trait::<dyn Weapon>().unwrap();
    assert_eq!(weapon.hit("the rope"), "Sharply Chopped the rope clean in half");
}

#[test]
fn test_decorating_through_the_same_binding_is_a_cycle() {
    struct Sharpened {
        inner: Arc<dyn Weapon>,
    }

    impl Weapon for Sharpened {
        fn hit(&self, target: &str) -> String {
            self.inner.hit(target)
        }
    }

    let kernel = Kernel::builder()
        .register(
            TypeInfo::builder::<Sharpened>()
                .constructor([ParameterInfo::of::<dyn Weapon>("inner")], |args| {
                    Ok(Sharpened { inner: args.get_trait::<dyn Weapon>(0)? })
                }),
        )
        .bind::<dyn Weapon, _>(|b| b.to::<Sharpened>(|s| s as Arc<dyn Weapon>))
        .build()
        .unwrap();

    let err = kernel.get_trait::<dyn Weapon>().err().unwrap();
    assert!(matches!(err, DiError::Activation(ref m) if m.contains("cyclical dependency")), "{}", err);
}

#[test]
fn test_depth_limit() {
    struct Leaf;
    struct Middle;
    struct Root;

    let kernel = Kernel::builder()
        .settings(KernelSettings::default().with_max_resolution_depth(1))
        .bind::<Leaf, _>(|b| b.to_method(|_| Ok(Leaf)))
        .register(TypeInfo::builder::<Middle>().constructor([ParameterInfo::of::<Leaf>("leaf")], |_| Ok(Middle)))
        .register(TypeInfo::builder::<Root>().constructor([ParameterInfo::of::<Middle>("middle")], |_| Ok(Root)))
        .build()
        .unwrap();

    assert!(kernel.get::<Middle>().is_ok());
    // Root -> Middle -> Leaf nests two levels deep
    let err = kernel.get::<Root>().err().unwrap();
    assert!(matches!(err, DiError::DepthExceeded(1)), "{}", err);
}

#[test]
fn test_disposed_kernel_rejects_resolution() {
    let kernel = Kernel::builder()
        .bind::<u8, _>(|b| b.to_constant(1))
        .build()
        .unwrap();
    kernel.dispose();
    assert!(kernel.is_disposed());
    assert!(matches!(kernel.get::<u8>(), Err(DiError::InvalidOperation(_))));
}
