use tracing::trace;

use crate::activation::Context;
use crate::error::DiResult;
use crate::reflection::Arguments;
use crate::registration::AnyBox;

use super::InitializationStrategy;

/// Invokes the plan's method directives in insertion order.
///
/// Every parameter is resolved through the context; overrides do not apply
/// to methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct MethodInjectionStrategy;

impl InitializationStrategy for MethodInjectionStrategy {
    fn initialize(&self, context: &Context, mut instance: AnyBox) -> DiResult<AnyBox> {
        for directive in context.plan().methods() {
            let arguments = directive
                .targets()
                .iter()
                .map(|target| target.resolve_within(context))
                .collect::<DiResult<Vec<_>>>()?;
            trace!(method = directive.name(), "injecting method");
            directive.inject(instance.as_mut(), &Arguments::new(arguments))?;
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::strategies::test_support::{context_for, CannedResolver};
    use crate::parameters::PropertyValue;
    use crate::planning::{MethodInjectionDirective, Plan};
    use crate::reflection::{ParameterInfo, TypeInfo};
    use std::sync::Arc;

    #[derive(Default)]
    struct Dojo {
        log: Vec<String>,
    }

    fn plan() -> Plan {
        let info = Arc::new(
            TypeInfo::builder::<Dojo>()
                .default_constructor()
                .method("open", [ParameterInfo::of::<String>("sign")], |d, args| {
                    d.log.push(format!("open {}", args.get::<String>(0)?));
                    Ok(())
                })
                .method("train", [ParameterInfo::of::<String>("style"), ParameterInfo::optional::<u32>("hours", 2)], |d, args| {
                    d.log.push(format!("train {} {}", args.get::<String>(0)?, args.get::<u32>(1)?));
                    Ok(())
                })
                .build()
                .unwrap(),
        );
        let mut plan = Plan::new(info.clone());
        for method in info.methods() {
            plan.add(MethodInjectionDirective::new(method).into());
        }
        plan
    }

    #[test]
    fn methods_run_in_order_with_resolved_arguments() {
        let context = context_for::<Dojo>(
            plan(),
            Vec::new(),
            Arc::new(CannedResolver::default().with("kata".to_string())),
        );
        let instance = MethodInjectionStrategy.initialize(&context, Box::new(Dojo::default())).unwrap();
        let dojo = instance.downcast_ref::<Dojo>().unwrap();
        assert_eq!(dojo.log, vec!["open kata", "train kata 2"]);
    }

    #[test]
    fn property_values_do_not_reach_methods() {
        let context = context_for::<Dojo>(
            plan(),
            vec![PropertyValue::new("sign", "ignored".to_string()).unwrap().into()],
            Arc::new(CannedResolver::default()),
        );
        let err = MethodInjectionStrategy
            .initialize(&context, Box::new(Dojo::default()))
            .unwrap_err();
        assert!(err.is_activation());
    }
}
