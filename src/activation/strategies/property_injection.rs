use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use crate::activation::Context;
use crate::error::{DiError, DiResult};
use crate::formatter;
use crate::parameters::Parameter;
use crate::planning::{PropertyInjectionDirective, Target};
use crate::reflection::ReflectionSelector;
use crate::registration::AnyBox;

use super::InitializationStrategy;

/// Writes the plan's property directives, honoring property value overrides.
///
/// For each planned property the override list is scanned from the end; a
/// single match is consumed and its value used, two matches are an error,
/// and no match means standard resolution. Overrides left over once every
/// directive is processed name properties the planner did not select: they
/// are written directly to the property with exactly that name, and fail
/// when the type has no such property.
pub struct PropertyInjectionStrategy {
    selector: Arc<dyn ReflectionSelector>,
}

impl PropertyInjectionStrategy {
    pub fn new(selector: Arc<dyn ReflectionSelector>) -> Self {
        Self { selector }
    }

    fn take_override<'c>(
        context: &Context,
        target: &Target,
        overrides: &mut Vec<&'c Parameter>,
    ) -> DiResult<Option<&'c Parameter>> {
        let mut found = None;
        for index in (0..overrides.len()).rev() {
            if overrides[index].applies_to_target(context, target) {
                if found.is_some() {
                    return Err(DiError::Activation(formatter::more_than_one_property_value(
                        context, target,
                    )));
                }
                found = Some(index);
            }
        }
        Ok(found.map(|index| overrides.remove(index)))
    }

    fn inject_planned(
        context: &Context,
        instance: &mut (dyn Any + Send + Sync),
        directive: &PropertyInjectionDirective,
        overrides: &mut Vec<&Parameter>,
    ) -> DiResult<()> {
        let target = directive.target();
        let supplied = Self::take_override(context, target, overrides)?
            .and_then(|parameter| parameter.get_value(context, target));
        let value = match supplied {
            Some(value) => value,
            None => target.resolve_within(context)?,
        };
        trace!(property = directive.name(), "injecting property");
        directive.inject(instance, value)
    }

    fn inject_unplanned(
        &self,
        context: &Context,
        instance: &mut (dyn Any + Send + Sync),
        parameter: &Parameter,
    ) -> DiResult<()> {
        let info = context.plan().type_info();
        let property = self
            .selector
            .select_properties(info)
            .into_iter()
            .find(|p| p.name() == parameter.name())
            .ok_or_else(|| {
                DiError::Activation(formatter::could_not_resolve_property_for_value_injection(
                    context.request(),
                    parameter.name(),
                ))
            })?;

        let directive = PropertyInjectionDirective::new(property);
        match parameter.get_value(context, directive.target()) {
            Some(value) => {
                trace!(property = directive.name(), "injecting property value");
                directive.inject(instance, value)
            }
            None => Ok(()),
        }
    }
}

impl InitializationStrategy for PropertyInjectionStrategy {
    fn initialize(&self, context: &Context, mut instance: AnyBox) -> DiResult<AnyBox> {
        let mut overrides: Vec<&Parameter> = context
            .parameters()
            .iter()
            .filter(|p| p.is_property_value())
            .collect();

        for directive in context.plan().properties() {
            Self::inject_planned(context, instance.as_mut(), directive, &mut overrides)?;
        }
        for parameter in overrides {
            self.inject_unplanned(context, instance.as_mut(), parameter)?;
        }
        Ok(instance)
    }
}
