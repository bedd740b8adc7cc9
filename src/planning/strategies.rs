//! Planning strategies.
//!
//! Each strategy inspects the planned type through a [`ReflectionSelector`]
//! and appends directives. Property and method strategies only add members
//! that at least one [`InjectionHeuristic`] selects.

use std::sync::Arc;

use tracing::trace;

use crate::error::DiResult;
use crate::reflection::heuristics::any_selects;
use crate::reflection::{InjectionHeuristic, Member, ReflectionSelector};

use super::directives::{
    ConstructorInjectionDirective, MethodInjectionDirective, PropertyInjectionDirective,
};
use super::plan::Plan;

/// A pluggable visitor that populates a plan while it is being built.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Directive, DirectiveVariant, DiResult, Plan, PlanningStrategy};
///
/// struct Tagged(&'static str);
/// impl DirectiveVariant for Tagged {}
///
/// struct TagEverything;
///
/// impl PlanningStrategy for TagEverything {
///     fn execute(&self, plan: &mut Plan) -> DiResult<()> {
///         plan.add(Directive::custom(Tagged(plan.key().short_name())));
///         Ok(())
///     }
/// }
/// ```
pub trait PlanningStrategy: Send + Sync {
    fn execute(&self, plan: &mut Plan) -> DiResult<()>;
}

/// Adds a directive for every candidate constructor.
pub struct ConstructorReflectionStrategy {
    selector: Arc<dyn ReflectionSelector>,
}

impl ConstructorReflectionStrategy {
    pub fn new(selector: Arc<dyn ReflectionSelector>) -> Self {
        Self { selector }
    }
}

impl PlanningStrategy for ConstructorReflectionStrategy {
    fn execute(&self, plan: &mut Plan) -> DiResult<()> {
        let info = plan.type_info().clone();
        for constructor in self.selector.select_constructors(&info) {
            plan.add(ConstructorInjectionDirective::new(constructor).into());
        }
        Ok(())
    }
}

/// Adds a directive for every candidate property a heuristic selects.
pub struct PropertyReflectionStrategy {
    selector: Arc<dyn ReflectionSelector>,
    heuristics: Vec<Arc<dyn InjectionHeuristic>>,
}

impl PropertyReflectionStrategy {
    pub fn new(selector: Arc<dyn ReflectionSelector>, heuristics: Vec<Arc<dyn InjectionHeuristic>>) -> Self {
        Self { selector, heuristics }
    }
}

impl PlanningStrategy for PropertyReflectionStrategy {
    fn execute(&self, plan: &mut Plan) -> DiResult<()> {
        let info = plan.type_info().clone();
        for property in self.selector.select_properties(&info) {
            if any_selects(&self.heuristics, Member::Property(property)) {
                trace!(property = property.name(), "planning property injection");
                plan.add(PropertyInjectionDirective::new(property).into());
            }
        }
        Ok(())
    }
}

/// Adds a directive for every candidate method a heuristic selects.
pub struct MethodReflectionStrategy {
    selector: Arc<dyn ReflectionSelector>,
    heuristics: Vec<Arc<dyn InjectionHeuristic>>,
}

impl MethodReflectionStrategy {
    pub fn new(selector: Arc<dyn ReflectionSelector>, heuristics: Vec<Arc<dyn InjectionHeuristic>>) -> Self {
        Self { selector, heuristics }
    }
}

impl PlanningStrategy for MethodReflectionStrategy {
    fn execute(&self, plan: &mut Plan) -> DiResult<()> {
        let info = plan.type_info().clone();
        for method in self.selector.select_methods(&info) {
            if any_selects(&self.heuristics, Member::Method(method)) {
                trace!(method = method.name(), "planning method injection");
                plan.add(MethodInjectionDirective::new(method).into());
            }
        }
        Ok(())
    }
}
