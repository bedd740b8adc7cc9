//! Plan construction and caching.
//!
//! The [`Planner`] builds one [`Plan`] per implementation type the first time
//! it is requested, by running every registered [`PlanningStrategy`] over a
//! fresh plan. Finished plans are immutable and shared across threads.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::DiResult;
use crate::key::Key;
use crate::reflection::TypeRegistry;

pub mod directives;
pub mod plan;
pub mod strategies;
pub mod targets;

pub use directives::{
    ConstructorInjectionDirective, Directive, DirectiveVariant, MethodInjectionDirective,
    PropertyInjectionDirective,
};
pub use plan::Plan;
pub use strategies::{
    ConstructorReflectionStrategy, MethodReflectionStrategy, PlanningStrategy,
    PropertyReflectionStrategy,
};
pub use targets::{Target, TargetKind};

/// Builds and caches plans.
///
/// The cache is populated lazily and monotonically: entries are never
/// replaced. Two threads racing on the first request for a type may both
/// build a plan, but only the first insert is kept and both callers receive
/// that same `Arc<Plan>`.
pub struct Planner {
    types: Arc<TypeRegistry>,
    strategies: Vec<Arc<dyn PlanningStrategy>>,
    plans: DashMap<Key, Arc<Plan>, ahash::RandomState>,
}

impl Planner {
    pub fn new(types: Arc<TypeRegistry>, strategies: Vec<Arc<dyn PlanningStrategy>>) -> Self {
        Self {
            types,
            strategies,
            plans: DashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Returns the cached plan for `key`, building it on first use.
    pub fn get_plan(&self, key: Key) -> DiResult<Arc<Plan>> {
        if let Some(plan) = self.plans.get(&key) {
            return Ok(plan.clone());
        }

        // Build outside the map lock so strategies never run under a shard guard
        let plan = Arc::new(self.build(key)?);
        let cached = self.plans.entry(key).or_insert(plan).clone();
        Ok(cached)
    }

    fn build(&self, key: Key) -> DiResult<Plan> {
        let mut plan = Plan::new(self.types.get_or_opaque(key));
        for strategy in &self.strategies {
            strategy.execute(&mut plan)?;
        }
        debug!(
            service = key.display_name(),
            constructors = plan.constructors().len(),
            properties = plan.properties().len(),
            methods = plan.methods().len(),
            "built activation plan"
        );
        Ok(plan)
    }

    /// Number of cached plans.
    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    pub fn strategies(&self) -> &[Arc<dyn PlanningStrategy>] {
        &self.strategies
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use crate::reflection::{StandardInjectionHeuristic, StandardSelector, TypeInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Shuriken {
        sharp: bool,
    }

    struct CountingStrategy(Arc<AtomicUsize>);

    impl PlanningStrategy for CountingStrategy {
        fn execute(&self, _plan: &mut Plan) -> DiResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn registry() -> Arc<TypeRegistry> {
        let mut types = TypeRegistry::new();
        types.insert(
            TypeInfo::builder::<Shuriken>()
                .default_constructor()
                .injected_property::<bool, _>("sharp", |s, v| s.sharp = *v)
                .build()
                .unwrap(),
        );
        Arc::new(types)
    }

    #[test]
    fn plans_are_built_once_and_reused() {
        let runs = Arc::new(AtomicUsize::new(0));
        let planner = Planner::new(registry(), vec![Arc::new(CountingStrategy(runs.clone()))]);

        let first = planner.get_plan(key_of_type::<Shuriken>()).unwrap();
        let second = planner.get_plan(key_of_type::<Shuriken>()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(planner.plan_count(), 1);
    }

    #[test]
    fn strategies_populate_plan_in_order() {
        let selector: Arc<dyn crate::reflection::ReflectionSelector> = Arc::new(StandardSelector::default());
        let planner = Planner::new(
            registry(),
            vec![
                Arc::new(ConstructorReflectionStrategy::new(selector.clone())),
                Arc::new(PropertyReflectionStrategy::new(
                    selector,
                    vec![Arc::new(StandardInjectionHeuristic)],
                )),
            ],
        );

        let plan = planner.get_plan(key_of_type::<Shuriken>()).unwrap();
        assert_eq!(plan.constructors().len(), 1);
        assert_eq!(plan.properties()[0].name(), "sharp");
    }

    #[test]
    fn unregistered_types_get_an_empty_plan() {
        let planner = Planner::new(registry(), Vec::new());
        let plan = planner.get_plan(key_of_type::<u64>()).unwrap();
        assert_eq!(plan.directive_count(), 0);
        assert_eq!(plan.key(), key_of_type::<u64>());
    }
}
