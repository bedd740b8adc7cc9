//! Instance providers.
//!
//! A provider supplies the raw instance before the initialization pipeline
//! runs. [`StandardProvider`] constructs through the plan's constructor
//! directives; [`CallbackProvider`] and [`ConstantProvider`] wrap a closure
//! and a value.

use std::sync::Arc;

use tracing::trace;

use crate::error::{DiError, DiResult};
use crate::formatter;
use crate::key::{key_of_type, Key};
use crate::planning::{ConstructorInjectionDirective, Target};
use crate::reflection::Arguments;
use crate::registration::{AnyArc, AnyBox};

use super::context::Context;

/// Creates instances for a binding.
pub trait Provider: Send + Sync {
    /// The concrete type this provider creates; its plan drives injection.
    fn implementation_type(&self) -> Key;

    fn create(&self, context: &Context) -> DiResult<AnyBox>;
}

/// Scores constructor candidates; the highest score is used.
pub trait ConstructorScorer: Send + Sync {
    /// `None` when the constructor cannot be satisfied in `context`.
    fn score(&self, context: &Context, directive: &ConstructorInjectionDirective) -> Option<i64>;
}

/// Prefers constructors marked for injection, then the constructor with the
/// most satisfiable parameters. A parameter counts when a constructor
/// argument applies to it, when it has a default value, or when its service
/// can be resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardConstructorScorer;

impl ConstructorScorer for StandardConstructorScorer {
    fn score(&self, context: &Context, directive: &ConstructorInjectionDirective) -> Option<i64> {
        if directive.has_inject_marker() {
            return Some(i64::MAX);
        }
        let mut score = 0i64;
        for target in directive.targets() {
            let overridden = context
                .parameters()
                .iter()
                .any(|p| p.is_constructor_argument() && p.applies_to_target(context, target));
            if overridden || target.can_resolve_within(context) {
                score += 1;
            } else {
                return None;
            }
        }
        Some(score)
    }
}

/// Constructs instances through the best-scoring constructor directive.
pub struct StandardProvider {
    implementation: Key,
    scorer: Arc<dyn ConstructorScorer>,
}

impl StandardProvider {
    pub fn new(implementation: Key, scorer: Arc<dyn ConstructorScorer>) -> Self {
        Self { implementation, scorer }
    }

    pub fn of<T: 'static>(scorer: Arc<dyn ConstructorScorer>) -> Self {
        Self::new(key_of_type::<T>(), scorer)
    }

    fn select<'p>(&self, context: &'p Context) -> DiResult<&'p ConstructorInjectionDirective> {
        let candidates = context.plan().constructors();
        if candidates.is_empty() {
            return Err(DiError::Activation(formatter::no_constructors_available(context)));
        }

        let scored: Vec<_> = candidates
            .iter()
            .filter_map(|d| self.scorer.score(context, d).map(|score| (score, d)))
            .collect();

        let Some(best) = scored.iter().map(|(score, _)| *score).max() else {
            // Nothing is satisfiable; the first constructor produces the precise resolution error
            return Ok(&candidates[0]);
        };

        let mut winners = scored.iter().filter(|(score, _)| *score == best);
        let (_, chosen) = winners.next().copied().ok_or_else(|| {
            DiError::Activation(formatter::no_constructors_available(context))
        })?;
        let ties = winners.count();
        if ties > 0 {
            return Err(DiError::Activation(formatter::constructors_ambiguous(context, ties + 1)));
        }
        Ok(chosen)
    }

    fn argument_for(&self, context: &Context, target: &Target) -> DiResult<AnyArc> {
        let mut matches = context
            .parameters()
            .iter()
            .filter(|p| p.is_constructor_argument() && p.applies_to_target(context, target));

        let Some(argument) = matches.next() else {
            return target.resolve_within(context);
        };
        if matches.next().is_some() {
            return Err(DiError::Activation(formatter::more_than_one_constructor_argument(
                context, target,
            )));
        }
        match argument.get_value(context, target) {
            Some(value) => Ok(value),
            None => target.resolve_within(context),
        }
    }
}

impl Provider for StandardProvider {
    fn implementation_type(&self) -> Key {
        self.implementation
    }

    fn create(&self, context: &Context) -> DiResult<AnyBox> {
        let directive = self.select(context)?;
        let arguments = directive
            .targets()
            .iter()
            .map(|target| self.argument_for(context, target))
            .collect::<DiResult<Vec<_>>>()?;
        trace!(
            service = self.implementation.display_name(),
            arguments = arguments.len(),
            "invoking constructor"
        );
        directive.inject(&Arguments::new(arguments))
    }
}

/// Creates instances by calling a closure.
pub struct CallbackProvider<T> {
    callback: Arc<dyn Fn(&Context) -> DiResult<T> + Send + Sync>,
}

impl<T: Send + Sync + 'static> CallbackProvider<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Context) -> DiResult<T> + Send + Sync + 'static,
    {
        Self { callback: Arc::new(callback) }
    }
}

impl<T: Send + Sync + 'static> Provider for CallbackProvider<T> {
    fn implementation_type(&self) -> Key {
        key_of_type::<T>()
    }

    fn create(&self, context: &Context) -> DiResult<AnyBox> {
        (self.callback)(context).map(|value| Box::new(value) as AnyBox)
    }
}

/// Hands out clones of a fixed value.
pub struct ConstantProvider<T> {
    value: T,
}

impl<T: Clone + Send + Sync + 'static> ConstantProvider<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Send + Sync + 'static> Provider for ConstantProvider<T> {
    fn implementation_type(&self) -> Key {
        key_of_type::<T>()
    }

    fn create(&self, _context: &Context) -> DiResult<AnyBox> {
        Ok(Box::new(self.value.clone()))
    }
}
