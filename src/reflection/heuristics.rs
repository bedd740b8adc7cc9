//! Injection heuristics deciding which members the planner injects.

use super::Member;

/// Votes on whether a member should be injected.
///
/// The property and method planning strategies OR-combine every registered
/// heuristic; the first `true` wins.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{InjectionHeuristic, Member};
///
/// /// Injects every property whose name ends in `_service`.
/// struct ServiceSuffix;
///
/// impl InjectionHeuristic for ServiceSuffix {
///     fn should_inject(&self, member: Member<'_>) -> bool {
///         matches!(member, Member::Property(p) if p.name().ends_with("_service"))
///     }
/// }
/// ```
pub trait InjectionHeuristic: Send + Sync {
    fn should_inject(&self, member: Member<'_>) -> bool;
}

/// Selects members explicitly marked for injection at registration time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardInjectionHeuristic;

impl InjectionHeuristic for StandardInjectionHeuristic {
    fn should_inject(&self, member: Member<'_>) -> bool {
        member.is_marked_inject()
    }
}

impl<F> InjectionHeuristic for F
where
    F: Fn(Member<'_>) -> bool + Send + Sync,
{
    fn should_inject(&self, member: Member<'_>) -> bool {
        self(member)
    }
}

/// Returns true if any heuristic selects `member`.
pub(crate) fn any_selects(heuristics: &[std::sync::Arc<dyn InjectionHeuristic>], member: Member<'_>) -> bool {
    heuristics.iter().any(|h| h.should_inject(member))
}
