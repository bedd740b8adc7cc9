//! Candidate member selection.

use super::{ConstructorInfo, MethodInfo, PropertyInfo, TypeInfo, Visibility};

/// Supplies the members of a type that are candidates for injection.
///
/// The selector only filters on what is structurally injectable (visibility);
/// whether a candidate property or method is actually injected is decided by
/// the [`InjectionHeuristic`](super::InjectionHeuristic)s.
pub trait ReflectionSelector: Send + Sync {
    fn select_constructors<'a>(&self, info: &'a TypeInfo) -> Vec<&'a ConstructorInfo>;
    fn select_properties<'a>(&self, info: &'a TypeInfo) -> Vec<&'a PropertyInfo>;
    fn select_methods<'a>(&self, info: &'a TypeInfo) -> Vec<&'a MethodInfo>;
}

/// Returns every registered constructor and every public member, plus
/// non-public members when `inject_non_public` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardSelector {
    inject_non_public: bool,
}

impl StandardSelector {
    pub fn new(inject_non_public: bool) -> Self {
        Self { inject_non_public }
    }

    fn visible(&self, visibility: Visibility) -> bool {
        self.inject_non_public || visibility == Visibility::Public
    }
}

impl ReflectionSelector for StandardSelector {
    fn select_constructors<'a>(&self, info: &'a TypeInfo) -> Vec<&'a ConstructorInfo> {
        info.constructors().iter().collect()
    }

    fn select_properties<'a>(&self, info: &'a TypeInfo) -> Vec<&'a PropertyInfo> {
        info.properties()
            .iter()
            .filter(|p| self.visible(p.visibility()))
            .collect()
    }

    fn select_methods<'a>(&self, info: &'a TypeInfo) -> Vec<&'a MethodInfo> {
        info.methods()
            .iter()
            .filter(|m| self.visible(m.visibility()))
            .collect()
    }
}
