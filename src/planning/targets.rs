//! Injection points.

use std::fmt;

use crate::activation::Context;
use crate::error::{DiError, DiResult};
use crate::formatter;
use crate::key::Key;
use crate::reflection::{ParameterInfo, PropertyInfo};
use crate::registration::AnyArc;

/// Where a target sits on its declaring type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Constructor or method parameter at `position`
    Parameter { position: usize },
    /// Writable property
    Property,
}

/// A single injection point: a parameter or a property.
#[derive(Clone)]
pub struct Target {
    kind: TargetKind,
    name: String,
    service: Key,
    default: Option<AnyArc>,
}

impl Target {
    pub fn from_parameter(position: usize, parameter: &ParameterInfo) -> Self {
        Self {
            kind: TargetKind::Parameter { position },
            name: parameter.name().to_string(),
            service: parameter.service(),
            default: parameter.default_value().cloned(),
        }
    }

    pub fn from_property(property: &PropertyInfo) -> Self {
        Self {
            kind: TargetKind::Property,
            name: property.name().to_string(),
            service: property.service(),
            default: None,
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the injection point.
    pub fn service(&self) -> Key {
        self.service
    }

    pub fn has_default_value(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&AnyArc> {
        self.default.as_ref()
    }

    /// Resolves this injection point through the context's resolver.
    ///
    /// The dependency request inherits the context's inheritable parameters.
    /// When nothing can be resolved the default value is used; without one the
    /// failure surfaces as [`DiError::Activation`].
    pub fn resolve_within(&self, context: &Context) -> DiResult<AnyArc> {
        let request = context.request().create_child(self, context.inherited_parameters());
        let resolved = match context.resolver().resolve(&request) {
            Ok(value) => value,
            Err(DiError::NotFound(_)) => None,
            Err(other) => return Err(other),
        };
        resolved
            .or_else(|| self.default.clone())
            .ok_or_else(|| DiError::Activation(formatter::could_not_resolve_target(context, self)))
    }

    /// True when resolution would find a binding or a default exists.
    pub fn can_resolve_within(&self, context: &Context) -> bool {
        if self.default.is_some() {
            return true;
        }
        let request = context.request().create_child(self, context.inherited_parameters());
        context.resolver().can_resolve(&request)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("service", &self.service.display_name())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}
