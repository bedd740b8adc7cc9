//! Error message wording.
//!
//! Strategies decide when to fail; the text they fail with lives here.

use crate::activation::{Context, Request};
use crate::planning::{Target, TargetKind};

fn target_place(target: &Target) -> &'static str {
    match target.kind() {
        TargetKind::Parameter { .. } => "parameter",
        TargetKind::Property => "property",
    }
}

pub(crate) fn could_not_resolve_target(context: &Context, target: &Target) -> String {
    format!(
        "Error activating {}: no matching bindings are available for {} {} of type {}, and it has no default value.\nActivation path:\n{}",
        target.service().short_name(),
        target_place(target),
        target.name(),
        context.plan().key().short_name(),
        context.request().activation_path()
    )
}

pub(crate) fn more_than_one_property_value(context: &Context, target: &Target) -> String {
    format!(
        "Error activating {}: more than one property value for target {} was supplied.\nActivation path:\n{}",
        context.plan().key().short_name(),
        target.name(),
        context.request().activation_path()
    )
}

pub(crate) fn could_not_resolve_property_for_value_injection(request: &Request, property: &str) -> String {
    format!(
        "Error activating {}: could not resolve property {} for value injection; no injectable property with that name exists.\nActivation path:\n{}",
        request.service().short_name(),
        property,
        request.activation_path()
    )
}

pub(crate) fn more_than_one_constructor_argument(context: &Context, target: &Target) -> String {
    format!(
        "Error activating {}: more than one constructor argument applies to parameter {}.\nActivation path:\n{}",
        context.plan().key().short_name(),
        target.name(),
        context.request().activation_path()
    )
}

pub(crate) fn no_constructors_available(context: &Context) -> String {
    format!(
        "Error activating {}: no constructors are registered for it.\nActivation path:\n{}",
        context.plan().key().short_name(),
        context.request().activation_path()
    )
}

pub(crate) fn constructors_ambiguous(context: &Context, count: usize) -> String {
    format!(
        "Error activating {}: {} constructors have the same score; mark one for injection.\nActivation path:\n{}",
        context.plan().key().short_name(),
        count,
        context.request().activation_path()
    )
}

pub(crate) fn multiple_bindings(request: &Request, count: usize) -> String {
    format!(
        "Error activating {}: {} bindings match the request.\nActivation path:\n{}",
        request.service().short_name(),
        count,
        request.activation_path()
    )
}

pub(crate) fn kernel_disposed(request: &Request) -> String {
    format!(
        "cannot resolve {}: the kernel has been disposed",
        request.service().short_name()
    )
}

pub(crate) fn initialization_not_supported(strategy: &str) -> String {
    format!("{} does not take part in initialization", strategy)
}

pub(crate) fn module_name_missing(module: &str) -> String {
    format!("module {} has no name; modules must be named to be loaded", module)
}

pub(crate) fn module_already_loaded(name: &str) -> String {
    format!("a module named {} is already loaded", name)
}

pub(crate) fn module_not_loaded(name: &str) -> String {
    format!("no module named {} is loaded", name)
}

pub(crate) fn cyclic_dependency(request: &Request) -> String {
    format!(
        "Error activating {}: a cyclical dependency was detected.\nActivation path:\n{}",
        request.service().short_name(),
        request.activation_path()
    )
}

pub(crate) fn binding_without_target(service: &str) -> String {
    format!("the binding for {} does not say what to activate", service)
}
