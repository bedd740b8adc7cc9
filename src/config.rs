//! Kernel settings.
//!
//! Settings are fixed when the kernel is built. They can be set in code,
//! read from environment variables, or (with the `config` feature) parsed
//! from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Default limit on nested dependency requests.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 1024;

/// Behavior switches for a kernel.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::KernelSettings;
///
/// let settings = KernelSettings::default()
///     .with_inject_non_public(true)
///     .with_max_resolution_depth(64);
///
/// assert!(settings.inject_non_public);
/// assert!(settings.property_injection);
/// assert_eq!(settings.max_resolution_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct KernelSettings {
    /// Let selectors return non-public properties and methods
    pub inject_non_public: bool,
    /// Skip the activation cache and its idempotence checks
    pub activation_cache_disabled: bool,
    /// Activate registered types that have no explicit binding
    pub allow_implicit_self_binding: bool,
    /// Plan and run property injection
    pub property_injection: bool,
    /// Plan and run method injection
    pub method_injection: bool,
    /// Requests nested deeper than this fail with `DepthExceeded`
    pub max_resolution_depth: usize,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            inject_non_public: false,
            activation_cache_disabled: false,
            allow_implicit_self_binding: true,
            property_injection: true,
            method_injection: true,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl KernelSettings {
    pub fn with_inject_non_public(mut self, enabled: bool) -> Self {
        self.inject_non_public = enabled;
        self
    }

    pub fn with_activation_cache_disabled(mut self, disabled: bool) -> Self {
        self.activation_cache_disabled = disabled;
        self
    }

    pub fn with_implicit_self_binding(mut self, enabled: bool) -> Self {
        self.allow_implicit_self_binding = enabled;
        self
    }

    pub fn with_property_injection(mut self, enabled: bool) -> Self {
        self.property_injection = enabled;
        self
    }

    pub fn with_method_injection(mut self, enabled: bool) -> Self {
        self.method_injection = enabled;
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// Reads `PREFIX_FIELD` environment variables over the defaults.
    ///
    /// Unset variables keep their default; values that do not parse fail with
    /// [`DiError::InvalidOperation`].
    pub fn from_env(prefix: &str) -> DiResult<Self> {
        Self::from_lookup(prefix, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> DiResult<Self> {
        let var = |field: &str| {
            let key = format!("{}_{}", prefix.to_uppercase(), field.to_uppercase());
            lookup(&key).map(|value| (key, value))
        };
        let mut settings = Self::default();

        if let Some((key, value)) = var("inject_non_public") {
            settings.inject_non_public = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("activation_cache_disabled") {
            settings.activation_cache_disabled = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("allow_implicit_self_binding") {
            settings.allow_implicit_self_binding = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("property_injection") {
            settings.property_injection = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("method_injection") {
            settings.method_injection = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("max_resolution_depth") {
            settings.max_resolution_depth = value.trim().parse::<usize>().map_err(|_| {
                DiError::InvalidOperation(format!("{} is not a valid depth: {}", key, value))
            })?;
        }
        Ok(settings)
    }

    /// Parses settings from JSON; missing fields keep their default.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DiError::InvalidOperation(format!("invalid kernel settings: {}", e)))
    }
}

fn parse_bool(key: &str, value: &str) -> DiResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DiError::InvalidOperation(format!(
            "{} is not a valid boolean: {}",
            key, value
        ))),
    }
}
