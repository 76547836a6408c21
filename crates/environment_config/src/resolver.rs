//! Three-tier setting resolution.
//!
//! Every setting resolves in a fixed order:
//! 1. **Override** - an external override for the setting's dotted key
//! 2. **Explicit** - a value set on the owning object (or its convention value)
//! 3. **Convention** - a default computed from other resolved values
//!
//! Nothing is cached. Each read re-checks the override source and re-runs the
//! default computation, so overrides supplied after configuration and changes
//! to the values a default depends on are always observed.

use crate::override_source::{override_key, OverrideSource};
use crate::{EnvironmentError, EnvironmentResult};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Identifies a setting for override lookup and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingKey<'a> {
    /// Owning environment, or `None` for registry-wide settings.
    pub environment: Option<&'a str>,

    /// Setting name as it appears in override keys (e.g. `homeDir`).
    pub setting: &'a str,
}

impl<'a> SettingKey<'a> {
    /// Key for a setting of a named environment.
    pub fn environment(environment: &'a str, setting: &'a str) -> Self {
        Self {
            environment: Some(environment),
            setting,
        }
    }

    /// Key for a registry-wide setting.
    pub fn registry(setting: &'a str) -> Self {
        Self {
            environment: None,
            setting,
        }
    }

    /// The dotted key consulted in the override source.
    pub fn override_key(&self) -> String {
        override_key(self.environment, self.setting)
    }

    fn unresolved(&self) -> EnvironmentError {
        EnvironmentError::UnresolvedSetting {
            environment: self.environment.unwrap_or("<registry>").to_string(),
            setting: self.setting.to_string(),
        }
    }
}

/// Which tier provided a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingSource {
    /// External override (highest precedence).
    Override,

    /// Value set on the environment or registry.
    Explicit,

    /// Value computed by convention (lowest precedence).
    Convention,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingSource::Override => write!(f, "override"),
            SettingSource::Explicit => write!(f, "explicit"),
            SettingSource::Convention => write!(f, "convention"),
        }
    }
}

/// A resolved value together with the tier it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSetting {
    /// The resolved value.
    pub value: String,

    /// The tier that supplied the value.
    pub source: SettingSource,
}

impl ResolvedSetting {
    /// Consume the resolution and return the value.
    pub fn into_value(self) -> String {
        self.value
    }
}

/// Resolves settings against an override source.
///
/// # Examples
///
/// ```
/// use environment_config::{PropertyOverrides, SettingKey, SettingResolver, SettingSource};
///
/// let overrides = PropertyOverrides::new();
/// let resolver = SettingResolver::new(&overrides);
/// let key = SettingKey::environment("ci", "homeDir");
///
/// let resolved = resolver.resolve(key, Some("/opt/ci"), || Ok(None))?;
/// assert_eq!(resolved.source, SettingSource::Explicit);
///
/// overrides.set("teamcity.environments.ci.homeDir", "/tmp/ci");
/// let resolved = resolver.resolve(key, Some("/opt/ci"), || Ok(None))?;
/// assert_eq!(resolved.value, "/tmp/ci");
/// assert_eq!(resolved.source, SettingSource::Override);
/// # Ok::<(), environment_config::EnvironmentError>(())
/// ```
#[derive(Clone, Copy)]
pub struct SettingResolver<'a> {
    overrides: &'a dyn OverrideSource,
}

impl<'a> SettingResolver<'a> {
    /// Create a resolver reading from the given override source.
    pub fn new(overrides: &'a dyn OverrideSource) -> Self {
        Self { overrides }
    }

    /// Resolve a setting.
    ///
    /// # Arguments
    ///
    /// * `key` - The setting being resolved
    /// * `own_value` - The value set on the owning object, if any
    /// * `compute_default` - Computes the convention value; only called when
    ///   neither an override nor an own value exists
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::UnresolvedSetting` when no tier has a value,
    /// or whatever error the default computation reports.
    pub fn resolve<F>(
        &self,
        key: SettingKey<'_>,
        own_value: Option<&str>,
        compute_default: F,
    ) -> EnvironmentResult<ResolvedSetting>
    where
        F: FnOnce() -> EnvironmentResult<Option<String>>,
    {
        let override_key = key.override_key();
        if let Some(value) = self.overrides.lookup(&override_key) {
            debug!(key = %override_key, "Setting resolved from external override");
            return Ok(ResolvedSetting {
                value,
                source: SettingSource::Override,
            });
        }

        if let Some(value) = own_value {
            return Ok(ResolvedSetting {
                value: value.to_string(),
                source: SettingSource::Explicit,
            });
        }

        match compute_default()? {
            Some(value) => Ok(ResolvedSetting {
                value,
                source: SettingSource::Convention,
            }),
            None => Err(key.unresolved()),
        }
    }
}

impl fmt::Debug for SettingResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
