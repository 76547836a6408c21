//! External override sources.
//!
//! An override source answers `lookup(key)` for dotted keys of the form
//! `teamcity.environments.<environment>.<setting>` (or
//! `teamcity.environments.<setting>` for registry-wide settings). Values found
//! here win over everything configured on an environment.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Namespace shared by every override key.
pub const OVERRIDE_NAMESPACE: &str = "teamcity.environments";

/// Prefix used by [`EnvironmentVariableOverrides`] when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "TEAMCITY_ENVIRONMENTS";

/// Separates the dotted key segments in environment variable names.
pub const ENV_SEGMENT_SEPARATOR: &str = "__";

/// Build the override key for a setting of a named environment.
///
/// # Examples
///
/// ```
/// use environment_config::override_source::override_key;
///
/// assert_eq!(override_key(Some("ci"), "homeDir"), "teamcity.environments.ci.homeDir");
/// assert_eq!(override_key(None, "baseDataDir"), "teamcity.environments.baseDataDir");
/// ```
pub fn override_key(environment: Option<&str>, setting: &str) -> String {
    match environment {
        Some(environment) => format!("{}.{}.{}", OVERRIDE_NAMESPACE, environment, setting),
        None => format!("{}.{}", OVERRIDE_NAMESPACE, setting),
    }
}

/// A source of externally supplied setting values.
///
/// Lookups are expected to be cheap, synchronous, in-memory reads. They are
/// repeated on every resolution, so a source may change between reads.
pub trait OverrideSource {
    /// Look up the override for a dotted key.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<T: OverrideSource + ?Sized> OverrideSource for Rc<T> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// An override source that never has a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl OverrideSource for NoOverrides {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory property overrides, e.g. from `-P key=value` arguments.
///
/// Uses interior mutability so a clone handed to a registry sees properties
/// set or removed afterwards.
///
/// # Examples
///
/// ```
/// use environment_config::{OverrideSource, PropertyOverrides};
///
/// let overrides = PropertyOverrides::new();
/// let shared = overrides.clone();
/// overrides.set("teamcity.environments.ci.homeDir", "/opt/teamcity");
/// assert_eq!(
///     shared.lookup("teamcity.environments.ci.homeDir").as_deref(),
///     Some("/opt/teamcity")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyOverrides {
    properties: Rc<RefCell<BTreeMap<String, String>>>,
}

impl PropertyOverrides {
    /// Create an empty set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create properties from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let overrides = Self::new();
        for (key, value) in pairs {
            overrides.set(key, value);
        }
        overrides
    }

    /// Set a property, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.borrow_mut().insert(key.into(), value.into());
    }

    /// Remove a property, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.properties.borrow_mut().remove(key)
    }

    /// Number of properties currently set.
    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    /// Returns `true` when no property is set.
    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }
}

impl OverrideSource for PropertyOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        self.properties.borrow().get(key).cloned()
    }
}

/// Overrides read from process environment variables.
///
/// The dotted key has its namespace replaced by the prefix and each segment is
/// converted to upper snake case. Segments are joined with `__`, so
/// `teamcity.environments.ci.homeDir` becomes
/// `TEAMCITY_ENVIRONMENTS__CI__HOME_DIR` and the registry-wide
/// `teamcity.environments.baseHomeDir` becomes
/// `TEAMCITY_ENVIRONMENTS__BASE_HOME_DIR`.
///
/// Case and `-` are folded within a segment, so environments named `myEnv`,
/// `my-env` and `my_env` read the same variables. Use names that differ by
/// more than that when overriding through the process environment.
#[derive(Debug, Clone)]
pub struct EnvironmentVariableOverrides {
    prefix: String,
}

impl EnvironmentVariableOverrides {
    /// Create a source using [`DEFAULT_ENV_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Create a source using a custom variable prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The environment variable consulted for a dotted key.
    pub fn variable_name(&self, key: &str) -> String {
        let remainder = key
            .strip_prefix(OVERRIDE_NAMESPACE)
            .map(|rest| rest.trim_start_matches('.'))
            .unwrap_or(key);

        let mut name = self.prefix.clone();
        for part in remainder.split('.').filter(|part| !part.is_empty()) {
            name.push_str(ENV_SEGMENT_SEPARATOR);
            name.push_str(&to_upper_snake(part));
        }
        name
    }
}

impl Default for EnvironmentVariableOverrides {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideSource for EnvironmentVariableOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(self.variable_name(key)).ok()
    }
}

fn to_upper_snake(part: &str) -> String {
    let mut converted = String::with_capacity(part.len() + 4);
    let mut previous_lower = false;
    for c in part.chars() {
        if c.is_ascii_uppercase() && previous_lower {
            converted.push('_');
        }
        previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        if c == '-' {
            converted.push('_');
        } else {
            converted.push(c.to_ascii_uppercase());
        }
    }
    converted
}

/// Several override sources consulted in order; the first hit wins.
#[derive(Default)]
pub struct LayeredOverrides {
    layers: Vec<Box<dyn OverrideSource>>,
}

impl LayeredOverrides {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lower-precedence layer below the existing ones.
    pub fn with_layer(mut self, layer: impl OverrideSource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` when there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl OverrideSource for LayeredOverrides {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.lookup(key))
    }
}

impl std::fmt::Debug for LayeredOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredOverrides")
            .field("layers", &self.layers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "override_source_tests.rs"]
mod tests;
