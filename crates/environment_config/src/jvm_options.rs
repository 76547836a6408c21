//! Ordered JVM option lists.

use serde::{Deserialize, Serialize};

/// Server options every new environment starts with.
pub const DEFAULT_SERVER_OPTIONS: [&str; 4] = [
    "-Dteamcity.development.mode=true",
    "-Dteamcity.development.shadowCopyClasses=true",
    "-Dteamcity.superUser.token.saveToFile=true",
    "-Dteamcity.kotlinConfigsDsl.generateDslDocs=false",
];

/// An ordered list of JVM options.
///
/// Options are kept exactly as given: no deduplication, no quoting. The
/// launch scripts receive them joined by single spaces, see [`JvmOptions::joined`].
///
/// # Examples
///
/// ```
/// use environment_config::JvmOptions;
///
/// let mut options = JvmOptions::new();
/// options.add("-Xmx1g");
/// options.add_all(["-Dfoo=1", "-Dfoo=1"]);
/// assert_eq!(options.joined(), "-Xmx1g -Dfoo=1 -Dfoo=1");
///
/// options.set(["-Xms512m"]);
/// assert_eq!(options.joined(), "-Xms512m");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JvmOptions(Vec<String>);

impl JvmOptions {
    /// Create an empty option list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The developer-mode options used for a new server.
    pub fn server_defaults() -> Self {
        Self(DEFAULT_SERVER_OPTIONS.iter().map(|o| o.to_string()).collect())
    }

    /// Replace every option with the given sequence.
    pub fn set<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.clear();
        self.add_all(options);
    }

    /// Append a single option. Embedded spaces are not split.
    pub fn add(&mut self, option: impl Into<String>) {
        self.0.push(option.into());
    }

    /// Append several options in order.
    pub fn add_all<I, S>(&mut self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(options.into_iter().map(Into::into));
    }

    /// The options joined with single spaces.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    /// The options as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no options.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for JvmOptions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[path = "jvm_options_tests.rs"]
mod tests;
