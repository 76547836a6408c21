//! Tests for external override sources.

use super::*;
use serial_test::serial;

/// Verify override keys for environment and registry settings.
#[test]
fn test_override_key() {
    assert_eq!(
        override_key(Some("teamcity2020"), "dataDir"),
        "teamcity.environments.teamcity2020.dataDir"
    );
    assert_eq!(
        override_key(None, "downloadsDir"),
        "teamcity.environments.downloadsDir"
    );
}

/// Verify the empty source never answers.
#[test]
fn test_no_overrides() {
    assert_eq!(NoOverrides.lookup("teamcity.environments.ci.homeDir"), None);
}

/// Verify properties can be set, replaced and removed.
#[test]
fn test_property_overrides_set_and_remove() {
    let overrides = PropertyOverrides::new();
    assert!(overrides.is_empty());

    overrides.set("a.b", "1");
    overrides.set("a.b", "2");
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides.lookup("a.b").as_deref(), Some("2"));

    assert_eq!(overrides.remove("a.b").as_deref(), Some("2"));
    assert_eq!(overrides.lookup("a.b"), None);
    assert_eq!(overrides.remove("a.b"), None);
}

/// Verify clones share the same property map.
#[test]
fn test_property_overrides_clones_share_state() {
    let overrides = PropertyOverrides::from_pairs([("x", "1")]);
    let shared = overrides.clone();

    overrides.set("y", "2");
    shared.remove("x");

    assert_eq!(overrides.lookup("x"), None);
    assert_eq!(shared.lookup("y").as_deref(), Some("2"));
}

/// Verify dotted keys map to upper snake case variable names.
#[test]
fn test_environment_variable_names() {
    let source = EnvironmentVariableOverrides::new();
    assert_eq!(
        source.variable_name("teamcity.environments.ci.homeDir"),
        "TEAMCITY_ENVIRONMENTS__CI__HOME_DIR"
    );
    assert_eq!(
        source.variable_name("teamcity.environments.teamcity2020.serverOptions"),
        "TEAMCITY_ENVIRONMENTS__TEAMCITY2020__SERVER_OPTIONS"
    );
    assert_eq!(
        source.variable_name("teamcity.environments.baseDownloadUrl"),
        "TEAMCITY_ENVIRONMENTS__BASE_DOWNLOAD_URL"
    );
    assert_eq!(
        source.variable_name("teamcity.environments.my-env.javaHome"),
        "TEAMCITY_ENVIRONMENTS__MY_ENV__JAVA_HOME"
    );
}

/// Verify an environment setting and a registry setting with the same words
/// read different variables.
#[test]
fn test_environment_variable_names_keep_environment_segment() {
    let source = EnvironmentVariableOverrides::new();
    let environment = source.variable_name("teamcity.environments.base.homeDir");
    let registry = source.variable_name("teamcity.environments.baseHomeDir");

    assert_eq!(environment, "TEAMCITY_ENVIRONMENTS__BASE__HOME_DIR");
    assert_eq!(registry, "TEAMCITY_ENVIRONMENTS__BASE_HOME_DIR");
    assert_ne!(environment, registry);
}

/// Verify case and dashes are folded within a segment.
#[test]
fn test_environment_variable_names_fold_case() {
    let source = EnvironmentVariableOverrides::new();
    assert_eq!(
        source.variable_name("teamcity.environments.myEnv.homeDir"),
        source.variable_name("teamcity.environments.my_env.homeDir")
    );
}

/// Verify a custom prefix replaces the namespace.
#[test]
fn test_environment_variable_custom_prefix() {
    let source = EnvironmentVariableOverrides::with_prefix("TC");
    assert_eq!(
        source.variable_name("teamcity.environments.ci.dataDir"),
        "TC__CI__DATA_DIR"
    );
}

/// Verify values are read from the process environment on every lookup.
#[test]
#[serial]
fn test_environment_variable_lookup() {
    let source = EnvironmentVariableOverrides::with_prefix("ENVCFG_TEST");
    let key = "teamcity.environments.ci.homeDir";

    std::env::remove_var("ENVCFG_TEST__CI__HOME_DIR");
    assert_eq!(source.lookup(key), None);

    std::env::set_var("ENVCFG_TEST__CI__HOME_DIR", "/srv/teamcity");
    assert_eq!(source.lookup(key).as_deref(), Some("/srv/teamcity"));

    std::env::remove_var("ENVCFG_TEST__CI__HOME_DIR");
    assert_eq!(source.lookup(key), None);
}

/// Verify the first layer with a value wins.
#[test]
fn test_layered_overrides_precedence() {
    let high = PropertyOverrides::from_pairs([("k", "high")]);
    let low = PropertyOverrides::from_pairs([("k", "low"), ("only-low", "low")]);

    let layered = LayeredOverrides::new()
        .with_layer(high.clone())
        .with_layer(low);

    assert_eq!(layered.len(), 2);
    assert_eq!(layered.lookup("k").as_deref(), Some("high"));
    assert_eq!(layered.lookup("only-low").as_deref(), Some("low"));
    assert_eq!(layered.lookup("missing"), None);

    high.remove("k");
    assert_eq!(layered.lookup("k").as_deref(), Some("low"));
}

/// Verify an empty stack answers nothing.
#[test]
fn test_layered_overrides_empty() {
    let layered = LayeredOverrides::new();
    assert!(layered.is_empty());
    assert_eq!(layered.lookup("k"), None);
}
