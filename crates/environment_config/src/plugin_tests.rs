//! Tests for plugin metadata.

use super::*;
use crate::PropertyOverrides;

/// Verify the defaults of a new plugin.
#[test]
fn test_plugin_defaults() {
    let plugin = PluginSettings::new();

    assert_eq!(plugin.version().as_str(), "9.0");
    assert!(!plugin.allow_snapshot_versions());
    assert!(plugin.server().is_none());
    assert!(plugin.agent().is_none());
    assert!(plugin.publish().is_none());
    assert!(plugin.environments().is_empty());
}

/// Verify invalid API versions are rejected and the old one kept.
#[test]
fn test_set_invalid_version() {
    let mut plugin = PluginSettings::new();
    plugin.set_version("2019.1").unwrap();

    let err = plugin.set_version("v2020").unwrap_err();
    assert!(matches!(err, EnvironmentError::InvalidVersionFormat { .. }));
    assert_eq!(plugin.version().as_str(), "2019.1");
}

/// Verify the snapshot flag reaches the environments.
#[test]
fn test_allow_snapshot_versions_propagates() {
    let mut plugin = PluginSettings::new();
    plugin.set_allow_snapshot_versions(true);

    assert!(plugin.environments().allow_snapshot_versions());
    plugin.set_version("2021.2-SNAPSHOT").unwrap();
    assert!(plugin.version().is_snapshot());
}

/// Verify the publish defaults.
#[test]
fn test_publish_defaults() {
    let mut plugin = PluginSettings::new();
    let publish = plugin.publish_mut();

    assert_eq!(publish.channels, vec!["Stable".to_string()]);
    assert!(publish.token.is_none());
    assert!(publish.notes.is_none());
}

/// Verify the publish token is hidden from debug output and serialization.
#[test]
fn test_publish_token_is_not_exposed() {
    let publish = PublishSettings {
        channels: vec!["Beta".to_string()],
        token: Some("secret-token".to_string()),
        notes: Some("First release".to_string()),
    };

    let debug = format!("{:?}", publish);
    assert!(!debug.contains("secret-token"));
    assert!(debug.contains("<redacted>"));

    let json = serde_json::to_string(&publish).unwrap();
    assert!(!json.contains("secret-token"));
    assert!(json.contains("First release"));
}

/// Verify the agent tool deployment is created on demand.
#[test]
fn test_agent_tool_deployment() {
    let mut plugin = PluginSettings::new();
    assert!(!plugin.agent_mut().is_tool_deployment());

    plugin
        .agent_mut()
        .tool_deployment_mut()
        .add_executable_file("bin/tool.sh");
    plugin
        .agent_mut()
        .tool_deployment_mut()
        .add_executable_file("bin/helper.sh");

    let agent = plugin.agent().unwrap();
    assert!(agent.is_tool_deployment());
    assert_eq!(
        agent.tool_deployment.as_ref().unwrap().executable_files,
        vec!["bin/tool.sh", "bin/helper.sh"]
    );
}

// ============================================================================
// Feature gates
// ============================================================================

/// Verify feature gates follow the API version milestones.
#[test]
fn test_feature_gates() {
    let mut plugin = PluginSettings::new();
    assert!(!plugin.supports_runtime_reload().unwrap());
    assert!(!plugin.supports_node_responsibilities().unwrap());

    plugin.set_version("2018.2").unwrap();
    assert!(plugin.supports_runtime_reload().unwrap());
    assert!(!plugin.supports_node_responsibilities().unwrap());

    plugin.set_version("2020.1.5").unwrap();
    assert!(plugin.supports_runtime_reload().unwrap());
    assert!(plugin.supports_node_responsibilities().unwrap());
}

/// Verify the SNAPSHOT sentinel supports every feature.
#[test]
fn test_feature_gates_with_snapshot() {
    let mut plugin = PluginSettings::new();
    plugin.set_version("SNAPSHOT").unwrap();

    assert!(plugin.supports_runtime_reload().unwrap());
    assert!(plugin.supports_node_responsibilities().unwrap());
}

/// Verify validation rejects features newer than the API version.
#[test]
fn test_validate_unsupported_feature() {
    let mut plugin = PluginSettings::new();
    plugin.set_version("2018.1").unwrap();
    plugin.server_mut().allow_runtime_reload = Some(true);

    let err = plugin.validate().unwrap_err();
    assert_eq!(
        err,
        EnvironmentError::UnsupportedFeature {
            feature: "allowRuntimeReload".to_string(),
            required: "2018.2".to_string(),
            version: "2018.1".to_string(),
        }
    );

    plugin.set_version("2018.2").unwrap();
    plugin.validate().unwrap();

    plugin.server_mut().node_responsibilities_aware = Some(false);
    assert!(matches!(
        plugin.validate(),
        Err(EnvironmentError::UnsupportedFeature { .. })
    ));
}

/// Verify validation reports versions that cannot be compared.
#[test]
fn test_validate_uncomparable_version() {
    let mut plugin = PluginSettings::new();
    plugin.set_version("2018.2 EAP").unwrap();
    plugin.server_mut().allow_runtime_reload = Some(true);

    assert!(matches!(
        plugin.validate(),
        Err(EnvironmentError::InvalidNumericSegment { .. })
    ));
}

/// Verify a plugin without a server component always validates.
#[test]
fn test_validate_without_server() {
    let plugin = PluginSettings::new();
    plugin.validate().unwrap();
}

/// Verify environments of the plugin see the override source.
#[test]
fn test_environments_use_overrides() {
    let overrides = PropertyOverrides::from_pairs([("teamcity.environments.ci.homeDir", "/ci")]);
    let mut plugin = PluginSettings::with_overrides(overrides);

    let env = plugin.environments_mut().environment("ci").unwrap();
    assert_eq!(env.borrow().home_dir().unwrap(), "/ci");
}
