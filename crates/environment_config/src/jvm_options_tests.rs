//! Tests for JVM option lists.

use super::*;

/// Verify the server defaults and their order.
#[test]
fn test_server_defaults_order() {
    let options = JvmOptions::server_defaults();
    assert_eq!(
        options.as_slice(),
        &[
            "-Dteamcity.development.mode=true".to_string(),
            "-Dteamcity.development.shadowCopyClasses=true".to_string(),
            "-Dteamcity.superUser.token.saveToFile=true".to_string(),
            "-Dteamcity.kotlinConfigsDsl.generateDslDocs=false".to_string(),
        ]
    );
}

/// Verify set clears the previous options.
#[test]
fn test_set_replaces_options() {
    let mut options = JvmOptions::server_defaults();
    options.set(["-Xmx2g", "-Dteamcity.development.mode=true"]);
    assert_eq!(options.joined(), "-Xmx2g -Dteamcity.development.mode=true");
}

/// Verify a single option containing spaces stays one option.
#[test]
fn test_single_option_with_spaces_is_opaque() {
    let mut options = JvmOptions::new();
    options.set(["-Xmx1g -Xms1g"]);
    assert_eq!(options.len(), 1);
    assert_eq!(options.joined(), "-Xmx1g -Xms1g");
}

/// Verify add appends without clearing and without deduplication.
#[test]
fn test_add_appends_without_dedup() {
    let mut options = JvmOptions::server_defaults();
    options.add("-Xmx1g");
    options.add_all(vec!["-Xmx1g".to_string()]);

    assert_eq!(options.len(), 6);
    assert!(options.joined().ends_with("-Dteamcity.kotlinConfigsDsl.generateDslDocs=false -Xmx1g -Xmx1g"));
}

/// Verify an empty list joins to an empty string.
#[test]
fn test_empty_joined() {
    let options = JvmOptions::new();
    assert!(options.is_empty());
    assert_eq!(options.joined(), "");
}

/// Verify collecting from an iterator keeps order.
#[test]
fn test_from_iterator() {
    let options: JvmOptions = ["-a", "-b", "-a"].into_iter().collect();
    assert_eq!(options.joined(), "-a -b -a");
}
