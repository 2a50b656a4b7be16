//! Loading configuration files from disk.

use silently_config::{ConfigError, SilentlyConfig};
use silently_core::OrphanPolicy;

use crate::common::config_file;

#[test]
fn full_config_round_trips_through_disk() {
    let (_dir, path) = config_file(
        r#"
[log]
filter = "silently_core=debug"

[orphans]
policy = "log"

[scenarios]
async_failures = true
fire_and_forget = true
"#,
    );

    let config = SilentlyConfig::load_from(&path).unwrap();
    assert_eq!(config.log_filter.as_deref(), Some("silently_core=debug"));
    assert_eq!(config.orphan_policy, OrphanPolicy::Log);
    assert!(config.scenarios.async_failures);
    assert!(config.scenarios.fire_and_forget);
}

#[test]
fn empty_file_means_defaults() {
    let (_dir, path) = config_file("");
    let config = SilentlyConfig::load_from(&path).unwrap();
    assert_eq!(config, SilentlyConfig::default());
    assert_eq!(config.orphan_policy, OrphanPolicy::Escalate);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = SilentlyConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert_eq!(err.path(), &path);
}

#[test]
fn bad_policy_names_the_file() {
    let (_dir, path) = config_file("[orphans]\npolicy = \"panic\"\n");

    let err = SilentlyConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Policy { .. }));
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let (_dir, path) = config_file("[orphans\npolicy = ");
    let err = SilentlyConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
