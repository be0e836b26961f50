// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

use super::*;
use std::io::Write;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_without_variables() {
    let config = Config::from_lookup(|_| None).unwrap();
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.server_id, "localhost");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(!config.auto_ptr);
    assert!(config.editable_types.contains(&RRType::A));
    assert!(!config.editable_types.contains(&RRType::SOA));
    assert_eq!(config.reverse_zone.kind, "Master");
}

#[test]
fn test_environment_values() {
    let config = Config::from_lookup(lookup_from(&[
        ("ZONESYNC_API_URL", "http://pdns:8081"),
        ("ZONESYNC_API_KEY", "secret"),
        ("ZONESYNC_TIMEOUT_SECS", "5"),
        ("ZONESYNC_AUTO_PTR", "yes"),
        ("ZONESYNC_PRETTY_IPV6_PTR", "0"),
        ("ZONESYNC_HISTORY_PATH", "/tmp/h.jsonl"),
    ]))
    .unwrap();

    assert_eq!(config.api_url, "http://pdns:8081");
    assert_eq!(config.api_key, "secret");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert!(config.auto_ptr);
    assert!(!config.pretty_ipv6_ptr);
    assert_eq!(config.history_path, PathBuf::from("/tmp/h.jsonl"));
}

#[test]
fn test_bad_values_are_errors() {
    assert!(Config::from_lookup(lookup_from(&[("ZONESYNC_TIMEOUT_SECS", "soon")])).is_err());
    assert!(Config::from_lookup(lookup_from(&[("ZONESYNC_AUTO_PTR", "maybe")])).is_err());
}

#[test]
fn test_yaml_file_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "api_key: from-yaml\nreverse_zone_kind: Native\neditable_types: [a, TXT]\nzones:\n  example.com.:\n    auto_ptr: true\n    editable_types: [A]\n"
    )
    .unwrap();

    let mut config = Config::default();
    config
        .apply_yaml(&std::fs::read_to_string(file.path()).unwrap())
        .unwrap();

    assert_eq!(config.api_key, "from-yaml");
    assert_eq!(config.reverse_zone.kind, "Native");
    assert_eq!(config.editable_types, vec![RRType::A, RRType::TXT]);
    let zone = &config.zones["example.com"];
    assert_eq!(zone.settings.get("auto_ptr"), Some(&true));
    assert_eq!(zone.editable_types, Some(vec![RRType::A]));
}

#[test]
fn test_yaml_with_unknown_type_fails() {
    let mut config = Config::default();
    assert!(config.apply_yaml("editable_types: [BOGUS]").is_err());
}

#[tokio::test]
async fn test_zone_setting_overrides_global() {
    let mut config = Config::default();
    config
        .apply_yaml("auto_ptr: false\nzones:\n  example.com:\n    auto_ptr: true\n")
        .unwrap();
    let settings = StaticSettings::new(config);

    assert!(
        settings
            .get_boolean_setting(SETTING_AUTO_PTR, Some("example.com."))
            .await
    );
    assert!(
        !settings
            .get_boolean_setting(SETTING_AUTO_PTR, Some("example.org"))
            .await
    );
    assert!(!settings.get_boolean_setting(SETTING_AUTO_PTR, None).await);
    assert!(!settings.get_boolean_setting("unknown", None).await);
}

#[tokio::test]
async fn test_editable_types_per_zone() {
    let mut config = Config::default();
    config
        .apply_yaml("zones:\n  locked.example:\n    editable_types: [TXT]\n")
        .unwrap();
    let settings = StaticSettings::new(config);

    let locked = settings.editable_types("locked.example").await;
    assert_eq!(locked, [RRType::TXT].into_iter().collect());

    let open = settings.editable_types("example.com").await;
    assert!(open.contains(&RRType::CNAME));
}
