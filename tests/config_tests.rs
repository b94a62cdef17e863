use std::time::Duration;

use lookout::*;

#[test]
fn test_default_config_resolves() {
    let config = resolve_config(LookoutConfig::default()).unwrap();
    assert_eq!(config.instances.len(), 14);
    assert_eq!(config.instances[0], Instance::new("nitter.net"));
    assert_eq!(config.health_check_count, 3);
    assert_eq!(config.probe.timeout, Duration::from_millis(5000));
    assert_eq!(config.probe.test_handle, "twitter");
    assert_eq!(config.probe.scheme, "https");
    assert_eq!(config.cache_ttl, Duration::from_secs(300));
    assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    assert_eq!(config.strategy, Strategy::Ranked);
}

#[test]
fn test_instances_are_trimmed_and_deduplicated() {
    let config = resolve_config(LookoutConfig {
        instances: vec![" b.example ".into(), "a.example".into(), "b.example".into()],
        ..LookoutConfig::default()
    })
    .unwrap();
    assert_eq!(
        config.instances,
        vec![Instance::new("b.example"), Instance::new("a.example")]
    );
}

#[test]
fn test_rejects_empty_and_malformed_instances() {
    let empty = resolve_config(LookoutConfig { instances: vec![], ..LookoutConfig::default() });
    assert!(matches!(empty, Err(LookoutError::NoInstancesConfigured)));

    for bad in ["", "   ", "nitter.net/path", "two words"] {
        let result = resolve_config(LookoutConfig {
            instances: vec![bad.to_string()],
            ..LookoutConfig::default()
        });
        assert!(matches!(result, Err(LookoutError::InvalidInstance(_))), "{bad:?} accepted");
    }
}

#[test]
fn test_rejects_unknown_scheme() {
    let mut config = LookoutConfig::default();
    config.probe.scheme = "ftp".to_string();
    assert!(matches!(resolve_config(config), Err(LookoutError::Config(_))));
}

#[test]
fn test_load_partial_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lookout.json");
    std::fs::write(
        &path,
        r#"{ "instances": ["one.example", "two.example"], "probe": { "timeout_ms": 750 }, "strategy": "configured", "log_level": "debug" }"#,
    )
    .unwrap();

    let config = resolve_config(load_config(&path).unwrap()).unwrap();
    assert_eq!(config.instances.len(), 2);
    assert_eq!(config.probe.timeout, Duration::from_millis(750));
    assert_eq!(config.probe.test_handle, "twitter");
    assert_eq!(config.strategy, Strategy::Configured);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.health_check_count, 3);
}

#[test]
fn test_load_config_reports_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_config(&path), Err(LookoutError::Serialization(_))));
}

#[test]
fn test_diagnostic_instances_precedence() {
    let configured = resolve_config(LookoutConfig {
        instances: vec!["c.example".into(), "d.example".into()],
        ..LookoutConfig::default()
    })
    .unwrap();
    let fallback = &["f.example"];

    assert_eq!(
        diagnostic_instances(&[" e.example ".into()], Some(&configured), fallback).unwrap(),
        vec![Instance::new("e.example")]
    );
    assert_eq!(
        diagnostic_instances(&[], Some(&configured), fallback).unwrap(),
        vec![Instance::new("c.example"), Instance::new("d.example")]
    );
    assert_eq!(
        diagnostic_instances(&[], None, fallback).unwrap(),
        vec![Instance::new("f.example")]
    );
}
