use lanwarden::config::ControllerConfig;
use lanwarden::errors::DiscoveryError;

#[test]
fn test_missing_config_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network_config.json");

    let config = ControllerConfig::load(&path).unwrap();
    assert_eq!(config.default_subnet, "192.168.1.0/24");
    assert_eq!(config.max_threads, 50);
    assert_eq!(config.monitoring_interval_secs, 60);
    assert!(config.security_settings.alert_on_new_devices);
    assert!(!config.security_settings.block_unknown_devices);

    // The defaults were persisted and load back identically
    assert!(path.exists());
    let reloaded = ControllerConfig::load(&path).unwrap();
    assert_eq!(reloaded.default_subnet, config.default_subnet);
    assert_eq!(reloaded.probe_ports, config.probe_ports);
}

#[test]
fn test_partial_config_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network_config.json");
    std::fs::write(&path, r#"{"default_subnet": "10.1.0.0/24", "max_threads": 8}"#).unwrap();

    let config = ControllerConfig::load(&path).unwrap();
    assert_eq!(config.default_subnet, "10.1.0.0/24");
    assert_eq!(config.max_threads, 8);
    assert_eq!(config.scan_timeout_ms, 1000);
}

#[test]
fn test_malformed_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network_config.json");
    std::fs::write(&path, "not json at all").unwrap();

    match ControllerConfig::load(&path) {
        Err(DiscoveryError::ConfigLoad(_)) => {}
        other => panic!("expected ConfigLoad error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_max_threads_clamped_to_at_least_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network_config.json");
    std::fs::write(&path, r#"{"max_threads": 0}"#).unwrap();

    let config = ControllerConfig::load(&path).unwrap();
    assert_eq!(config.max_threads, 1);
}
