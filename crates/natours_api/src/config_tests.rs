//! Tests for configuration loading

use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.rate_limit.max_requests, 100);
    assert_eq!(config.rate_limit.window, Duration::from_secs(3600));
    assert_eq!(config.body_limit, 10 * 1024);
    assert_eq!(config.public_dir, PathBuf::from("public"));
}

#[test]
fn test_values_read_from_lookup() {
    let config = ApiConfig::from_lookup(lookup_from(&[
        ("API_HOST", "127.0.0.1"),
        ("API_PORT", "8000"),
        ("NATOURS_ENV", "Development"),
        ("RATE_LIMIT_MAX", "5"),
        ("RATE_LIMIT_WINDOW_SECS", "60"),
        ("BODY_LIMIT_BYTES", "2048"),
        ("PUBLIC_DIR", "/srv/natours/public"),
    ]))
    .unwrap();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8000);
    assert!(config.environment.is_development());
    assert_eq!(config.rate_limit.max_requests, 5);
    assert_eq!(config.rate_limit.window, Duration::from_secs(60));
    assert_eq!(config.body_limit, 2048);
    assert_eq!(config.public_dir, PathBuf::from("/srv/natours/public"));
}

#[test]
fn test_invalid_port_reported() {
    let err = ApiConfig::from_lookup(lookup_from(&[("API_PORT", "eighty")])).unwrap_err();

    match err {
        ConfigError::InvalidValue { key, value, .. } => {
            assert_eq!(key, "API_PORT");
            assert_eq!(value, "eighty");
        }
    }
}

#[test]
fn test_unknown_environment_reported() {
    let err = ApiConfig::from_lookup(lookup_from(&[("NATOURS_ENV", "staging")])).unwrap_err();

    assert!(err.to_string().contains("unknown environment 'staging'"));
}
