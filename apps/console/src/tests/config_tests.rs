use super::{apply_env_overrides, load_settings, parse_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings("base_url = \"http://repo.internal:9000\"\n").expect("parse");
    assert_eq!(settings.base_url, "http://repo.internal:9000");
    assert_eq!(settings.request_timeout_seconds, 30);
    assert_eq!(settings.client_options().alert_timeout, Duration::from_millis(2000));
}

#[test]
fn rejects_wrongly_typed_values() {
    assert!(parse_settings("alert_timeout_ms = \"soon\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_variable() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("REPOSITORY_URL", "http://plain:1"),
        ("APP__BASE_URL", "http://prefixed:2"),
        ("APP__ALERT_TIMEOUT_MS", "500"),
        ("APP__REQUEST_TIMEOUT_SECONDS", "not-a-number"),
    ]);
    let mut settings = Settings::default();

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.base_url, "http://prefixed:2");
    assert_eq!(settings.alert_timeout_ms, 500);
    assert_eq!(settings.request_timeout_seconds, 30);
}

#[test]
fn explicit_config_file_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("repository_client_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("must fail");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("repository_client_config_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("client.toml");
    fs::write(&path, "request_timeout_seconds = 5\n").expect("write");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
