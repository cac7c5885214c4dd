//! Environment layering for configuration. These tests mutate process
//! environment and must not run concurrently.

use serial_test::serial;

use founderos_api::config::AppConfig;

const VARS: &[&str] = &[
    "FOUNDEROS__AGENT__HISTORY_CAPACITY",
    "FOUNDEROS__AGENT__CYCLE_INTERVAL_SECS",
    "FOUNDEROS__SERVER__PORT",
    "FOUNDEROS__LLM__TEMPERATURE",
    "TAVILY_API_KEY",
];

fn set(key: &str, value: &str) {
    // SAFETY: tests in this file are serialized and no other thread reads
    // the environment while they run.
    unsafe { std::env::set_var(key, value) };
}

fn clear() {
    for key in VARS {
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_env_overrides_defaults() {
    clear();
    set("FOUNDEROS__AGENT__HISTORY_CAPACITY", "25");
    set("FOUNDEROS__AGENT__CYCLE_INTERVAL_SECS", "0");
    set("FOUNDEROS__SERVER__PORT", "9090");
    set("TAVILY_API_KEY", "tvly-from-env");

    let config = AppConfig::load().unwrap();
    clear();

    assert_eq!(config.agent.history_capacity, 25);
    assert_eq!(config.agent.insight_capacity, 100);
    assert_eq!(config.agent.cycle_interval_secs, 0);
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.providers.tavily.key(), Some("tvly-from-env"));
}

#[test]
#[serial]
fn test_invalid_env_value_fails_validation() {
    clear();
    set("FOUNDEROS__LLM__TEMPERATURE", "1.5");

    let err = AppConfig::load().unwrap_err();
    clear();

    assert!(err.to_string().contains("temperature"), "{err}");
}

#[test]
#[serial]
fn test_blank_provider_key_is_ignored() {
    clear();
    set("TAVILY_API_KEY", "   ");

    let config = AppConfig::load().unwrap();
    clear();

    assert!(config.providers.tavily.key().is_none());
}
