//! Tests for loading configuration from the process environment.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use tara::config::{
    ClientConfig, AGENT_ID_ENV, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT,
};
use tara::error::TaraError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 3] = [API_KEY_ENV, AGENT_ID_ENV, BASE_URL_ENV];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn from_env_reads_credentials_and_base_url() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(API_KEY_ENV, "sk-env");
    std::env::set_var(AGENT_ID_ENV, "agent-env");
    std::env::set_var(BASE_URL_ENV, "http://localhost:9999/");

    let config = ClientConfig::from_env().expect("config should load");

    assert_eq!(config.api_key, "sk-env");
    assert_eq!(config.agent_id, "agent-env");
    assert_eq!(config.base_url, "http://localhost:9999");
    assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn from_env_defaults_base_url() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(API_KEY_ENV, "sk-env");
    std::env::set_var(AGENT_ID_ENV, "agent-env");
    std::env::remove_var(BASE_URL_ENV);

    let config = ClientConfig::from_env().expect("config should load");

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn from_env_requires_agent_id() {
    let _env_lock = env_lock_guard();
    let _env_guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(API_KEY_ENV, "sk-env");
    std::env::remove_var(AGENT_ID_ENV);

    let err = ClientConfig::from_env().expect_err("missing agent id should fail");

    assert!(matches!(err, TaraError::Configuration(ref message) if message.contains(AGENT_ID_ENV)));
}

#[test]
fn debug_output_redacts_api_key() {
    let config = ClientConfig::new("sk-very-secret", "agent")
        .with_request_timeout(Duration::from_secs(3));
    let rendered = format!("{config:?}");

    assert!(!rendered.contains("sk-very-secret"));
    assert!(rendered.contains("agent"));
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = ClientConfig::new("k", "a")
        .with_base_url("wss://api.elevenlabs.io")
        .expect_err("ws scheme should be rejected");
    assert!(matches!(err, TaraError::Configuration(_)));
}
