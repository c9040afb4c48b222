use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;
const DEFAULT_NOTIFY_MS: u64 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub push_url: Url,
    pub reconnect_delay: Duration,
    pub notification_ttl: Duration,
    pub request_timeout: Duration,
    pub view_file: Option<PathBuf>,
}

impl ClientConfig {
    // Read configuration from the process environment (after dotenvy has run)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_url(
            "POLL_API_URL",
            lookup("POLL_API_URL").as_deref().unwrap_or(DEFAULT_API_URL),
            &["http", "https"],
        )?;

        let push_url = match lookup("POLL_PUSH_URL") {
            Some(raw) => parse_url("POLL_PUSH_URL", &raw, &["ws", "wss"])?,
            None => derive_push_url(&api_url)?,
        };

        Ok(Self {
            api_url,
            push_url,
            reconnect_delay: Duration::from_millis(parse_number(
                "POLL_RECONNECT_DELAY_MS",
                lookup("POLL_RECONNECT_DELAY_MS"),
                DEFAULT_RECONNECT_DELAY_MS,
            )?),
            notification_ttl: Duration::from_millis(parse_number(
                "POLL_NOTIFY_MS",
                lookup("POLL_NOTIFY_MS"),
                DEFAULT_NOTIFY_MS,
            )?),
            request_timeout: Duration::from_secs(parse_positive(
                "POLL_REQUEST_TIMEOUT_SECS",
                lookup("POLL_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            view_file: lookup("POLL_VIEW_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_url(key: &'static str, raw: &str, schemes: &[&'static str]) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::UnsupportedScheme {
            key,
            expected: if schemes.contains(&"ws") { "ws/wss" } else { "http/https" },
            found: url.scheme().to_string(),
        });
    }
    Ok(url)
}

// The push endpoint lives at /ws on the same host as the REST API
fn derive_push_url(api_url: &Url) -> Result<Url, ConfigError> {
    let scheme = if api_url.scheme() == "https" { "wss" } else { "ws" };
    let mut raw = format!("{}://{}", scheme, api_url.host_str().unwrap_or("127.0.0.1"));
    if let Some(port) = api_url.port() {
        raw.push_str(&format!(":{}", port));
    }
    raw.push_str("/ws");
    parse_url("POLL_PUSH_URL", &raw, &["ws", "wss"])
}

fn parse_number(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}

// Same as parse_number, but zero is rejected
fn parse_positive(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match parse_number(key, raw, default)? {
        0 => Err(ConfigError::InvalidNumber {
            key,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.push_url.as_str(), "ws://127.0.0.1:8000/ws");
        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.notification_ttl, Duration::from_secs(3));
        assert!(config.view_file.is_none());
    }

    #[test]
    fn push_url_follows_api_scheme() {
        let config = config_from(&[("POLL_API_URL", "https://polls.example.com/api")]).unwrap();
        assert_eq!(config.push_url.as_str(), "wss://polls.example.com/ws");
    }

    #[test]
    fn explicit_values_win() {
        let config = config_from(&[
            ("POLL_PUSH_URL", "ws://push.local:9000/live"),
            ("POLL_RECONNECT_DELAY_MS", "500"),
            ("POLL_VIEW_FILE", "view.html"),
        ])
        .unwrap();
        assert_eq!(config.push_url.as_str(), "ws://push.local:9000/live");
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.view_file, Some(PathBuf::from("view.html")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config_from(&[("POLL_API_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { key: "POLL_API_URL", .. })
        ));
        assert!(matches!(
            config_from(&[("POLL_PUSH_URL", "http://host/ws")]),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            config_from(&[("POLL_NOTIFY_MS", "-1")]),
            Err(ConfigError::InvalidNumber { key: "POLL_NOTIFY_MS", .. })
        ));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        match config_from(&[("POLL_REQUEST_TIMEOUT_SECS", " 0 ")]) {
            Err(ConfigError::InvalidNumber { key, value }) => {
                assert_eq!(key, "POLL_REQUEST_TIMEOUT_SECS");
                assert_eq!(value, "0");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
        let config = config_from(&[("POLL_REQUEST_TIMEOUT_SECS", "1")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }
}
